//! Surgeries and specimen procedures.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::coordinates::{CoordinateSystem, Transform, validate_coordinate};
use crate::enums::{CurrentUnit, SizeUnit, TimeUnit, VolumeUnit};
use crate::errors::ValidationError;
use crate::registries::PidName;
use crate::validate::{
    OtherRequiresNotes, OtherSentinel, Validate, check_not_blank, check_optional_range,
    check_positive, check_same_length, check_time_order, require_coordinate_system,
    validate_each, validate_nested,
};

// ---------------------------------------------------------------------------
// Anaesthetic
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Anaesthetic {
    pub anaesthetic_type: String,
    pub duration: f64,
    #[serde(default = "minute")]
    pub duration_unit: TimeUnit,
    /// Depth on a 1-5 scale.
    pub level: Option<f64>,
}

const fn minute() -> TimeUnit {
    TimeUnit::Minute
}

impl Validate for Anaesthetic {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("Anaesthetic", "anaesthetic_type", &self.anaesthetic_type)?;
        check_positive("Anaesthetic", "duration", self.duration)?;
        check_optional_range("Anaesthetic", "level", self.level, 1.0, 5.0)
    }
}

// ---------------------------------------------------------------------------
// Craniotomy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CraniotomyType {
    Circle,
    Square,
    #[serde(rename = "Whole hemisphere craniotomy")]
    Whc,
    #[serde(rename = "Dual hemisphere craniotomy")]
    Dhc,
    Other,
}

impl CraniotomyType {
    /// Types whose placement must be recorded.
    pub const REQUIRES_POSITION: [Self; 3] = [Self::Circle, Self::Square, Self::Whc];
    /// Types whose opening size must be recorded.
    pub const REQUIRES_SIZE: [Self; 2] = [Self::Circle, Self::Square];

    #[must_use]
    pub fn requires_position(self) -> bool {
        Self::REQUIRES_POSITION.contains(&self)
    }

    #[must_use]
    pub fn requires_size(self) -> bool {
        Self::REQUIRES_SIZE.contains(&self)
    }
}

impl OtherSentinel for CraniotomyType {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Craniotomy {
    pub craniotomy_type: CraniotomyType,
    pub coordinate_system_name: Option<String>,
    pub position: Option<Vec<Transform>>,
    pub size: Option<f64>,
    #[serde(default)]
    pub size_unit: SizeUnit,
    pub implant_part_number: Option<String>,
    pub dura_removed: Option<bool>,
    pub notes: Option<String>,
}

impl Validate for Craniotomy {
    fn validate(&self) -> Result<(), ValidationError> {
        const RECORD: &str = "Craniotomy";

        OtherRequiresNotes::new(RECORD, "craniotomy_type")
            .check(&self.craniotomy_type, self.notes.as_deref())?;

        if self.craniotomy_type.requires_position() && self.position.is_none() {
            return Err(ValidationError::cross_field(
                RECORD,
                ["craniotomy_type", "position"],
                format!("position is required for {:?} craniotomies", self.craniotomy_type),
            ));
        }
        if self.craniotomy_type.requires_size() && self.size.is_none() {
            return Err(ValidationError::cross_field(
                RECORD,
                ["craniotomy_type", "size"],
                format!("size is required for {:?} craniotomies", self.craniotomy_type),
            ));
        }
        if let Some(size) = self.size {
            check_positive(RECORD, "size", size)?;
        }
        if let Some(position) = &self.position {
            validate_coordinate(RECORD, "position", position)?;
        }
        require_coordinate_system(
            RECORD,
            "position",
            self.position.is_some(),
            "coordinate_system_name",
            self.coordinate_system_name.as_deref(),
        )
    }
}

// ---------------------------------------------------------------------------
// Injection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum InjectionProfile {
    Bolus,
    Continuous,
}

/// Volume/current delivered at one injection depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InjectionDynamics {
    pub profile: InjectionProfile,
    pub volume: Option<f64>,
    #[serde(default)]
    pub volume_unit: VolumeUnit,
    pub injection_current: Option<f64>,
    #[serde(default)]
    pub injection_current_unit: CurrentUnit,
    pub duration: Option<f64>,
    #[serde(default)]
    pub duration_unit: TimeUnit,
}

impl Validate for InjectionDynamics {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.volume.is_none() && self.injection_current.is_none() {
            return Err(ValidationError::cross_field(
                "InjectionDynamics",
                ["volume", "injection_current"],
                "either volume or injection_current must be provided",
            ));
        }
        if let Some(volume) = self.volume {
            check_positive("InjectionDynamics", "volume", volume)?;
        }
        if let Some(duration) = self.duration {
            check_positive("InjectionDynamics", "duration", duration)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MaterialType {
    Virus,
    Tracer,
    #[serde(rename = "Small molecule")]
    SmallMolecule,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InjectionMaterial {
    pub name: String,
    pub material_type: MaterialType,
    /// gc/mL for viruses.
    pub titer: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Injection {
    pub injection_materials: Vec<InjectionMaterial>,
    pub targeted_structure: Option<String>,
    pub coordinate_system_name: Option<String>,
    /// One transform chain per injection depth.
    #[serde(default)]
    pub coordinates: Vec<Vec<Transform>>,
    /// One entry per coordinate.
    pub dynamics: Vec<InjectionDynamics>,
    pub protocol_id: Option<String>,
    pub notes: Option<String>,
}

impl Validate for Injection {
    fn validate(&self) -> Result<(), ValidationError> {
        const RECORD: &str = "Injection";

        if self.injection_materials.is_empty() {
            return Err(ValidationError::field(
                RECORD,
                "injection_materials",
                &self.injection_materials,
                "must list at least one material",
            ));
        }
        if self.dynamics.is_empty() {
            return Err(ValidationError::field(
                RECORD,
                "dynamics",
                &self.dynamics,
                "must list at least one dynamics entry",
            ));
        }
        if !self.coordinates.is_empty() {
            check_same_length(
                RECORD,
                "coordinates",
                self.coordinates.len(),
                "dynamics",
                self.dynamics.len(),
            )?;
        }
        for (index, coordinate) in self.coordinates.iter().enumerate() {
            validate_coordinate(RECORD, &format!("coordinates[{index}]"), coordinate)?;
        }
        validate_each("dynamics", &self.dynamics)?;
        require_coordinate_system(
            RECORD,
            "coordinates",
            !self.coordinates.is_empty(),
            "coordinate_system_name",
            self.coordinate_system_name.as_deref(),
        )
    }
}

// ---------------------------------------------------------------------------
// Headframe / Perfusion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Headframe {
    pub headframe_type: String,
    pub headframe_part_number: String,
    pub well_type: Option<String>,
    pub notes: Option<String>,
}

impl Validate for Headframe {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("Headframe", "headframe_type", &self.headframe_type)?;
        check_not_blank("Headframe", "headframe_part_number", &self.headframe_part_number)
    }
}

/// Terminal procedure producing the listed specimens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Perfusion {
    pub protocol_id: String,
    pub output_specimen_ids: Vec<String>,
}

impl Validate for Perfusion {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("Perfusion", "protocol_id", &self.protocol_id)?;
        if self.output_specimen_ids.is_empty() {
            return Err(ValidationError::field(
                "Perfusion",
                "output_specimen_ids",
                &self.output_specimen_ids,
                "must list at least one specimen",
            ));
        }
        Ok(())
    }
}

/// One step of a surgery, dispatched on `object_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum SurgeryProcedure {
    Craniotomy(Craniotomy),
    Injection(Injection),
    Headframe(Headframe),
    Perfusion(Perfusion),
}

impl SurgeryProcedure {
    #[must_use]
    pub fn coordinate_system_name(&self) -> Option<&str> {
        match self {
            Self::Craniotomy(craniotomy) => craniotomy.coordinate_system_name.as_deref(),
            Self::Injection(injection) => injection.coordinate_system_name.as_deref(),
            Self::Headframe(_) | Self::Perfusion(_) => None,
        }
    }
}

impl Validate for SurgeryProcedure {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Craniotomy(procedure) => procedure.validate(),
            Self::Injection(procedure) => procedure.validate(),
            Self::Headframe(procedure) => procedure.validate(),
            Self::Perfusion(procedure) => procedure.validate(),
        }
    }
}

// ---------------------------------------------------------------------------
// Surgery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Surgery {
    pub start_date: NaiveDate,
    pub experimenters: Vec<String>,
    pub ethics_review_id: Option<String>,
    pub animal_weight_prior: Option<f64>,
    pub anaesthesia: Option<Anaesthetic>,
    pub coordinate_system: Option<CoordinateSystem>,
    pub procedures: Vec<SurgeryProcedure>,
    pub notes: Option<String>,
}

impl Surgery {
    /// Validate with `fallback` as the coordinate system in effect when the
    /// surgery declares none of its own.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule, including a procedure naming a
    /// coordinate system other than the one in effect.
    pub fn validate_in(&self, fallback: Option<&CoordinateSystem>) -> Result<(), ValidationError> {
        validate_nested("anaesthesia", self.anaesthesia.as_ref())?;
        validate_nested("coordinate_system", self.coordinate_system.as_ref())?;
        validate_each("procedures", &self.procedures)?;

        let Some(system) = self.coordinate_system.as_ref().or(fallback) else {
            return Ok(());
        };
        for (index, procedure) in self.procedures.iter().enumerate() {
            if let Some(name) = procedure.coordinate_system_name() {
                if name != system.name {
                    return Err(ValidationError::cross_field(
                        "Surgery",
                        [
                            format!("procedures[{index}].coordinate_system_name"),
                            "coordinate_system.name".to_string(),
                        ],
                        format!(
                            "procedure uses coordinate system '{name}' but '{}' is declared",
                            system.name
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Validate for Surgery {
    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_in(None)
    }
}

// ---------------------------------------------------------------------------
// SpecimenProcedure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum SpecimenProcedureType {
    Clearing,
    Delipidation,
    Embedding,
    Fixation,
    #[serde(rename = "Hybridization Chain Reaction")]
    HybridizationChainReaction,
    Immunolabeling,
    #[serde(rename = "Refractive index matching")]
    RefractiveIndexMatching,
    Sectioning,
    #[serde(rename = "Soak")]
    Soak,
    Other,
}

impl OtherSentinel for SpecimenProcedureType {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Reagent {
    pub name: String,
    pub source: PidName,
    pub lot_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SpecimenProcedure {
    pub procedure_type: SpecimenProcedureType,
    pub specimen_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub experimenters: Vec<String>,
    #[serde(default)]
    pub protocol_id: Vec<String>,
    #[serde(default)]
    pub reagents: Vec<Reagent>,
    pub notes: Option<String>,
}

impl Validate for SpecimenProcedure {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("SpecimenProcedure", "specimen_id", &self.specimen_id)?;
        check_time_order(
            "SpecimenProcedure",
            "start_date",
            &self.start_date,
            "end_date",
            &self.end_date,
        )?;
        OtherRequiresNotes::new("SpecimenProcedure", "procedure_type")
            .check(&self.procedure_type, self.notes.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::{Axis, AxisName, Direction, Origin, Translation};

    fn position() -> Vec<Transform> {
        vec![Transform::Translation(Translation {
            translation: vec![-2.0, 2.5, 0.0],
        })]
    }

    fn craniotomy(kind: CraniotomyType) -> Craniotomy {
        Craniotomy {
            craniotomy_type: kind,
            coordinate_system_name: Some("BREGMA_ARI".into()),
            position: Some(position()),
            size: Some(5.0),
            size_unit: SizeUnit::Millimeter,
            implant_part_number: None,
            dura_removed: Some(false),
            notes: None,
        }
    }

    fn dynamics() -> InjectionDynamics {
        InjectionDynamics {
            profile: InjectionProfile::Bolus,
            volume: Some(50.0),
            volume_unit: VolumeUnit::Nanoliter,
            injection_current: None,
            injection_current_unit: CurrentUnit::Microamps,
            duration: None,
            duration_unit: TimeUnit::Second,
        }
    }

    fn injection(coordinates: usize, entries: usize) -> Injection {
        Injection {
            injection_materials: vec![InjectionMaterial {
                name: "AAV-GCaMP8".into(),
                material_type: MaterialType::Virus,
                titer: Some(2.1e13),
            }],
            targeted_structure: Some("VISp".into()),
            coordinate_system_name: Some("BREGMA_ARI".into()),
            coordinates: vec![position(); coordinates],
            dynamics: vec![dynamics(); entries],
            protocol_id: None,
            notes: None,
        }
    }

    #[test]
    fn circle_and_square_require_position_and_size() {
        for kind in [CraniotomyType::Circle, CraniotomyType::Square] {
            let mut c = craniotomy(kind);
            assert!(c.validate().is_ok());
            c.size = None;
            assert_eq!(c.validate().unwrap_err().fields(), vec!["craniotomy_type", "size"]);
            c.size = Some(5.0);
            c.position = None;
            assert_eq!(
                c.validate().unwrap_err().fields(),
                vec!["craniotomy_type", "position"]
            );
        }
    }

    #[test]
    fn whc_requires_position_only() {
        let mut c = craniotomy(CraniotomyType::Whc);
        c.size = None;
        assert!(c.validate().is_ok());
        c.position = None;
        assert!(c.validate().is_err());
    }

    #[test]
    fn dhc_leaves_position_and_size_optional() {
        let mut c = craniotomy(CraniotomyType::Dhc);
        c.size = None;
        c.position = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn position_requires_coordinate_system_name() {
        let mut c = craniotomy(CraniotomyType::Circle);
        c.coordinate_system_name = None;
        let err = c.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["position", "coordinate_system_name"]);
    }

    #[test]
    fn system_without_position_is_allowed() {
        let mut c = craniotomy(CraniotomyType::Dhc);
        c.position = None;
        assert!(c.validate().is_ok());
    }

    #[test]
    fn injection_lengths_must_match() {
        assert!(injection(2, 2).validate().is_ok());
        let err = injection(2, 1).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["coordinates", "dynamics"]);
        assert!(err.to_string().contains("coordinates has 2 entries but dynamics has 1"));
    }

    #[test]
    fn dynamics_need_volume_or_current() {
        let mut entry = dynamics();
        entry.volume = None;
        assert!(entry.validate().is_err());
        entry.injection_current = Some(5.0);
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn anaesthetic_level_is_bounded() {
        let mut anaesthetic = Anaesthetic {
            anaesthetic_type: "isoflurane".into(),
            duration: 90.0,
            duration_unit: TimeUnit::Minute,
            level: Some(1.5),
        };
        assert!(anaesthetic.validate().is_ok());
        anaesthetic.level = Some(6.0);
        let err = anaesthetic.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["level"]);
    }

    #[test]
    fn surgery_reconciles_coordinate_system_names() {
        let system = CoordinateSystem {
            name: "LAMBDA_ARI".into(),
            origin: Origin::Lambda,
            axes: vec![Axis {
                name: AxisName::Ap,
                direction: Direction::PosteriorToAnterior,
            }],
            axis_unit: SizeUnit::Millimeter,
        };
        let surgery = Surgery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            experimenters: vec!["Mam Moth".into()],
            ethics_review_id: Some("2109".into()),
            animal_weight_prior: Some(22.1),
            anaesthesia: None,
            coordinate_system: None,
            procedures: vec![SurgeryProcedure::Craniotomy(craniotomy(CraniotomyType::Circle))],
            notes: None,
        };
        assert!(surgery.validate().is_ok());
        let err = surgery.validate_in(Some(&system)).unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["procedures[0].coordinate_system_name", "coordinate_system.name"]
        );
    }

    #[test]
    fn nested_procedure_errors_carry_their_index() {
        let mut bad = craniotomy(CraniotomyType::Circle);
        bad.size = None;
        let surgery = Surgery {
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            experimenters: Vec::new(),
            ethics_review_id: None,
            animal_weight_prior: None,
            anaesthesia: None,
            coordinate_system: None,
            procedures: vec![
                SurgeryProcedure::Injection(injection(1, 1)),
                SurgeryProcedure::Craniotomy(bad),
            ],
            notes: None,
        };
        let err = surgery.validate().unwrap_err();
        assert_eq!(
            err.fields(),
            vec!["procedures[1].craniotomy_type", "procedures[1].size"]
        );
    }

    #[test]
    fn specimen_procedure_other_requires_notes() {
        let procedure = SpecimenProcedure {
            procedure_type: SpecimenProcedureType::Other,
            specimen_id: "625100_brain_1".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 4, 3).unwrap(),
            experimenters: vec!["Mam Moth".into()],
            protocol_id: Vec::new(),
            reagents: Vec::new(),
            notes: None,
        };
        assert!(procedure.validate().is_err());
    }
}
