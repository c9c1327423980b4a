use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compatibility::is_compatible;
use crate::components::{SpecimenProcedure, Surgery, SurgeryProcedure};
use crate::coordinates::CoordinateSystem;
use crate::errors::ValidationError;
use crate::record::Record;
use crate::validate::{Validate, check_not_blank, check_schema_version, validate_each, validate_nested};

fn default_schema_version() -> String {
    Procedures::SCHEMA_VERSION.to_string()
}

/// Everything done to a subject and to the specimens taken from it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Procedures {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub subject_id: String,
    #[serde(default)]
    pub subject_procedures: Vec<Surgery>,
    #[serde(default)]
    pub specimen_procedures: Vec<SpecimenProcedure>,
    pub coordinate_system: Option<CoordinateSystem>,
    pub notes: Option<String>,
}

impl Procedures {
    /// Every specimen id named in the document, with the field it came from.
    #[must_use]
    pub fn specimen_ids(&self) -> Vec<(String, &str)> {
        let mut ids = Vec::new();
        for (s, surgery) in self.subject_procedures.iter().enumerate() {
            for (p, procedure) in surgery.procedures.iter().enumerate() {
                if let SurgeryProcedure::Perfusion(perfusion) = procedure {
                    for (i, id) in perfusion.output_specimen_ids.iter().enumerate() {
                        ids.push((
                            format!("subject_procedures[{s}].procedures[{p}].output_specimen_ids[{i}]"),
                            id.as_str(),
                        ));
                    }
                }
            }
        }
        for (index, procedure) in self.specimen_procedures.iter().enumerate() {
            ids.push((
                format!("specimen_procedures[{index}].specimen_id"),
                procedure.specimen_id.as_str(),
            ));
        }
        ids
    }
}

impl Validate for Procedures {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Procedures", &self.schema_version, Self::SCHEMA_VERSION)?;
        check_not_blank("Procedures", "subject_id", &self.subject_id)?;
        validate_nested("coordinate_system", self.coordinate_system.as_ref())?;

        for (index, surgery) in self.subject_procedures.iter().enumerate() {
            surgery
                .validate_in(self.coordinate_system.as_ref())
                .map_err(|err| err.nested(&format!("subject_procedures[{index}]")))?;
        }
        validate_each("specimen_procedures", &self.specimen_procedures)?;

        for (field, specimen_id) in self.specimen_ids() {
            if !is_compatible(&self.subject_id, specimen_id) {
                return Err(ValidationError::cross_field(
                    "Procedures",
                    ["subject_id".to_string(), field],
                    format!(
                        "specimen id '{specimen_id}' does not extend subject id '{}'",
                        self.subject_id
                    ),
                ));
            }
        }
        Ok(())
    }
}

impl Record for Procedures {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "procedures";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
