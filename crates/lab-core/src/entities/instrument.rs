use std::collections::BTreeSet;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::components::{
    CameraAssembly, Detector, Device, EphysAssembly, HarpDevice, LightSource, MousePlatform,
    Objective, PatchCord,
};
use crate::coordinates::CoordinateSystem;
use crate::errors::ValidationError;
use crate::record::Record;
use crate::registries::Modality;
use crate::validate::{Validate, check_not_blank, check_schema_version, validate_each, validate_nested};

fn default_schema_version() -> String {
    Instrument::SCHEMA_VERSION.to_string()
}

/// Device lists that must be non-empty for each modality.
pub const MODALITY_REQUIREMENTS: &[(Modality, &[&str])] = &[
    (Modality::Ecephys, &["ephys_assemblies", "stick_microscopes"]),
    (Modality::Fib, &["light_sources", "detectors", "patch_cords"]),
    (Modality::Pophys, &["light_sources", "detectors", "objectives"]),
    (Modality::Slap, &["light_sources", "detectors", "objectives"]),
    (Modality::BehaviorVideos, &["cameras"]),
    (Modality::TrainedBehavior, &["harp_devices"]),
];

/// The hardware an acquisition ran on.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Instrument {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub instrument_id: String,
    pub location: Option<String>,
    pub modification_date: NaiveDate,
    pub modalities: Vec<Modality>,
    pub coordinate_system: Option<CoordinateSystem>,
    pub mouse_platform: Option<MousePlatform>,
    #[serde(default)]
    pub ephys_assemblies: Vec<EphysAssembly>,
    #[serde(default)]
    pub stick_microscopes: Vec<CameraAssembly>,
    #[serde(default)]
    pub cameras: Vec<CameraAssembly>,
    #[serde(default)]
    pub light_sources: Vec<LightSource>,
    #[serde(default)]
    pub detectors: Vec<Detector>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub patch_cords: Vec<PatchCord>,
    #[serde(default)]
    pub harp_devices: Vec<HarpDevice>,
    #[serde(default)]
    pub additional_devices: Vec<Device>,
    pub notes: Option<String>,
}

impl Instrument {
    /// An instrument with no devices declared.
    #[must_use]
    pub fn empty(instrument_id: impl Into<String>, modification_date: NaiveDate) -> Self {
        Self {
            schema_version: default_schema_version(),
            instrument_id: instrument_id.into(),
            location: None,
            modification_date,
            modalities: Vec::new(),
            coordinate_system: None,
            mouse_platform: None,
            ephys_assemblies: Vec::new(),
            stick_microscopes: Vec::new(),
            cameras: Vec::new(),
            light_sources: Vec::new(),
            detectors: Vec::new(),
            objectives: Vec::new(),
            patch_cords: Vec::new(),
            harp_devices: Vec::new(),
            additional_devices: Vec::new(),
            notes: None,
        }
    }

    /// Number of entries in the device list called `field`.
    fn device_count(&self, field: &str) -> usize {
        match field {
            "ephys_assemblies" => self.ephys_assemblies.len(),
            "stick_microscopes" => self.stick_microscopes.len(),
            "cameras" => self.cameras.len(),
            "light_sources" => self.light_sources.len(),
            "detectors" => self.detectors.len(),
            "objectives" => self.objectives.len(),
            "patch_cords" => self.patch_cords.len(),
            "harp_devices" => self.harp_devices.len(),
            "additional_devices" => self.additional_devices.len(),
            _ => 0,
        }
    }

    /// Names of every declared device, assemblies and their parts included,
    /// in declaration order.
    #[must_use]
    pub fn device_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        if let Some(platform) = &self.mouse_platform {
            names.push(platform.name());
        }
        for assembly in &self.ephys_assemblies {
            names.push(&assembly.name);
            names.push(&assembly.manipulator.name);
            names.extend(assembly.probes.iter().map(|probe| probe.device.name.as_str()));
        }
        for assembly in self.stick_microscopes.iter().chain(&self.cameras) {
            names.push(&assembly.name);
            names.push(&assembly.camera.device.name);
            names.push(&assembly.lens.name);
        }
        names.extend(self.light_sources.iter().map(|light| light.device().name.as_str()));
        names.extend(self.detectors.iter().map(|d| d.device.name.as_str()));
        names.extend(self.objectives.iter().map(|o| o.device.name.as_str()));
        names.extend(self.patch_cords.iter().map(|p| p.device.name.as_str()));
        names.extend(self.harp_devices.iter().map(|h| h.device.name.as_str()));
        names.extend(self.additional_devices.iter().map(|d| d.name.as_str()));
        names
    }

    /// Check every declared modality against [`MODALITY_REQUIREMENTS`],
    /// reporting all missing device lists at once. A modality listed twice
    /// is checked once; one without requirements always passes.
    ///
    /// # Errors
    ///
    /// Returns `MissingRequirements` listing one message per empty list.
    pub fn validate_modalities(&self) -> Result<(), ValidationError> {
        let mut messages = Vec::new();
        let mut checked = BTreeSet::new();
        for modality in &self.modalities {
            if !checked.insert(*modality) {
                continue;
            }
            let Some((_, fields)) = MODALITY_REQUIREMENTS
                .iter()
                .find(|(required_for, _)| required_for == modality)
            else {
                continue;
            };
            for field in *fields {
                if self.device_count(field) == 0 {
                    messages.push(format!(
                        "{field} must be provided for modality {}",
                        modality.abbreviation()
                    ));
                }
            }
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingRequirements {
                record: "Instrument",
                messages,
            })
        }
    }
}

impl Validate for Instrument {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Instrument", &self.schema_version, Self::SCHEMA_VERSION)?;
        check_not_blank("Instrument", "instrument_id", &self.instrument_id)?;
        if self.modalities.is_empty() {
            return Err(ValidationError::field(
                "Instrument",
                "modalities",
                &self.modalities,
                "must declare at least one modality",
            ));
        }
        self.validate_modalities()?;

        validate_nested("coordinate_system", self.coordinate_system.as_ref())?;
        validate_nested("mouse_platform", self.mouse_platform.as_ref())?;
        validate_each("ephys_assemblies", &self.ephys_assemblies)?;
        validate_each("stick_microscopes", &self.stick_microscopes)?;
        validate_each("cameras", &self.cameras)?;
        validate_each("light_sources", &self.light_sources)?;
        validate_each("detectors", &self.detectors)?;
        validate_each("objectives", &self.objectives)?;
        validate_each("patch_cords", &self.patch_cords)?;
        validate_each("harp_devices", &self.harp_devices)?;
        validate_each("additional_devices", &self.additional_devices)?;

        let mut seen = BTreeSet::new();
        for name in self.device_names() {
            if !seen.insert(name) {
                return Err(ValidationError::field(
                    "Instrument",
                    "device names",
                    name,
                    "device names must be unique within an instrument",
                ));
            }
        }
        Ok(())
    }
}

impl Record for Instrument {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "instrument";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
