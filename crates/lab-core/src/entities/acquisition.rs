use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::components::{DeviceConfig, StimulusEpoch};
use crate::coordinates::CoordinateSystem;
use crate::errors::ValidationError;
use crate::record::Record;
use crate::registries::Modality;
use crate::validate::{
    Validate, check_not_blank, check_schema_version, check_time_order, validate_each,
    validate_nested,
};

fn default_schema_version() -> String {
    Acquisition::SCHEMA_VERSION.to_string()
}

/// One continuous recording from a set of active devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataStream {
    pub stream_start_time: DateTime<Utc>,
    pub stream_end_time: DateTime<Utc>,
    pub modalities: Vec<Modality>,
    pub active_devices: Vec<String>,
    #[serde(default)]
    pub configurations: Vec<DeviceConfig>,
    pub notes: Option<String>,
}

impl Validate for DataStream {
    fn validate(&self) -> Result<(), ValidationError> {
        check_time_order(
            "DataStream",
            "stream_start_time",
            &self.stream_start_time,
            "stream_end_time",
            &self.stream_end_time,
        )?;
        if self.modalities.is_empty() {
            return Err(ValidationError::field(
                "DataStream",
                "modalities",
                &self.modalities,
                "must declare at least one modality",
            ));
        }
        validate_each("configurations", &self.configurations)?;
        for (index, config) in self.configurations.iter().enumerate() {
            let name = config.device_name();
            if !self.active_devices.iter().any(|active| active == name) {
                return Err(ValidationError::cross_field(
                    "DataStream",
                    [format!("configurations[{index}].device_name"), "active_devices".into()],
                    format!("configured device '{name}' is not listed in active_devices"),
                ));
            }
        }
        Ok(())
    }
}

/// A single data-collection session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Acquisition {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub subject_id: String,
    pub acquisition_start_time: DateTime<Utc>,
    pub acquisition_end_time: DateTime<Utc>,
    #[serde(default)]
    pub experimenters: Vec<String>,
    #[serde(default)]
    pub protocol_id: Vec<String>,
    pub ethics_review_id: Option<String>,
    pub instrument_id: String,
    pub acquisition_type: String,
    pub mouse_platform_name: Option<String>,
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(default)]
    pub data_streams: Vec<DataStream>,
    #[serde(default)]
    pub stimulus_epochs: Vec<StimulusEpoch>,
    pub notes: Option<String>,
}

impl Acquisition {
    /// Modalities recorded by any data stream, sorted and de-duplicated.
    #[must_use]
    pub fn modalities(&self) -> Vec<Modality> {
        let mut modalities: Vec<Modality> = self
            .data_streams
            .iter()
            .flat_map(|stream| stream.modalities.iter().copied())
            .collect();
        modalities.sort();
        modalities.dedup();
        modalities
    }
}

impl Validate for Acquisition {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Acquisition", &self.schema_version, Self::SCHEMA_VERSION)?;
        check_not_blank("Acquisition", "subject_id", &self.subject_id)?;
        check_not_blank("Acquisition", "instrument_id", &self.instrument_id)?;
        check_not_blank("Acquisition", "acquisition_type", &self.acquisition_type)?;
        check_time_order(
            "Acquisition",
            "acquisition_start_time",
            &self.acquisition_start_time,
            "acquisition_end_time",
            &self.acquisition_end_time,
        )?;
        validate_nested("coordinate_system", self.coordinate_system.as_ref())?;
        validate_each("data_streams", &self.data_streams)?;
        validate_each("stimulus_epochs", &self.stimulus_epochs)
    }
}

impl Record for Acquisition {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "acquisition";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
