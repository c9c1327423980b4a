//! Pipeline steps and their resource usage.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::validate::{
    OtherRequiresNotes, OtherSentinel, Validate, check_not_blank, check_time_order,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ProcessName {
    Analysis,
    Compression,
    #[serde(rename = "Ephys curation")]
    EphysCuration,
    #[serde(rename = "Ephys postprocessing")]
    EphysPostprocessing,
    #[serde(rename = "Ephys preprocessing")]
    EphysPreprocessing,
    #[serde(rename = "Fiducial segmentation")]
    FiducialSegmentation,
    #[serde(rename = "Image atlas alignment")]
    ImageAtlasAlignment,
    #[serde(rename = "Image background subtraction")]
    ImageBackgroundSubtraction,
    #[serde(rename = "Image cell segmentation")]
    ImageCellSegmentation,
    #[serde(rename = "Image destriping")]
    ImageDestriping,
    #[serde(rename = "Image tile alignment")]
    ImageTileAlignment,
    #[serde(rename = "Image tile fusing")]
    ImageTileFusing,
    #[serde(rename = "Spike sorting")]
    SpikeSorting,
    #[serde(rename = "Video motion correction")]
    VideoMotionCorrection,
    #[serde(rename = "Video ROI segmentation")]
    VideoRoiSegmentation,
    Other,
}

impl OtherSentinel for ProcessName {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ProcessStage {
    Processing,
    Analysis,
}

/// Code that ran a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Code {
    pub url: String,
    pub name: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub parameters: Option<serde_json::Value>,
    pub run_script: Option<String>,
}

impl Code {
    #[must_use]
    pub fn at(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            version: None,
            language: None,
            parameters: None,
            run_script: None,
        }
    }
}

/// One usage sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceTimestamped {
    pub timestamp: DateTime<Utc>,
    pub usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResourceUsage {
    pub os: String,
    pub architecture: String,
    pub cpu: Option<String>,
    pub cpu_cores: Option<u32>,
    pub gpu: Option<String>,
    /// Gigabytes.
    pub system_memory: Option<f64>,
    /// Gigabytes.
    pub ram: Option<f64>,
    pub cpu_usage: Option<Vec<ResourceTimestamped>>,
    pub gpu_usage: Option<Vec<ResourceTimestamped>>,
    pub ram_usage: Option<Vec<ResourceTimestamped>>,
    #[serde(default = "percent")]
    pub usage_unit: String,
}

fn percent() -> String {
    "percent".to_string()
}

impl Validate for ResourceUsage {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, samples) in [
            ("cpu_usage", &self.cpu_usage),
            ("gpu_usage", &self.gpu_usage),
            ("ram_usage", &self.ram_usage),
        ] {
            let Some(samples) = samples else { continue };
            if let Some(index) = samples.iter().position(|s| s.usage < 0.0) {
                return Err(ValidationError::field(
                    "ResourceUsage",
                    format!("{field}[{index}].usage"),
                    samples[index].usage,
                    "must not be negative",
                ));
            }
        }
        Ok(())
    }
}

/// One step of a processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DataProcess {
    pub process_type: ProcessName,
    /// Unique within a processing record; dependency graphs refer to it.
    pub name: String,
    pub stage: ProcessStage,
    pub code: Code,
    pub experimenters: Vec<String>,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: Option<DateTime<Utc>>,
    pub output_path: Option<String>,
    pub resources: Option<ResourceUsage>,
    pub notes: Option<String>,
}

impl Validate for DataProcess {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("DataProcess", "name", &self.name)?;
        check_not_blank("DataProcess", "code.url", &self.code.url)?;
        if let Some(end) = &self.end_date_time {
            check_time_order(
                "DataProcess",
                "start_date_time",
                &self.start_date_time,
                "end_date_time",
                end,
            )?;
        }
        OtherRequiresNotes::new("DataProcess", "process_type")
            .check(&self.process_type, self.notes.as_deref())?;
        match &self.resources {
            Some(resources) => resources.validate().map_err(|err| err.nested("resources")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn process(kind: ProcessName) -> DataProcess {
        DataProcess {
            process_type: kind,
            name: "spike sorting".into(),
            stage: ProcessStage::Processing,
            code: Code::at("https://github.com/example/sorter"),
            experimenters: vec!["Dr. Dan".into()],
            start_date_time: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
            end_date_time: Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
            output_path: Some("/results/sorted".into()),
            resources: None,
            notes: None,
        }
    }

    #[test]
    fn other_process_requires_notes() {
        assert!(process(ProcessName::SpikeSorting).validate().is_ok());
        let mut other = process(ProcessName::Other);
        assert!(other.validate().is_err());
        other.notes = Some("Custom denoising".into());
        assert!(other.validate().is_ok());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let mut p = process(ProcessName::Compression);
        p.end_date_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let err = p.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["start_date_time", "end_date_time"]);
    }

    #[test]
    fn negative_usage_sample_is_rejected() {
        let mut p = process(ProcessName::Compression);
        p.resources = Some(ResourceUsage {
            os: "Linux".into(),
            architecture: "x86_64".into(),
            cpu: None,
            cpu_cores: Some(16),
            gpu: None,
            system_memory: None,
            ram: None,
            cpu_usage: Some(vec![ResourceTimestamped {
                timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
                usage: -1.0,
            }]),
            gpu_usage: None,
            ram_usage: None,
            usage_unit: percent(),
        });
        let err = p.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["resources.cpu_usage[0].usage"]);
    }

    #[test]
    fn process_name_uses_readable_labels() {
        let json = serde_json::to_string(&ProcessName::VideoRoiSegmentation).unwrap();
        assert_eq!(json, "\"Video ROI segmentation\"");
    }
}
