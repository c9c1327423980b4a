use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::components::{Grouping, QcMetric, Stage, Status, aggregate_status};
use crate::errors::ValidationError;
use crate::record::Record;
use crate::registries::Modality;
use crate::validate::{Validate, check_schema_version, validate_each};

fn default_schema_version() -> String {
    QualityControl::SCHEMA_VERSION.to_string()
}

/// Quality-control metrics evaluated on a data asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityControl {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub metrics: Vec<QcMetric>,
    #[serde(default)]
    pub key_experimenters: Vec<String>,
    /// Tags used to group metrics for display, outermost first.
    #[serde(default)]
    pub default_grouping: Vec<Grouping>,
    pub notes: Option<String>,
}

impl QualityControl {
    /// Overall status across every metric.
    #[must_use]
    pub fn status(&self) -> Status {
        aggregate_status(&self.metrics)
    }

    /// Status of the metrics recorded for one modality, if any were.
    #[must_use]
    pub fn modality_status(&self, modality: Modality) -> Option<Status> {
        let metrics: Vec<&QcMetric> =
            self.metrics.iter().filter(|m| m.modality == modality).collect();
        (!metrics.is_empty()).then(|| aggregate_status(metrics))
    }

    /// Status of the metrics recorded at one stage, if any were.
    #[must_use]
    pub fn stage_status(&self, stage: Stage) -> Option<Status> {
        let metrics: Vec<&QcMetric> = self.metrics.iter().filter(|m| m.stage == stage).collect();
        (!metrics.is_empty()).then(|| aggregate_status(metrics))
    }

    /// Every tag carried by at least one metric.
    #[must_use]
    pub fn tags(&self) -> BTreeSet<&str> {
        self.metrics
            .iter()
            .flat_map(|m| m.tags.iter().map(String::as_str))
            .collect()
    }
}

impl Validate for QualityControl {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("QualityControl", &self.schema_version, Self::SCHEMA_VERSION)?;
        if self.metrics.is_empty() {
            return Err(ValidationError::field(
                "QualityControl",
                "metrics",
                self.metrics.len(),
                "must hold at least one metric",
            ));
        }
        validate_each("metrics", &self.metrics)?;

        let tags = self.tags();
        for (index, group) in self.default_grouping.iter().enumerate() {
            let group_tags = match group {
                Grouping::Single(tag) => std::slice::from_ref(tag),
                Grouping::Tuple(tags) => tags.as_slice(),
            };
            if let Some(unused) = group_tags.iter().find(|tag| !tags.contains(tag.as_str())) {
                return Err(ValidationError::cross_field(
                    "QualityControl",
                    [format!("default_grouping[{index}]"), "metrics".into()],
                    format!("grouping tag '{unused}' is not used by any metric"),
                ));
            }
        }
        Ok(())
    }
}

impl Record for QualityControl {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "quality_control";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::components::QcStatus;

    fn metric(modality: Modality, status: Status, tags: &[&str]) -> QcMetric {
        QcMetric {
            name: format!("{modality} check"),
            modality,
            stage: Stage::Raw,
            value: serde_json::json!(true),
            description: None,
            reference: None,
            status_history: vec![QcStatus {
                evaluator: "Automated".into(),
                status,
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            }],
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
        }
    }

    fn qc() -> QualityControl {
        QualityControl {
            schema_version: default_schema_version(),
            metrics: vec![
                metric(Modality::Ecephys, Status::Pass, &["probe A"]),
                metric(Modality::BehaviorVideos, Status::Fail, &["camera"]),
            ],
            key_experimenters: vec!["Dr. Dan".into()],
            default_grouping: vec![Grouping::from("probe A")],
            notes: None,
        }
    }

    #[test]
    fn statuses_aggregate_per_modality() {
        let qc = qc();
        assert!(qc.validate().is_ok());
        assert_eq!(qc.status(), Status::Fail);
        assert_eq!(qc.modality_status(Modality::Ecephys), Some(Status::Pass));
        assert_eq!(qc.modality_status(Modality::Fib), None);
        assert_eq!(qc.stage_status(Stage::Raw), Some(Status::Fail));
    }

    #[test]
    fn grouping_tags_must_be_used() {
        let mut qc = qc();
        qc.default_grouping = vec![Grouping::Tuple(vec!["probe A".into(), "shank 2".into()])];
        let err = qc.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["default_grouping[0]", "metrics"]);
        assert!(err.to_string().contains("shank 2"));
    }
}
