//! Quality-control metrics and their evaluation history.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::registries::Modality;
use crate::validate::{Validate, check_not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Status {
    Pass,
    Fail,
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Stage {
    #[serde(rename = "Raw data")]
    Raw,
    Processing,
    Analysis,
    #[serde(rename = "Multi-asset")]
    MultiAsset,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QcStatus {
    pub evaluator: String,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QcMetric {
    pub name: String,
    pub modality: Modality,
    pub stage: Stage,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub reference: Option<String>,
    /// Oldest first; the last entry is the current status.
    pub status_history: Vec<QcStatus>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl QcMetric {
    #[must_use]
    pub fn latest_status(&self) -> Option<Status> {
        self.status_history.last().map(|entry| entry.status)
    }
}

impl Validate for QcMetric {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("QcMetric", "name", &self.name)?;
        if self.status_history.is_empty() {
            return Err(ValidationError::field(
                "QcMetric",
                "status_history",
                &self.status_history,
                "must hold at least one status",
            ));
        }
        Ok(())
    }
}

/// A grouping key: a single tag or a tuple of tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Grouping {
    Single(String),
    Tuple(Vec<String>),
}

impl Grouping {
    /// Flatten into the list of tags it holds.
    #[must_use]
    pub fn into_tags(self) -> Vec<String> {
        match self {
            Self::Single(tag) => vec![tag],
            Self::Tuple(tags) => tags,
        }
    }
}

impl From<&str> for Grouping {
    fn from(tag: &str) -> Self {
        Self::Single(tag.to_string())
    }
}

/// Overall status of a set of metrics: any failure fails, otherwise any
/// pending keeps it pending.
#[must_use]
pub fn aggregate_status<'a>(metrics: impl IntoIterator<Item = &'a QcMetric>) -> Status {
    let mut result = Status::Pass;
    for metric in metrics {
        match metric.latest_status() {
            Some(Status::Fail) => return Status::Fail,
            Some(Status::Pending) | None => result = Status::Pending,
            Some(Status::Pass) => {}
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn metric(status: Status) -> QcMetric {
        QcMetric {
            name: "Probe drift".into(),
            modality: Modality::Ecephys,
            stage: Stage::Processing,
            value: serde_json::json!({"drift_um": 12.5}),
            description: None,
            reference: None,
            status_history: vec![QcStatus {
                evaluator: "Automated".into(),
                status,
                timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            }],
            tags: vec!["probe A".into()],
        }
    }

    #[test]
    fn empty_history_is_rejected() {
        let mut m = metric(Status::Pass);
        m.status_history.clear();
        assert!(m.validate().is_err());
    }

    #[test]
    fn aggregate_prefers_fail_then_pending() {
        let pass = metric(Status::Pass);
        let pending = metric(Status::Pending);
        let fail = metric(Status::Fail);
        assert_eq!(aggregate_status([&pass]), Status::Pass);
        assert_eq!(aggregate_status([&pass, &pending]), Status::Pending);
        assert_eq!(aggregate_status([&pending, &fail, &pass]), Status::Fail);
    }

    #[test]
    fn grouping_is_untagged() {
        let groups = vec![Grouping::from("probe"), Grouping::Tuple(vec!["a".into(), "b".into()])];
        let json = serde_json::to_string(&groups).unwrap();
        assert_eq!(json, r#"["probe",["a","b"]]"#);
        let back: Vec<Grouping> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, groups);
    }
}
