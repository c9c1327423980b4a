use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::Sex;
use crate::errors::ValidationError;
use crate::record::Record;
use crate::registries::{ORGANIZATIONS, PidName, SPECIES, is_registered};
use crate::validate::{Validate, check_not_blank, check_schema_version};

fn default_schema_version() -> String {
    Subject::SCHEMA_VERSION.to_string()
}

/// The animal the data were collected from.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Subject {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub subject_id: String,
    pub species: PidName,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub genotype: Option<String>,
    /// Vendor or colony the subject came from.
    pub source: PidName,
    pub notes: Option<String>,
}

impl Validate for Subject {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Subject", &self.schema_version, Self::SCHEMA_VERSION)?;
        check_not_blank("Subject", "subject_id", &self.subject_id)?;
        if !is_registered(SPECIES, &self.species) {
            return Err(ValidationError::field(
                "Subject",
                "species",
                &self.species.name,
                "must be a registered species",
            ));
        }
        if !is_registered(ORGANIZATIONS, &self.source) {
            return Err(ValidationError::field(
                "Subject",
                "source",
                &self.source.name,
                "must be a registered organization",
            ));
        }
        Ok(())
    }
}

impl Record for Subject {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "subject";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
