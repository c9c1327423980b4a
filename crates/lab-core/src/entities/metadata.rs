use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compatibility::{InstrumentAcquisitionCompatibility, is_compatible};
use crate::errors::{CompatibilityError, Mismatch, ValidationError};
use crate::record::Record;
use crate::validate::{Validate, check_not_blank, check_schema_version, validate_nested};

use super::{Acquisition, Instrument, Procedures, Processing, QualityControl, Subject};

fn default_schema_version() -> String {
    Metadata::SCHEMA_VERSION.to_string()
}

/// Every document describing one data asset, checked against each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    /// Name of the data asset.
    pub name: String,
    pub location: Option<String>,
    pub subject: Option<Subject>,
    pub procedures: Option<Procedures>,
    pub instrument: Option<Instrument>,
    pub acquisition: Option<Acquisition>,
    pub processing: Option<Processing>,
    pub quality_control: Option<QualityControl>,
}

impl Metadata {
    /// Run every cross-document check, collecting all mismatches.
    ///
    /// # Errors
    ///
    /// Returns one [`CompatibilityError`] holding every mismatch.
    pub fn check_consistency(&self) -> Result<(), CompatibilityError> {
        let mut mismatches = Vec::new();

        if let Some(subject) = &self.subject {
            let expected = subject.subject_id.as_str();
            if let Some(procedures) = &self.procedures {
                if procedures.subject_id != expected {
                    mismatches.push(Mismatch::new(
                        "procedures.subject_id",
                        expected,
                        &procedures.subject_id,
                    ));
                }
                for (field, specimen_id) in procedures.specimen_ids() {
                    if !is_compatible(expected, specimen_id) {
                        mismatches.push(Mismatch::new(
                            format!("procedures.{field}"),
                            format!("an id extending {expected}"),
                            specimen_id,
                        ));
                    }
                }
            }
            if let Some(acquisition) = &self.acquisition {
                if acquisition.subject_id != expected {
                    mismatches.push(Mismatch::new(
                        "acquisition.subject_id",
                        expected,
                        &acquisition.subject_id,
                    ));
                }
            }
        }

        if let (Some(instrument), Some(acquisition)) = (&self.instrument, &self.acquisition) {
            if let Err(err) =
                InstrumentAcquisitionCompatibility::new(instrument, acquisition).run_compatibility_check()
            {
                mismatches.extend(err.mismatches);
            }
        }
        CompatibilityError::from_mismatches(mismatches)
    }
}

impl Validate for Metadata {
    fn validate(&self) -> Result<(), ValidationError> {
        check_schema_version("Metadata", &self.schema_version, Self::SCHEMA_VERSION)?;
        check_not_blank("Metadata", "name", &self.name)?;
        validate_nested("subject", self.subject.as_ref())?;
        validate_nested("procedures", self.procedures.as_ref())?;
        validate_nested("instrument", self.instrument.as_ref())?;
        validate_nested("acquisition", self.acquisition.as_ref())?;
        validate_nested("processing", self.processing.as_ref())?;
        validate_nested("quality_control", self.quality_control.as_ref())?;
        self.check_consistency()?;
        Ok(())
    }
}

impl Record for Metadata {
    const SCHEMA_VERSION: &'static str = "2.0.0";
    const FILE_STEM: &'static str = "metadata";

    fn schema_version(&self) -> &str {
        &self.schema_version
    }
}
