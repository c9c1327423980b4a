//! Combining two partial documents of the same entity into one.

use lab_core::entities::{Acquisition, Procedures, Processing, QualityControl};
use lab_core::validate::Validate;

use crate::error::MergeError;
use crate::utils::{
    merge_coordinate_systems, merge_notes, merge_optional_list, merge_process_graph,
    merge_str_alphabetical, merge_str_tuple_lists, remove_duplicates,
};

/// Records that can be aggregated from several partial documents.
pub trait Combine: Sized {
    /// Build a new record holding the contents of both. The result is
    /// validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns `MergeError::Conflict` when the records disagree on a field
    /// that must match and `MergeError::Validation` when the combined record
    /// breaks one of its rules.
    fn combine(&self, other: &Self) -> Result<Self, MergeError>;
}

fn require_equal(field: &str, left: &str, right: &str) -> Result<(), MergeError> {
    if left == right {
        Ok(())
    } else {
        Err(MergeError::conflict(field, left, right))
    }
}

/// Either side's value when only one is set; both must agree otherwise.
fn merge_matching(
    field: &str,
    left: Option<&String>,
    right: Option<&String>,
) -> Result<Option<String>, MergeError> {
    match (left, right) {
        (Some(l), Some(r)) => require_equal(field, l, r).map(|()| Some(l.clone())),
        (value, None) | (None, value) => Ok(value.cloned()),
    }
}

impl Combine for Procedures {
    fn combine(&self, other: &Self) -> Result<Self, MergeError> {
        require_equal("schema_version", &self.schema_version, &other.schema_version)?;
        require_equal("subject_id", &self.subject_id, &other.subject_id)?;

        let combined = Self {
            schema_version: self.schema_version.clone(),
            subject_id: self.subject_id.clone(),
            subject_procedures: [
                self.subject_procedures.as_slice(),
                other.subject_procedures.as_slice(),
            ]
            .concat(),
            specimen_procedures: [
                self.specimen_procedures.as_slice(),
                other.specimen_procedures.as_slice(),
            ]
            .concat(),
            coordinate_system: merge_coordinate_systems(
                self.coordinate_system.as_ref(),
                other.coordinate_system.as_ref(),
            )?,
            notes: merge_notes(self.notes.as_deref(), other.notes.as_deref()),
        };
        Ok(combined.validated()?)
    }
}

impl Combine for Processing {
    fn combine(&self, other: &Self) -> Result<Self, MergeError> {
        require_equal("schema_version", &self.schema_version, &other.schema_version)?;

        let combined = Self {
            schema_version: self.schema_version.clone(),
            data_processes: [
                self.data_processes.as_slice(),
                other.data_processes.as_slice(),
            ]
            .concat(),
            pipelines: merge_optional_list(self.pipelines.as_deref(), other.pipelines.as_deref()),
            dependency_graph: merge_process_graph(
                self.dependency_graph.as_ref(),
                other.dependency_graph.as_ref(),
                &self.isolated_processes(),
                &other.isolated_processes(),
            ),
            notes: merge_notes(self.notes.as_deref(), other.notes.as_deref()),
        };
        Ok(combined.validated()?)
    }
}

impl Combine for QualityControl {
    fn combine(&self, other: &Self) -> Result<Self, MergeError> {
        require_equal("schema_version", &self.schema_version, &other.schema_version)?;

        let combined = Self {
            schema_version: self.schema_version.clone(),
            metrics: [self.metrics.as_slice(), other.metrics.as_slice()].concat(),
            key_experimenters: remove_duplicates(
                &[self.key_experimenters.as_slice(), other.key_experimenters.as_slice()].concat(),
            ),
            default_grouping: merge_str_tuple_lists(
                &self.default_grouping,
                &other.default_grouping,
            ),
            notes: merge_notes(self.notes.as_deref(), other.notes.as_deref()),
        };
        Ok(combined.validated()?)
    }
}

impl Combine for Acquisition {
    fn combine(&self, other: &Self) -> Result<Self, MergeError> {
        require_equal("schema_version", &self.schema_version, &other.schema_version)?;
        require_equal("subject_id", &self.subject_id, &other.subject_id)?;

        let combined = Self {
            schema_version: self.schema_version.clone(),
            subject_id: self.subject_id.clone(),
            acquisition_start_time: self.acquisition_start_time.min(other.acquisition_start_time),
            acquisition_end_time: self.acquisition_end_time.max(other.acquisition_end_time),
            experimenters: remove_duplicates(
                &[self.experimenters.as_slice(), other.experimenters.as_slice()].concat(),
            ),
            protocol_id: remove_duplicates(
                &[self.protocol_id.as_slice(), other.protocol_id.as_slice()].concat(),
            ),
            ethics_review_id: merge_matching(
                "ethics_review_id",
                self.ethics_review_id.as_ref(),
                other.ethics_review_id.as_ref(),
            )?,
            instrument_id: merge_str_alphabetical(
                Some(self.instrument_id.as_str()),
                Some(other.instrument_id.as_str()),
            )
            .unwrap_or_default(),
            acquisition_type: merge_str_alphabetical(
                Some(self.acquisition_type.as_str()),
                Some(other.acquisition_type.as_str()),
            )
            .unwrap_or_default(),
            mouse_platform_name: merge_matching(
                "mouse_platform_name",
                self.mouse_platform_name.as_ref(),
                other.mouse_platform_name.as_ref(),
            )?,
            coordinate_system: merge_coordinate_systems(
                self.coordinate_system.as_ref(),
                other.coordinate_system.as_ref(),
            )?,
            data_streams: [self.data_streams.as_slice(), other.data_streams.as_slice()].concat(),
            stimulus_epochs: [
                self.stimulus_epochs.as_slice(),
                other.stimulus_epochs.as_slice(),
            ]
            .concat(),
            notes: merge_notes(self.notes.as_deref(), other.notes.as_deref()),
        };
        tracing::debug!(
            instrument_id = %combined.instrument_id,
            streams = combined.data_streams.len(),
            "combined acquisitions"
        );
        Ok(combined.validated()?)
    }
}
