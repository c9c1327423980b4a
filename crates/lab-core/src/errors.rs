//! Error types for metadata records.
//!
//! Field-level and record-level rule violations are [`ValidationError`]s and
//! fail fast on the first violation. Cross-entity checks collect every
//! [`Mismatch`] into a single [`CompatibilityError`]. Merge conflicts live in
//! `lab-merge` and version errors in `lab-schema`; [`DocumentError`] is the
//! error for the load/write path.

use std::fmt;

use thiserror::Error;

/// A violated validation rule inside one record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A single field's declared constraint (range, pattern, requiredness)
    /// is violated.
    #[error("{record}.{field}: {reason} (got {value})")]
    FieldConstraint {
        record: &'static str,
        field: String,
        value: String,
        reason: String,
    },

    /// Two or more fields within the same record are mutually inconsistent.
    #[error("{record} [{}]: {reason}", .fields.join(", "))]
    CrossField {
        record: &'static str,
        fields: Vec<String>,
        reason: String,
    },

    /// Every missing requirement found in a single pass.
    #[error("{record}: {}", .messages.join("; "))]
    MissingRequirements {
        record: &'static str,
        messages: Vec<String>,
    },

    /// Two documents aggregated into one record disagree.
    #[error(transparent)]
    Incompatible(#[from] CompatibilityError),
}

impl ValidationError {
    pub fn field(
        record: &'static str,
        field: impl Into<String>,
        value: impl fmt::Debug,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldConstraint {
            record,
            field: field.into(),
            value: format!("{value:?}"),
            reason: reason.into(),
        }
    }

    pub fn cross_field<I, S>(record: &'static str, fields: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::CrossField {
            record,
            fields: fields.into_iter().map(Into::into).collect(),
            reason: reason.into(),
        }
    }

    /// Record type that raised the error.
    #[must_use]
    pub const fn record(&self) -> &'static str {
        match self {
            Self::FieldConstraint { record, .. }
            | Self::CrossField { record, .. }
            | Self::MissingRequirements { record, .. } => record,
            Self::Incompatible(_) => "Metadata",
        }
    }

    /// Field paths named by the error.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::FieldConstraint { field, .. } => vec![field.as_str()],
            Self::CrossField { fields, .. } => fields.iter().map(String::as_str).collect(),
            Self::MissingRequirements { .. } => Vec::new(),
            Self::Incompatible(err) => err.mismatches.iter().map(|m| m.field.as_str()).collect(),
        }
    }

    /// Prefix every field path with the location of the nested record, e.g.
    /// `position` raised by a craniotomy becomes
    /// `subject_procedures[0].procedures[1].position`.
    #[must_use]
    pub fn nested(self, prefix: &str) -> Self {
        match self {
            Self::FieldConstraint {
                record,
                field,
                value,
                reason,
            } => Self::FieldConstraint {
                record,
                field: format!("{prefix}.{field}"),
                value,
                reason,
            },
            Self::CrossField {
                record,
                fields,
                reason,
            } => Self::CrossField {
                record,
                fields: fields
                    .into_iter()
                    .map(|field| format!("{prefix}.{field}"))
                    .collect(),
                reason,
            },
            Self::MissingRequirements { record, messages } => Self::MissingRequirements {
                record,
                messages: messages
                    .into_iter()
                    .map(|message| format!("{prefix}: {message}"))
                    .collect(),
            },
            other @ Self::Incompatible(_) => other,
        }
    }
}

/// One key that disagrees between two related documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: String,
    pub expected: String,
    pub found: String,
}

impl Mismatch {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected '{}', found '{}'",
            self.field, self.expected, self.found
        )
    }
}

/// Every mismatch found between two related documents, reported together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} compatibility mismatch(es): {}", .mismatches.len(), join_mismatches(.mismatches))]
pub struct CompatibilityError {
    pub mismatches: Vec<Mismatch>,
}

impl CompatibilityError {
    /// `Ok(())` when nothing was collected, otherwise one error carrying all
    /// mismatches in the order they were found.
    ///
    /// # Errors
    ///
    /// Returns `CompatibilityError` if `mismatches` is non-empty.
    pub fn from_mismatches(mismatches: Vec<Mismatch>) -> Result<(), Self> {
        if mismatches.is_empty() {
            Ok(())
        } else {
            Err(Self { mismatches })
        }
    }
}

fn join_mismatches(mismatches: &[Mismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors from reading, parsing, or writing a record document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid JSON or does not match the record shape.
    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading or writing the document failed.
    #[error("Document I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document parsed but failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_constraint_message_names_field_and_reason() {
        let err = ValidationError::field("Anaesthetic", "level", 7.0, "must be between 1 and 5");
        assert_eq!(
            err.to_string(),
            "Anaesthetic.level: must be between 1 and 5 (got 7.0)"
        );
    }

    #[test]
    fn nested_prefixes_every_field_path() {
        let err = ValidationError::cross_field(
            "Craniotomy",
            ["position", "coordinate_system_name"],
            "position requires coordinate_system_name",
        )
        .nested("procedures[2]")
        .nested("subject_procedures[0]");

        assert_eq!(
            err.fields(),
            vec![
                "subject_procedures[0].procedures[2].position",
                "subject_procedures[0].procedures[2].coordinate_system_name",
            ]
        );
    }

    #[test]
    fn compatibility_error_reports_every_mismatch() {
        let result = CompatibilityError::from_mismatches(vec![
            Mismatch::new("instrument_id", "rig_a", "rig_b"),
            Mismatch::new("mouse_platform_name", "wheel", "disc"),
        ]);
        let message = result.unwrap_err().to_string();
        assert!(message.starts_with("2 compatibility mismatch(es)"));
        assert!(message.contains("instrument_id"));
        assert!(message.contains("mouse_platform_name"));
    }

    #[test]
    fn empty_mismatch_list_is_ok() {
        assert!(CompatibilityError::from_mismatches(Vec::new()).is_ok());
    }

    #[test]
    fn document_errors_name_their_source() {
        let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = DocumentError::from(json);
        assert!(err.to_string().starts_with("Invalid document JSON:"), "{err}");

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "acquisition.json");
        let err = DocumentError::from(io);
        assert_eq!(err.to_string(), "Document I/O error: acquisition.json");

        let invalid = ValidationError::field("Subject", "subject_id", "", "must not be blank");
        let err = DocumentError::from(invalid);
        assert!(matches!(err, DocumentError::Validation(_)));
        assert!(err.to_string().contains("Subject.subject_id"), "{err}");
    }
}
