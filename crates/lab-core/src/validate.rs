//! Reusable validation rules.
//!
//! Every record implements [`Validate`]. The helpers here encode the rule
//! shapes that recur across records (numeric ranges, notes required when a
//! field holds its "Other" sentinel, position/system pairing, list-length
//! co-validation, timestamp ordering) so each record lists its rules instead
//! of re-implementing them.

use std::fmt;

use crate::errors::ValidationError;

/// Construction-time validation for a record.
pub trait Validate {
    /// Check every rule of the record, failing on the first violation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Validate and hand the record back, so construction reads as
    /// `Subject { .. }.validated()?`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] encountered.
    fn validated(self) -> Result<Self, ValidationError>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

/// Validate every item of a nested list, prefixing error paths with
/// `field[index]`.
///
/// # Errors
///
/// Returns the first item's error, re-rooted under `field[index]`.
pub fn validate_each<T: Validate>(field: &str, items: &[T]) -> Result<(), ValidationError> {
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|err| err.nested(&format!("{field}[{index}]")))?;
    }
    Ok(())
}

/// Validate an optional nested record, prefixing error paths with `field`.
///
/// # Errors
///
/// Returns the nested record's error, re-rooted under `field`.
pub fn validate_nested<T: Validate>(field: &str, item: Option<&T>) -> Result<(), ValidationError> {
    match item {
        Some(item) => item.validate().map_err(|err| err.nested(field)),
        None => Ok(()),
    }
}

/// Enumerations carrying an "Other" sentinel value.
pub trait OtherSentinel {
    fn is_other(&self) -> bool;
}

impl<T: OtherSentinel> OtherSentinel for Option<T> {
    fn is_other(&self) -> bool {
        self.as_ref().is_some_and(OtherSentinel::is_other)
    }
}

/// Free text counts as present only when it has non-whitespace content.
#[must_use]
pub fn has_text(notes: Option<&str>) -> bool {
    notes.is_some_and(|text| !text.trim().is_empty())
}

/// "If `field` holds its Other sentinel then `notes_field` must be
/// non-empty", parameterized by the triggering field and the notes field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtherRequiresNotes {
    pub record: &'static str,
    pub field: &'static str,
    pub notes_field: &'static str,
}

impl OtherRequiresNotes {
    #[must_use]
    pub const fn new(record: &'static str, field: &'static str) -> Self {
        Self {
            record,
            field,
            notes_field: "notes",
        }
    }

    #[must_use]
    pub const fn with_notes_field(mut self, notes_field: &'static str) -> Self {
        self.notes_field = notes_field;
        self
    }

    /// # Errors
    ///
    /// Returns `CrossField` naming both fields when `value` is the Other
    /// sentinel and `notes` is absent or blank.
    pub fn check<T: OtherSentinel>(
        &self,
        value: &T,
        notes: Option<&str>,
    ) -> Result<(), ValidationError> {
        if value.is_other() && !has_text(notes) {
            return Err(ValidationError::cross_field(
                self.record,
                [self.field, self.notes_field],
                format!(
                    "{} cannot be empty when {} is Other",
                    self.notes_field, self.field
                ),
            ));
        }
        Ok(())
    }
}

/// # Errors
///
/// Returns `FieldConstraint` when `value` lies outside `[min, max]`.
pub fn check_range<T>(
    record: &'static str,
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Debug + fmt::Display,
{
    if value < min || value > max {
        return Err(ValidationError::field(
            record,
            field,
            value,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `FieldConstraint` when a present `value` lies outside `[min, max]`.
pub fn check_optional_range<T>(
    record: &'static str,
    field: &str,
    value: Option<T>,
    min: T,
    max: T,
) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Debug + fmt::Display,
{
    value.map_or(Ok(()), |value| check_range(record, field, value, min, max))
}

/// # Errors
///
/// Returns `FieldConstraint` when `value` is not strictly positive.
pub fn check_positive(record: &'static str, field: &str, value: f64) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() {
        return Err(ValidationError::field(
            record,
            field,
            value,
            "must be greater than 0",
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `FieldConstraint` when `value` is empty or whitespace.
pub fn check_not_blank(record: &'static str, field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::field(
            record,
            field,
            value,
            "must not be empty",
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `FieldConstraint` when the record's schema-version tag differs
/// from the version of the shape this build understands.
pub fn check_schema_version(
    record: &'static str,
    found: &str,
    expected: &str,
) -> Result<(), ValidationError> {
    if found != expected {
        return Err(ValidationError::field(
            record,
            "schema_version",
            found,
            format!("must be {expected}"),
        ));
    }
    Ok(())
}

/// A position-like field requires its coordinate-system field. The reverse
/// is not required: a system alone is allowed as context.
///
/// # Errors
///
/// Returns `CrossField` naming both fields when `position_set` holds and
/// `system` is absent or blank.
pub fn require_coordinate_system(
    record: &'static str,
    position_field: &str,
    position_set: bool,
    system_field: &str,
    system: Option<&str>,
) -> Result<(), ValidationError> {
    if position_set && !has_text(system) {
        return Err(ValidationError::cross_field(
            record,
            [position_field, system_field],
            format!("{position_field} is set, so {system_field} must be set"),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `CrossField` naming both lists and their lengths when they differ.
pub fn check_same_length(
    record: &'static str,
    left_field: &str,
    left_len: usize,
    right_field: &str,
    right_len: usize,
) -> Result<(), ValidationError> {
    if left_len != right_len {
        return Err(ValidationError::cross_field(
            record,
            [left_field, right_field],
            format!(
                "{left_field} has {left_len} entries but {right_field} has {right_len}; lengths must match"
            ),
        ));
    }
    Ok(())
}

/// # Errors
///
/// Returns `CrossField` when `end` is earlier than `start`.
pub fn check_time_order<T>(
    record: &'static str,
    start_field: &str,
    start: &T,
    end_field: &str,
    end: &T,
) -> Result<(), ValidationError>
where
    T: PartialOrd + fmt::Display,
{
    if end < start {
        return Err(ValidationError::cross_field(
            record,
            [start_field, end_field],
            format!("{end_field} ({end}) is earlier than {start_field} ({start})"),
        ));
    }
    Ok(())
}
