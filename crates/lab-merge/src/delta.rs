//! Delta compression for lists of flat records.
//!
//! A compressed list is an object holding a single [`DELTA_MARKER`] key. Its
//! array keeps the first record in full and, for every later record, only
//! the keys whose values changed since the previous record. Expansion
//! forward-fills every key a diff leaves out, so a record may add keys but
//! never drop one. Lists of zero or one record are left as plain arrays.

use lab_core::components::ResourceTimestamped;
use serde_json::{Map, Value};

use crate::error::MergeError;

pub const DELTA_MARKER: &str = "__delta__";

fn as_record<'a>(value: &'a Value, index: usize) -> Result<&'a Map<String, Value>, MergeError> {
    value
        .as_object()
        .ok_or_else(|| MergeError::MalformedDelta(format!("record {index} is not an object")))
}

/// Compress a list of flat JSON objects.
///
/// # Errors
///
/// Returns `MergeError::MalformedDelta` if a record in a list of two or more
/// is not a JSON object, or lacks a key the record before it had.
pub fn compress(records: &[Value]) -> Result<Value, MergeError> {
    if records.len() <= 1 {
        return Ok(Value::Array(records.to_vec()));
    }
    let mut encoded = Vec::with_capacity(records.len());
    let mut previous = as_record(&records[0], 0)?;
    encoded.push(Value::Object(previous.clone()));
    for (index, record) in records.iter().enumerate().skip(1) {
        let current = as_record(record, index)?;
        if let Some(dropped) = previous.keys().find(|key| !current.contains_key(*key)) {
            return Err(MergeError::MalformedDelta(format!(
                "record {index} drops key '{dropped}', which a delta cannot express"
            )));
        }
        let diff: Map<String, Value> = current
            .iter()
            .filter(|(key, value)| previous.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        encoded.push(Value::Object(diff));
        previous = current;
    }
    let mut wrapper = Map::new();
    wrapper.insert(DELTA_MARKER.to_string(), Value::Array(encoded));
    Ok(Value::Object(wrapper))
}

/// Restore the full list from [`compress`] output. Plain arrays pass
/// through unchanged.
///
/// # Errors
///
/// Returns `MergeError::MalformedDelta` if the value is neither an array nor
/// a marker object holding an array of objects.
pub fn expand(compressed: &Value) -> Result<Vec<Value>, MergeError> {
    let diffs = match compressed {
        Value::Array(records) => return Ok(records.clone()),
        Value::Object(wrapper) => wrapper
            .get(DELTA_MARKER)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                MergeError::MalformedDelta(format!("expected an array under '{DELTA_MARKER}'"))
            })?,
        other => {
            return Err(MergeError::MalformedDelta(format!(
                "expected an array or a '{DELTA_MARKER}' object, got {other}"
            )));
        }
    };

    let mut records = Vec::with_capacity(diffs.len());
    let mut current = Map::new();
    for (index, diff) in diffs.iter().enumerate() {
        for (key, value) in as_record(diff, index)? {
            current.insert(key.clone(), value.clone());
        }
        records.push(Value::Object(current.clone()));
    }
    Ok(records)
}

/// Compress a series of resource-usage samples.
///
/// # Errors
///
/// Returns `MergeError::Json` if a sample cannot be serialized.
pub fn compress_usage(samples: &[ResourceTimestamped]) -> Result<Value, MergeError> {
    let records = samples
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    compress(&records)
}

/// # Errors
///
/// Returns `MergeError::MalformedDelta` for a malformed wrapper and
/// `MergeError::Json` if an expanded record is not a valid sample.
pub fn expand_usage(compressed: &Value) -> Result<Vec<ResourceTimestamped>, MergeError> {
    expand(compressed)?
        .into_iter()
        .map(|record| serde_json::from_value(record).map_err(MergeError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[test]
    fn later_records_keep_only_changed_keys() {
        let records = vec![
            json!({"a": 1, "b": 2}),
            json!({"a": 1, "b": 3}),
            json!({"a": 2, "b": 3}),
        ];
        let compressed = compress(&records).unwrap();
        assert_eq!(
            compressed,
            json!({"__delta__": [{"a": 1, "b": 2}, {"b": 3}, {"a": 2}]})
        );
        assert_eq!(expand(&compressed).unwrap(), records);
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::single(vec![json!({"a": 1})])]
    fn short_lists_pass_through(#[case] records: Vec<Value>) {
        let compressed = compress(&records).unwrap();
        assert_eq!(compressed, Value::Array(records.clone()));
        assert_eq!(expand(&compressed).unwrap(), records);
    }

    #[test]
    fn unchanged_records_compress_to_empty_diffs() {
        let records = vec![json!({"a": 1}), json!({"a": 1})];
        let compressed = compress(&records).unwrap();
        assert_eq!(compressed, json!({"__delta__": [{"a": 1}, {}]}));
        assert_eq!(expand(&compressed).unwrap(), records);
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(
            compress(&[json!(1), json!(2)]),
            Err(MergeError::MalformedDelta(_))
        ));
        assert!(matches!(expand(&json!("x")), Err(MergeError::MalformedDelta(_))));
        assert!(matches!(
            expand(&json!({"other": []})),
            Err(MergeError::MalformedDelta(_))
        ));
        assert!(matches!(
            expand(&json!({"__delta__": [{"a": 1}, 5]})),
            Err(MergeError::MalformedDelta(_))
        ));
    }

    #[test]
    fn dropped_keys_are_rejected() {
        let err = compress(&[json!({"a": 1, "b": 2}), json!({"a": 1})]).unwrap_err();
        let MergeError::MalformedDelta(message) = &err else {
            panic!("expected MalformedDelta, got {err:?}");
        };
        assert!(message.contains("record 1"), "{message}");
        assert!(message.contains("'b'"), "{message}");
    }

    #[test]
    fn added_keys_still_compress() {
        let records = vec![json!({"a": 1}), json!({"a": 1, "b": 2})];
        let compressed = compress(&records).unwrap();
        assert_eq!(compressed, json!({"__delta__": [{"a": 1}, {"b": 2}]}));
        assert_eq!(expand(&compressed).unwrap(), records);
    }

    #[test]
    fn usage_samples_roundtrip() {
        let samples: Vec<ResourceTimestamped> = [55.0, 80.5, 80.5]
            .into_iter()
            .enumerate()
            .map(|(minute, usage)| ResourceTimestamped {
                timestamp: Utc
                    .with_ymd_and_hms(2024, 3, 3, 0, u32::try_from(minute).unwrap(), 0)
                    .unwrap(),
                usage,
            })
            .collect();
        let compressed = compress_usage(&samples).unwrap();
        let diffs = compressed[DELTA_MARKER].as_array().unwrap();
        assert_eq!(diffs[2].as_object().unwrap().len(), 1, "usage did not change");
        assert_eq!(expand_usage(&compressed).unwrap(), samples);
    }
}
