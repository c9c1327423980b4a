//! Field-level merge helpers.
//!
//! Each helper takes the two values being merged in order and returns a new
//! value; neither input is modified.

use lab_core::components::Grouping;
use lab_core::coordinates::CoordinateSystem;
use lab_core::entities::ProcessGraph;

use crate::error::MergeError;

/// Join two notes with a newline. An absent side yields the other.
#[must_use]
pub fn merge_notes(a: Option<&str>, b: Option<&str>) -> Option<String> {
    match (a, b) {
        (None, None) => None,
        (Some(note), None) | (None, Some(note)) => Some(note.to_string()),
        (Some(a), Some(b)) => Some(format!("{a}\n{b}")),
    }
}

/// Concatenate two optional lists, treating an empty list as absent.
#[must_use]
pub fn merge_optional_list<T: Clone>(a: Option<&[T]>, b: Option<&[T]>) -> Option<Vec<T>> {
    let a = a.filter(|items| !items.is_empty());
    let b = b.filter(|items| !items.is_empty());
    match (a, b) {
        (None, None) => None,
        (Some(items), None) | (None, Some(items)) => Some(items.to_vec()),
        (Some(a), Some(b)) => Some([a, b].concat()),
    }
}

/// Keep the coordinate system both sides agree on.
///
/// # Errors
///
/// Returns `MergeError::Conflict` naming both systems when both are present
/// and differ.
pub fn merge_coordinate_systems(
    a: Option<&CoordinateSystem>,
    b: Option<&CoordinateSystem>,
) -> Result<Option<CoordinateSystem>, MergeError> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => {
            let (left, right) = if a.name == b.name {
                (format!("{} {:?}", a.name, a.axes), format!("{} {:?}", b.name, b.axes))
            } else {
                (a.name.clone(), b.name.clone())
            };
            Err(MergeError::conflict("coordinate_system", left, right))
        }
        (Some(system), _) | (None, Some(system)) => Ok(Some(system.clone())),
        (None, None) => Ok(None),
    }
}

/// Sort two identifiers and join them with `_`, so the combined name does
/// not depend on merge order.
///
/// Unlike a plain sort-and-join, identical identifiers are returned once
/// (`rig` + `rig` gives `rig`, not `rig_rig`), so merging a record with a
/// copy of itself leaves its identifier unchanged.
#[must_use]
pub fn merge_str_alphabetical(a: Option<&str>, b: Option<&str>) -> Option<String> {
    match (a, b) {
        (None, None) => None,
        (Some(value), None) | (None, Some(value)) => Some(value.to_string()),
        (Some(a), Some(b)) if a == b => Some(a.to_string()),
        (Some(a), Some(b)) => {
            let (first, second) = if a <= b { (a, b) } else { (b, a) };
            Some(format!("{first}_{second}"))
        }
    }
}

/// Zip two grouping lists by position. Where both have an entry the tags are
/// flattened into one tuple; otherwise the single entry is kept as is.
#[must_use]
pub fn merge_str_tuple_lists(a: &[Grouping], b: &[Grouping]) -> Vec<Grouping> {
    let len = a.len().max(b.len());
    (0..len)
        .filter_map(|index| match (a.get(index), b.get(index)) {
            (Some(left), Some(right)) => {
                let mut tags = left.clone().into_tags();
                tags.extend(right.clone().into_tags());
                Some(Grouping::Tuple(tags))
            }
            (only, None) | (None, only) => only.cloned(),
        })
        .collect()
}

/// Union two process dependency graphs. A missing graph is replaced by one
/// holding its record's isolated processes with no dependencies.
#[must_use]
pub fn merge_process_graph(
    graph_a: Option<&ProcessGraph>,
    graph_b: Option<&ProcessGraph>,
    isolated_a: &[String],
    isolated_b: &[String],
) -> Option<ProcessGraph> {
    if graph_a.is_none() && graph_b.is_none() {
        return None;
    }
    let trivial = |names: &[String]| -> ProcessGraph {
        names.iter().map(|name| (name.clone(), Vec::new())).collect()
    };
    let graph_a = graph_a.cloned().unwrap_or_else(|| trivial(isolated_a));
    let graph_b = graph_b.cloned().unwrap_or_else(|| trivial(isolated_b));

    let mut merged = graph_a;
    for (node, predecessors) in graph_b {
        let entry = merged.entry(node).or_default();
        for predecessor in predecessors {
            if !entry.contains(&predecessor) {
                entry.push(predecessor);
            }
        }
    }
    Some(merged)
}

/// Drop repeated items, keeping the first occurrence of each.
#[must_use]
pub fn remove_duplicates<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    let removed = items.len() - unique.len();
    if removed > 0 {
        tracing::info!(removed, "removed duplicate entries");
    }
    unique
}
