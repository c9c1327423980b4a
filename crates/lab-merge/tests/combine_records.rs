//! Combining fixture documents through the `Combine` trait.

use chrono::Duration;
use lab_core::components::{Grouping, SpecimenProcedure};
use lab_core::entities::{Acquisition, Procedures, Processing, QualityControl};
use lab_core::record::Record;
use lab_merge::{Combine, MergeError};
use pretty_assertions::assert_eq;

fn fixture<T: Record>(name: &str) -> T {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../lab-core/tests/fixtures")
        .join(name);
    T::from_path(&path).unwrap_or_else(|err| panic!("fixture {name} should load: {err}"))
}

#[test]
fn procedures_concatenate_and_keep_the_shared_system() {
    let a: Procedures = fixture("procedures.json");
    let mut b: Procedures = fixture("procedures.json");
    b.subject_procedures.clear();
    b.specimen_procedures = vec![SpecimenProcedure {
        specimen_id: "625100_brain_1".into(),
        ..a.specimen_procedures[0].clone()
    }];
    b.notes = Some("Second batch".into());

    let combined = a.combine(&b).unwrap();
    assert_eq!(combined.subject_procedures.len(), 1);
    assert_eq!(combined.specimen_procedures.len(), 2);
    assert_eq!(combined.coordinate_system, a.coordinate_system);
    assert_eq!(combined.notes.as_deref(), Some("Second batch"));
}

#[test]
fn procedures_for_different_subjects_conflict() {
    let a: Procedures = fixture("procedures.json");
    let mut b = a.clone();
    b.subject_id = "700000".into();
    b.subject_procedures.clear();
    b.specimen_procedures.clear();

    let err = a.combine(&b).unwrap_err();
    assert!(matches!(err, MergeError::Conflict { ref field, .. } if field == "subject_id"));
}

#[test]
fn different_schema_versions_conflict() {
    let a: QualityControl = fixture("quality_control.json");
    let mut b = a.clone();
    b.schema_version = "1.4.0".into();
    let err = a.combine(&b).unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot merge schema_version: '2.0.0' conflicts with '1.4.0'"
    );
}

#[test]
fn acquisitions_span_both_sessions() {
    let a: Acquisition = fixture("acquisition.json");
    let mut b = a.clone();
    b.instrument_id = "323_BEHAVIOR1".into();
    b.mouse_platform_name = None;
    b.acquisition_start_time = a.acquisition_start_time + Duration::hours(2);
    b.acquisition_end_time = a.acquisition_end_time + Duration::hours(2);
    for stream in &mut b.data_streams {
        stream.stream_start_time += Duration::hours(2);
        stream.stream_end_time += Duration::hours(2);
    }
    b.experimenters.push("Dr. Eve".into());

    let combined = a.combine(&b).unwrap();
    assert_eq!(combined.instrument_id, "323_BEHAVIOR1_323_EPHYS1_20240301");
    assert_eq!(combined.acquisition_type, a.acquisition_type);
    assert_eq!(combined.acquisition_start_time, a.acquisition_start_time);
    assert_eq!(combined.acquisition_end_time, b.acquisition_end_time);
    assert_eq!(combined.experimenters, vec!["Dr. Dan", "Dr. Eve"]);
    assert_eq!(combined.mouse_platform_name.as_deref(), Some("Running wheel"));
    assert_eq!(combined.data_streams.len(), 2);
}

#[test]
fn processing_merges_graphs_and_isolated_processes() {
    let a: Processing = fixture("processing.json");
    let mut b: Processing = fixture("processing.json");
    b.data_processes.truncate(1);
    b.data_processes[0].name = "curation".into();
    b.dependency_graph = None;

    let combined = a.combine(&b).unwrap();
    let graph = combined.dependency_graph.as_ref().unwrap();
    assert_eq!(graph.len(), 3);
    assert_eq!(graph["curation"], Vec::<String>::new());
    assert_eq!(graph["spike sorting"], vec!["preprocessing".to_string()]);
}

#[test]
fn processing_with_clashing_names_fails_validation() {
    let a: Processing = fixture("processing.json");
    let err = a.combine(&a).unwrap_err();
    assert!(matches!(err, MergeError::Validation(_)));
}

#[test]
fn quality_control_zips_default_grouping() {
    let a: QualityControl = fixture("quality_control.json");
    let mut b = a.clone();
    b.default_grouping = vec![Grouping::from("Face camera")];
    b.key_experimenters.push("Dr. Eve".into());

    let combined = a.combine(&b).unwrap();
    assert_eq!(combined.metrics.len(), 4);
    assert_eq!(combined.key_experimenters, vec!["Dr. Dan", "Dr. Eve"]);
    assert_eq!(
        combined.default_grouping,
        vec![
            Grouping::Tuple(vec!["Probe A".into(), "Face camera".into()]),
            Grouping::Tuple(vec!["drift".into(), "Face camera".into()]),
        ]
    );
}
