//! Serde roundtrip and JsonSchema validation tests for entity and component
//! types.

use schemars::schema_for;
use lab_core::components::*;
use lab_core::coordinates::{Rotation, Transform, Translation};
use lab_core::entities::*;
use lab_core::enums::*;
use lab_core::record::Record;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

/// Load and validate one of the shared fixture documents.
fn fixture<T: Record>(name: &str) -> T {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    T::from_path(&path).unwrap_or_else(|err| panic!("fixture {name} should load: {err}"))
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            // Serde roundtrip
            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            // Schema validation
            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

// --- Entities ---

roundtrip_and_validate!(subject_roundtrip, Subject, fixture("subject.json"));
roundtrip_and_validate!(procedures_roundtrip, Procedures, fixture("procedures.json"));
roundtrip_and_validate!(instrument_roundtrip, Instrument, fixture("instrument.json"));
roundtrip_and_validate!(acquisition_roundtrip, Acquisition, fixture("acquisition.json"));
roundtrip_and_validate!(processing_roundtrip, Processing, fixture("processing.json"));
roundtrip_and_validate!(
    quality_control_roundtrip,
    QualityControl,
    fixture("quality_control.json")
);

roundtrip_and_validate!(
    metadata_roundtrip,
    Metadata,
    Metadata {
        schema_version: Metadata::SCHEMA_VERSION.into(),
        name: "ecephys_625100_2024-03-02_09-00-00".into(),
        location: Some("s3://lab-data/ecephys_625100".into()),
        subject: Some(fixture("subject.json")),
        procedures: Some(fixture("procedures.json")),
        instrument: Some(fixture("instrument.json")),
        acquisition: Some(fixture("acquisition.json")),
        processing: Some(fixture("processing.json")),
        quality_control: Some(fixture("quality_control.json")),
    }
);

// --- Tagged unions ---

roundtrip_and_validate!(
    transform_rotation_roundtrip,
    Transform,
    Transform::Rotation(Rotation {
        angles: vec![0.0, 15.0, 90.0],
        angles_unit: AngleUnit::Degrees,
    })
);

roundtrip_and_validate!(
    light_source_led_roundtrip,
    LightSource,
    LightSource::Led(Led {
        device: Device::named("LED 470"),
        wavelength: 470,
        bandwidth: Some(20),
    })
);

roundtrip_and_validate!(
    device_config_lick_spout_roundtrip,
    DeviceConfig,
    DeviceConfig::LickSpout(LickSpoutConfig {
        device_name: "Lick spout".into(),
        solution: Liquid::Sucrose,
        solution_valence: Valence::Positive,
        volume: Some(2.0),
        volume_unit: VolumeUnit::Microliter,
        notes: None,
    })
);

roundtrip_and_validate!(
    device_config_mri_scan_roundtrip,
    DeviceConfig,
    DeviceConfig::MriScan(MriScan {
        device_name: "Scanner 72".into(),
        scan_index: 1,
        scan_type: ScanType::Scan3D,
        primary_scan: true,
        scan_sequence_type: MriScanSequence::Rare,
        rare_factor: Some(4),
        echo_time: 5.3,
        repetition_time: 500.0,
        vc_orientation: Some(Rotation {
            angles: vec![0.0, 0.0, 0.0],
            angles_unit: AngleUnit::Degrees,
        }),
        vc_position: Some(Translation {
            translation: vec![-6.1, 0.0, 0.0],
        }),
        voxel_sizes: Some(lab_core::coordinates::Scale {
            scale: vec![0.1, 0.1, 0.1],
        }),
        notes: None,
    })
);

roundtrip_and_validate!(
    stimulus_opto_roundtrip,
    Stimulus,
    Stimulus::Opto(OptoStimulation {
        stimulus_name: "Opto train".into(),
        pulse_shape: PulseShape::Square,
        pulse_frequency: vec![20.0, 40.0],
        number_pulse_trains: vec![10, 10],
        pulse_width: vec![5, 5],
        notes: None,
    })
);

roundtrip_and_validate!(
    mouse_platform_tube_roundtrip,
    MousePlatform,
    MousePlatform::Tube(Tube {
        device: Device::named("Body tube"),
        diameter: 4.0,
        diameter_unit: SizeUnit::Centimeter,
    })
);

// --- Tag values ---

#[test]
fn tagged_unions_use_constant_discriminators() {
    let value = serde_json::to_value(LightSource::Led(Led {
        device: Device::named("LED 470"),
        wavelength: 470,
        bandwidth: None,
    }))
    .unwrap();
    assert_eq!(value["object_type"], "Light emitting diode");
    assert_eq!(value["name"], "LED 470");

    let procedures: Procedures = fixture("procedures.json");
    let value = serde_json::to_value(&procedures.subject_procedures[0].procedures[3]).unwrap();
    assert_eq!(value["object_type"], "Perfusion");
}

// --- Schema rejection test ---

#[test]
fn schema_rejects_unknown_object_type() {
    let schema = serde_json::to_value(schema_for!(MousePlatform)).unwrap();
    let instance = serde_json::json!({
        "object_type": "Hamster wheel",
        "name": "Wheel",
        "radius": 3.0,
    });
    let errors = validate_against_schema(&schema, &instance);
    assert!(!errors.is_empty(), "schema should reject an unknown tag");
}

#[test]
fn schema_rejects_invalid_enum_value() {
    let schema = serde_json::to_value(schema_for!(Subject)).unwrap();
    let mut instance = serde_json::to_value(fixture::<Subject>("subject.json")).unwrap();
    instance["sex"] = serde_json::json!("Unknown");
    let errors = validate_against_schema(&schema, &instance);
    assert!(!errors.is_empty(), "schema should reject an unknown sex");
}
