//! Upgrades from the 1.x document shapes.
//!
//! Before 2.0 an instrument was a `Rig` and an acquisition was a `Session`.
//! Those shapes are kept here as plain structs so old files can still be
//! read; each maps onto its 2.x record with [`Rig::upgrade`] and
//! [`Session::upgrade`], and the `TryFrom` impls additionally validate the
//! result.

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::compatibility::InstrumentAcquisitionCompatibility;
use crate::components::{
    CameraAssembly, Detector, DetectorConfig, Device, DeviceConfig, EphysAssembly, LaserConfig,
    LightSource, MousePlatform, Objective, PatchCord, StimulusEpoch,
};
use crate::entities::{Acquisition, DataStream, Instrument};
use crate::errors::{CompatibilityError, ValidationError};
use crate::record::Record;
use crate::registries::Modality;
use crate::validate::Validate;

fn check_legacy_version(record: &'static str, version: &str) -> Result<(), ValidationError> {
    if version.split('.').next() == Some("1") {
        Ok(())
    } else {
        Err(ValidationError::field(
            record,
            "schema_version",
            version,
            "only 1.x documents can be upgraded",
        ))
    }
}

/// 1.x instrument document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rig {
    pub schema_version: String,
    pub rig_id: String,
    pub modification_date: NaiveDate,
    pub modalities: Vec<Modality>,
    pub mouse_platform: Option<MousePlatform>,
    #[serde(default)]
    pub ephys_assemblies: Vec<EphysAssembly>,
    #[serde(default)]
    pub stick_microscopes: Vec<CameraAssembly>,
    #[serde(default)]
    pub cameras: Vec<CameraAssembly>,
    #[serde(default)]
    pub light_sources: Vec<LightSource>,
    #[serde(default)]
    pub detectors: Vec<Detector>,
    #[serde(default)]
    pub objectives: Vec<Objective>,
    #[serde(default)]
    pub patch_cords: Vec<PatchCord>,
    #[serde(default)]
    pub additional_devices: Vec<Device>,
    pub notes: Option<String>,
}

impl Rig {
    /// Map onto the 2.x shape without validating it.
    #[must_use]
    pub fn upgrade(&self) -> Instrument {
        Instrument {
            instrument_id: self.rig_id.clone(),
            modalities: self.modalities.clone(),
            mouse_platform: self.mouse_platform.clone(),
            ephys_assemblies: self.ephys_assemblies.clone(),
            stick_microscopes: self.stick_microscopes.clone(),
            cameras: self.cameras.clone(),
            light_sources: self.light_sources.clone(),
            detectors: self.detectors.clone(),
            objectives: self.objectives.clone(),
            patch_cords: self.patch_cords.clone(),
            additional_devices: self.additional_devices.clone(),
            notes: self.notes.clone(),
            ..Instrument::empty(&self.rig_id, self.modification_date)
        }
    }
}

impl TryFrom<Rig> for Instrument {
    type Error = ValidationError;

    fn try_from(rig: Rig) -> Result<Self, Self::Error> {
        check_legacy_version("Rig", &rig.schema_version)?;
        let instrument = rig.upgrade();
        tracing::debug!(
            instrument_id = %instrument.instrument_id,
            from = %rig.schema_version,
            to = Self::SCHEMA_VERSION,
            "upgraded rig"
        );
        instrument.validated()
    }
}

/// 1.x data stream. Devices were listed by role rather than in one
/// `active_devices` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Stream {
    pub stream_start_time: DateTime<Utc>,
    pub stream_end_time: DateTime<Utc>,
    pub stream_modalities: Vec<Modality>,
    #[serde(default)]
    pub daq_names: Vec<String>,
    #[serde(default)]
    pub camera_names: Vec<String>,
    #[serde(default)]
    pub light_sources: Vec<LaserConfig>,
    #[serde(default)]
    pub detectors: Vec<DetectorConfig>,
    pub notes: Option<String>,
}

impl Stream {
    #[must_use]
    pub fn upgrade(&self) -> DataStream {
        let mut active_devices: Vec<String> = Vec::new();
        let names = self
            .daq_names
            .iter()
            .chain(&self.camera_names)
            .chain(self.light_sources.iter().map(|config| &config.device_name))
            .chain(self.detectors.iter().map(|config| &config.device_name));
        for name in names {
            if !active_devices.contains(name) {
                active_devices.push(name.clone());
            }
        }

        let configurations = self
            .light_sources
            .iter()
            .cloned()
            .map(DeviceConfig::Laser)
            .chain(self.detectors.iter().cloned().map(DeviceConfig::Detector))
            .collect();

        DataStream {
            stream_start_time: self.stream_start_time,
            stream_end_time: self.stream_end_time,
            modalities: self.stream_modalities.clone(),
            active_devices,
            configurations,
            notes: self.notes.clone(),
        }
    }
}

/// 1.x acquisition document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Session {
    pub schema_version: String,
    pub subject_id: String,
    pub session_start_time: DateTime<Utc>,
    pub session_end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub experimenter_full_name: Vec<String>,
    #[serde(default)]
    pub protocol_id: Vec<String>,
    pub iacuc_protocol: Option<String>,
    pub rig_id: String,
    pub session_type: String,
    pub mouse_platform_name: Option<String>,
    #[serde(default)]
    pub data_streams: Vec<Stream>,
    #[serde(default)]
    pub stimulus_epochs: Vec<StimulusEpoch>,
    pub notes: Option<String>,
}

impl Session {
    /// Map onto the 2.x shape without validating it. A missing end time
    /// becomes the end of the last stream, or the start time when there are
    /// no streams.
    #[must_use]
    pub fn upgrade(&self) -> Acquisition {
        let acquisition_end_time = self
            .session_end_time
            .or_else(|| {
                self.data_streams
                    .iter()
                    .map(|stream| stream.stream_end_time)
                    .max()
            })
            .unwrap_or(self.session_start_time);

        Acquisition {
            schema_version: Acquisition::SCHEMA_VERSION.to_string(),
            subject_id: self.subject_id.clone(),
            acquisition_start_time: self.session_start_time,
            acquisition_end_time,
            experimenters: self.experimenter_full_name.clone(),
            protocol_id: self.protocol_id.clone(),
            ethics_review_id: self.iacuc_protocol.clone(),
            instrument_id: self.rig_id.clone(),
            acquisition_type: self.session_type.clone(),
            mouse_platform_name: self.mouse_platform_name.clone(),
            coordinate_system: None,
            data_streams: self.data_streams.iter().map(Stream::upgrade).collect(),
            stimulus_epochs: self.stimulus_epochs.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl TryFrom<Session> for Acquisition {
    type Error = ValidationError;

    fn try_from(session: Session) -> Result<Self, Self::Error> {
        check_legacy_version("Session", &session.schema_version)?;
        let acquisition = session.upgrade();
        tracing::debug!(
            instrument_id = %acquisition.instrument_id,
            from = %session.schema_version,
            to = Self::SCHEMA_VERSION,
            "upgraded session"
        );
        acquisition.validated()
    }
}

/// Field path of a 2.x mismatch as the 1.x documents spell it.
fn legacy_field(field: &str) -> String {
    if field == "instrument_id" {
        return "rig_id".to_string();
    }
    match field.strip_suffix(".modalities") {
        Some(stream) if stream.starts_with("data_streams[") => {
            format!("{stream}.stream_modalities")
        }
        _ => field.to_string(),
    }
}

/// Check a 1.x session against its rig by upgrading both and running the
/// instrument/acquisition check. Mismatches name the 1.x fields (`rig_id`,
/// `stream_modalities`); device references keep the path of the upgraded
/// `active_devices` list, which has no single 1.x counterpart.
///
/// # Errors
///
/// Returns every mismatch found, as for
/// [`InstrumentAcquisitionCompatibility::run_compatibility_check`].
pub fn check_rig_session(rig: &Rig, session: &Session) -> Result<(), CompatibilityError> {
    let instrument = rig.upgrade();
    let acquisition = session.upgrade();
    InstrumentAcquisitionCompatibility::new(&instrument, &acquisition)
        .run_compatibility_check()
        .map_err(|mut err| {
            for mismatch in &mut err.mismatches {
                mismatch.field = legacy_field(&mismatch.field);
            }
            err
        })
}
