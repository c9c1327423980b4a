//! Per-acquisition device settings.
//!
//! Each config names the device it configures via `device_name`; the
//! instrument/acquisition compatibility check verifies those names.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::coordinates::{Rotation, Scale, Transform, Translation};
use crate::enums::{PowerUnit, TimeUnit, VolumeUnit};
use crate::errors::ValidationError;
use crate::validate::{
    OtherRequiresNotes, OtherSentinel, Validate, check_not_blank, check_positive, check_range,
    validate_each,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LaserConfig {
    pub device_name: String,
    /// Excitation wavelength in nanometers.
    pub wavelength: u32,
    pub power: Option<f64>,
    #[serde(default)]
    pub power_unit: PowerUnit,
}

impl Validate for LaserConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("LaserConfig", "device_name", &self.device_name)?;
        check_range("LaserConfig", "wavelength", self.wavelength, 300, 1000)?;
        if let Some(power) = self.power {
            if power < 0.0 {
                return Err(ValidationError::field(
                    "LaserConfig",
                    "power",
                    power,
                    "must not be negative",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum TriggerType {
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DetectorConfig {
    pub device_name: String,
    pub exposure_time: f64,
    #[serde(default = "millisecond")]
    pub exposure_time_unit: TimeUnit,
    pub trigger_type: TriggerType,
}

const fn millisecond() -> TimeUnit {
    TimeUnit::Millisecond
}

impl Validate for DetectorConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("DetectorConfig", "device_name", &self.device_name)?;
        check_positive("DetectorConfig", "exposure_time", self.exposure_time)
    }
}

/// One light path: which lasers excite it and which detector reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Channel {
    pub channel_name: String,
    pub intended_measurement: Option<String>,
    pub detector: DetectorConfig,
    pub light_sources: Vec<LaserConfig>,
    #[serde(default)]
    pub excitation_filters: Vec<String>,
    #[serde(default)]
    pub emission_filters: Vec<String>,
}

impl Channel {
    /// Every device name this channel refers to.
    pub fn device_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.detector.device_name.as_str()).chain(
            self.light_sources
                .iter()
                .map(|light| light.device_name.as_str()),
        )
    }
}

impl Validate for Channel {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("Channel", "channel_name", &self.channel_name)?;
        self.detector
            .validate()
            .map_err(|err| err.nested("detector"))?;
        if self.light_sources.is_empty() {
            return Err(ValidationError::field(
                "Channel",
                "light_sources",
                &self.light_sources,
                "must list at least one light source",
            ));
        }
        validate_each("light_sources", &self.light_sources)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatchCordConfig {
    pub device_name: String,
    pub channels: Vec<Channel>,
}

impl Validate for PatchCordConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("PatchCordConfig", "device_name", &self.device_name)?;
        if self.channels.is_empty() {
            return Err(ValidationError::field(
                "PatchCordConfig",
                "channels",
                &self.channels,
                "must list at least one channel",
            ));
        }
        validate_each("channels", &self.channels)
    }
}

// ---------------------------------------------------------------------------
// LickSpoutConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Liquid {
    Water,
    Sucrose,
    Quinine,
    #[serde(rename = "Citric acid")]
    CitricAcid,
    Other,
}

impl OtherSentinel for Liquid {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Valence {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LickSpoutConfig {
    pub device_name: String,
    pub solution: Liquid,
    pub solution_valence: Valence,
    pub volume: Option<f64>,
    #[serde(default = "microliter")]
    pub volume_unit: VolumeUnit,
    pub notes: Option<String>,
}

const fn microliter() -> VolumeUnit {
    VolumeUnit::Microliter
}

impl Validate for LickSpoutConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("LickSpoutConfig", "device_name", &self.device_name)?;
        if let Some(volume) = self.volume {
            check_positive("LickSpoutConfig", "volume", volume)?;
        }
        OtherRequiresNotes::new("LickSpoutConfig", "solution").check(&self.solution, self.notes.as_deref())
    }
}

// ---------------------------------------------------------------------------
// MriScan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MriScanSequence {
    #[serde(rename = "RARE")]
    Rare,
    #[serde(rename = "FLASH")]
    Flash,
    Other,
}

impl OtherSentinel for MriScanSequence {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ScanType {
    #[serde(rename = "Set Up")]
    SetUp,
    #[serde(rename = "3D Scan")]
    Scan3D,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MriScan {
    pub device_name: String,
    pub scan_index: u32,
    pub scan_type: ScanType,
    pub primary_scan: bool,
    pub scan_sequence_type: MriScanSequence,
    pub rare_factor: Option<u32>,
    /// Milliseconds.
    pub echo_time: f64,
    /// Milliseconds.
    pub repetition_time: f64,
    pub vc_orientation: Option<Rotation>,
    pub vc_position: Option<Translation>,
    pub voxel_sizes: Option<Scale>,
    pub notes: Option<String>,
}

impl Validate for MriScan {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("MriScan", "device_name", &self.device_name)?;
        check_positive("MriScan", "echo_time", self.echo_time)?;
        check_positive("MriScan", "repetition_time", self.repetition_time)?;
        OtherRequiresNotes::new("MriScan", "scan_sequence_type")
            .check(&self.scan_sequence_type, self.notes.as_deref())?;

        if self.primary_scan {
            let missing: Vec<&str> = [
                ("vc_orientation", self.vc_orientation.is_none()),
                ("vc_position", self.vc_position.is_none()),
                ("voxel_sizes", self.voxel_sizes.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            if !missing.is_empty() {
                return Err(ValidationError::cross_field(
                    "MriScan",
                    std::iter::once("primary_scan").chain(missing.iter().copied()),
                    format!("primary scans must set {}", missing.join(", ")),
                ));
            }
        }

        if let Some(rotation) = &self.vc_orientation {
            Transform::Rotation(rotation.clone())
                .validate()
                .map_err(|err| err.nested("vc_orientation"))?;
        }
        if let Some(translation) = &self.vc_position {
            Transform::Translation(translation.clone())
                .validate()
                .map_err(|err| err.nested("vc_position"))?;
        }
        if let Some(scale) = &self.voxel_sizes {
            Transform::Scale(scale.clone())
                .validate()
                .map_err(|err| err.nested("voxel_sizes"))?;
            if let Some(size) = scale.scale.iter().find(|size| **size <= 0.0) {
                return Err(ValidationError::field(
                    "MriScan",
                    "voxel_sizes",
                    size,
                    "voxel sizes must be greater than 0",
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DeviceConfig
// ---------------------------------------------------------------------------

/// Any device configuration, dispatched on `object_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum DeviceConfig {
    #[serde(rename = "Laser config")]
    Laser(LaserConfig),
    #[serde(rename = "Detector config")]
    Detector(DetectorConfig),
    #[serde(rename = "Patch cord config")]
    PatchCord(PatchCordConfig),
    #[serde(rename = "Lick spout config")]
    LickSpout(LickSpoutConfig),
    #[serde(rename = "MRI scan")]
    MriScan(MriScan),
}

impl DeviceConfig {
    #[must_use]
    pub fn device_name(&self) -> &str {
        match self {
            Self::Laser(config) => &config.device_name,
            Self::Detector(config) => &config.device_name,
            Self::PatchCord(config) => &config.device_name,
            Self::LickSpout(config) => &config.device_name,
            Self::MriScan(config) => &config.device_name,
        }
    }

    /// The configured device plus every device referenced by nested
    /// channels.
    #[must_use]
    pub fn referenced_devices(&self) -> Vec<&str> {
        let mut names = vec![self.device_name()];
        if let Self::PatchCord(config) = self {
            for channel in &config.channels {
                names.extend(channel.device_names());
            }
        }
        names
    }
}

impl Validate for DeviceConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Laser(config) => config.validate(),
            Self::Detector(config) => config.validate(),
            Self::PatchCord(config) => config.validate(),
            Self::LickSpout(config) => config.validate(),
            Self::MriScan(config) => config.validate(),
        }
    }
}
