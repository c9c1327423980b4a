//! Stimuli and rewards presented during an acquisition.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{FrequencyUnit, VolumeUnit};
use crate::errors::ValidationError;
use crate::validate::{
    OtherRequiresNotes, OtherSentinel, Validate, check_not_blank, check_positive,
    check_time_order, validate_each, validate_nested,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FilterType {
    Butterworth,
    Chebyshev,
    Bessel,
    Other,
}

impl OtherSentinel for FilterType {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditoryStimulation {
    pub stimulus_name: String,
    pub sample_frequency: f64,
    pub amplitude_modulation_frequency: Option<u32>,
    #[serde(default)]
    pub frequency_unit: FrequencyUnit,
    pub bandpass_low_frequency: Option<f64>,
    pub bandpass_high_frequency: Option<f64>,
    pub bandpass_filter_type: Option<FilterType>,
    pub bandpass_order: Option<u32>,
    pub notes: Option<String>,
}

impl Validate for AuditoryStimulation {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("AuditoryStimulation", "stimulus_name", &self.stimulus_name)?;
        check_positive("AuditoryStimulation", "sample_frequency", self.sample_frequency)?;
        OtherRequiresNotes::new("AuditoryStimulation", "bandpass_filter_type")
            .check(&self.bandpass_filter_type, self.notes.as_deref())?;
        if let (Some(low), Some(high)) = (self.bandpass_low_frequency, self.bandpass_high_frequency) {
            if low >= high {
                return Err(ValidationError::cross_field(
                    "AuditoryStimulation",
                    ["bandpass_low_frequency", "bandpass_high_frequency"],
                    format!("low cutoff {low} must be below high cutoff {high}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum PulseShape {
    Square,
    Ramp,
    Sinusoidal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OptoStimulation {
    pub stimulus_name: String,
    pub pulse_shape: PulseShape,
    /// Hertz, one per pulse train.
    pub pulse_frequency: Vec<f64>,
    pub number_pulse_trains: Vec<u32>,
    /// Milliseconds, one per pulse train.
    pub pulse_width: Vec<u32>,
    pub notes: Option<String>,
}

impl Validate for OptoStimulation {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("OptoStimulation", "stimulus_name", &self.stimulus_name)?;
        let trains = self.pulse_frequency.len();
        if self.number_pulse_trains.len() != trains || self.pulse_width.len() != trains {
            return Err(ValidationError::cross_field(
                "OptoStimulation",
                ["pulse_frequency", "number_pulse_trains", "pulse_width"],
                format!(
                    "per-train lists must match: {} frequencies, {} train counts, {} widths",
                    trains,
                    self.number_pulse_trains.len(),
                    self.pulse_width.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Stimulus parameters, dispatched on `object_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum Stimulus {
    #[serde(rename = "Auditory stimulation")]
    Auditory(AuditoryStimulation),
    #[serde(rename = "Optogenetic stimulation")]
    Opto(OptoStimulation),
}

impl Validate for Stimulus {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Auditory(stimulus) => stimulus.validate(),
            Self::Opto(stimulus) => stimulus.validate(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StimulusModality {
    Auditory,
    Olfactory,
    Optogenetics,
    Visual,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RewardSolution {
    Water,
    Other,
}

impl OtherSentinel for RewardSolution {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Reward {
    pub reward_solution: RewardSolution,
    pub volume: Option<f64>,
    #[serde(default = "milliliter")]
    pub volume_unit: VolumeUnit,
    pub notes: Option<String>,
}

const fn milliliter() -> VolumeUnit {
    VolumeUnit::Milliliter
}

impl Validate for Reward {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(volume) = self.volume {
            if volume < 0.0 {
                return Err(ValidationError::field(
                    "Reward",
                    "volume",
                    volume,
                    "must not be negative",
                ));
            }
        }
        OtherRequiresNotes::new("Reward", "reward_solution")
            .check(&self.reward_solution, self.notes.as_deref())
    }
}

/// A contiguous period of one stimulus protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StimulusEpoch {
    pub stimulus_name: String,
    pub stimulus_start_time: DateTime<Utc>,
    pub stimulus_end_time: DateTime<Utc>,
    pub stimulus_modalities: Vec<StimulusModality>,
    #[serde(default)]
    pub stimulus_parameters: Vec<Stimulus>,
    #[serde(default)]
    pub active_devices: Vec<String>,
    pub reward: Option<Reward>,
    pub notes: Option<String>,
}

impl Validate for StimulusEpoch {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("StimulusEpoch", "stimulus_name", &self.stimulus_name)?;
        check_time_order(
            "StimulusEpoch",
            "stimulus_start_time",
            &self.stimulus_start_time,
            "stimulus_end_time",
            &self.stimulus_end_time,
        )?;
        validate_each("stimulus_parameters", &self.stimulus_parameters)?;
        validate_nested("reward", self.reward.as_ref())
    }
}
