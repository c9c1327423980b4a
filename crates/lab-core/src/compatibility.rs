//! Checks between independently written documents that refer to each other
//! by key.
//!
//! Unlike record validation these never stop at the first problem: every
//! check runs and all mismatches are returned in one [`CompatibilityError`].

use std::collections::BTreeSet;

use crate::entities::{Acquisition, Instrument};
use crate::errors::{CompatibilityError, Mismatch};

/// A specimen id is compatible with a subject id when it extends it, e.g.
/// `625100_brain_1` for subject `625100`.
#[must_use]
pub fn is_compatible(subject_id: &str, specimen_id: &str) -> bool {
    !subject_id.is_empty() && specimen_id.contains(subject_id)
}

/// Cross-checks an acquisition against the instrument it claims to have run
/// on.
#[derive(Debug, Clone, Copy)]
pub struct InstrumentAcquisitionCompatibility<'a> {
    pub instrument: &'a Instrument,
    pub acquisition: &'a Acquisition,
}

impl<'a> InstrumentAcquisitionCompatibility<'a> {
    #[must_use]
    pub const fn new(instrument: &'a Instrument, acquisition: &'a Acquisition) -> Self {
        Self {
            instrument,
            acquisition,
        }
    }

    fn compare_instrument_id(&self, mismatches: &mut Vec<Mismatch>) {
        if self.instrument.instrument_id != self.acquisition.instrument_id {
            mismatches.push(Mismatch::new(
                "instrument_id",
                &self.instrument.instrument_id,
                &self.acquisition.instrument_id,
            ));
        }
    }

    fn compare_mouse_platform_name(&self, mismatches: &mut Vec<Mismatch>) {
        let Some(found) = &self.acquisition.mouse_platform_name else {
            return;
        };
        let expected = self
            .instrument
            .mouse_platform
            .as_ref()
            .map_or("<no mouse platform>", |platform| platform.name());
        if expected != found {
            mismatches.push(Mismatch::new("mouse_platform_name", expected, found));
        }
    }

    fn compare_device_references(&self, mismatches: &mut Vec<Mismatch>) {
        let declared: BTreeSet<&str> = self.instrument.device_names().into_iter().collect();
        let expected = format!("a device of instrument {}", self.instrument.instrument_id);
        let mut check = |field: String, name: &str| {
            if !declared.contains(name) {
                mismatches.push(Mismatch::new(field, &expected, name));
            }
        };

        for (s, stream) in self.acquisition.data_streams.iter().enumerate() {
            for (d, name) in stream.active_devices.iter().enumerate() {
                check(format!("data_streams[{s}].active_devices[{d}]"), name);
            }
            for (c, config) in stream.configurations.iter().enumerate() {
                for name in config.referenced_devices() {
                    check(format!("data_streams[{s}].configurations[{c}]"), name);
                }
            }
        }
        for (e, epoch) in self.acquisition.stimulus_epochs.iter().enumerate() {
            for (d, name) in epoch.active_devices.iter().enumerate() {
                check(format!("stimulus_epochs[{e}].active_devices[{d}]"), name);
            }
        }
    }

    fn compare_modalities(&self, mismatches: &mut Vec<Mismatch>) {
        let supported = self
            .instrument
            .modalities
            .iter()
            .map(|m| m.abbreviation())
            .collect::<Vec<_>>()
            .join(", ");
        for (s, stream) in self.acquisition.data_streams.iter().enumerate() {
            for modality in &stream.modalities {
                if !self.instrument.modalities.contains(modality) {
                    mismatches.push(Mismatch::new(
                        format!("data_streams[{s}].modalities"),
                        format!("one of [{supported}]"),
                        modality.abbreviation(),
                    ));
                }
            }
        }
    }

    /// Run every check and report all mismatches together.
    ///
    /// # Errors
    ///
    /// Returns a [`CompatibilityError`] holding every mismatch found.
    pub fn run_compatibility_check(&self) -> Result<(), CompatibilityError> {
        let mut mismatches = Vec::new();
        self.compare_instrument_id(&mut mismatches);
        self.compare_mouse_platform_name(&mut mismatches);
        self.compare_device_references(&mut mismatches);
        self.compare_modalities(&mut mismatches);
        if !mismatches.is_empty() {
            tracing::debug!(
                count = mismatches.len(),
                instrument = %self.instrument.instrument_id,
                "instrument/acquisition mismatches"
            );
        }
        CompatibilityError::from_mismatches(mismatches)
    }
}
