use anyhow::Context;
use lab_core::compatibility::InstrumentAcquisitionCompatibility;
use lab_core::entities::{Acquisition, Instrument};
use serde_json::{Value, json};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CompatArgs;
use crate::commands::shared::load_record;
use crate::output::output;

/// Handle `labs compat`.
pub fn handle(args: &CompatArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = run(args)?;
    output(&report, flags.format)
}

/// Report every mismatch between the two documents at once.
pub fn run(args: &CompatArgs) -> anyhow::Result<Value> {
    let instrument: Instrument = load_record(&args.instrument)?;
    let acquisition: Acquisition = load_record(&args.acquisition)?;

    InstrumentAcquisitionCompatibility::new(&instrument, &acquisition)
        .run_compatibility_check()
        .with_context(|| {
            format!(
                "{} does not match {}",
                args.acquisition.display(),
                args.instrument.display()
            )
        })?;

    Ok(json!({
        "compatible": true,
        "instrument_id": instrument.instrument_id,
        "modalities": acquisition.modalities(),
    }))
}
