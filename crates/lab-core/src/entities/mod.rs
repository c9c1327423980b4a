//! Top-level entity documents.
//!
//! Each entity is one JSON file carrying a fixed `schema_version` and
//! implements [`Record`](crate::record::Record) for loading and writing.

pub mod acquisition;
pub mod instrument;
pub mod metadata;
pub mod procedures;
pub mod processing;
pub mod quality_control;
pub mod subject;

pub use acquisition::{Acquisition, DataStream};
pub use instrument::{Instrument, MODALITY_REQUIREMENTS};
pub use metadata::Metadata;
pub use procedures::Procedures;
pub use processing::{ProcessGraph, Processing};
pub use quality_control::QualityControl;
pub use subject::Subject;
