//! # lab-merge
//!
//! Pure functions for combining metadata records.
//!
//! This crate provides:
//! - Field-level merge helpers (notes, optional lists, coordinate systems,
//!   identifiers, grouping tuples, process graphs, de-duplication)
//! - The [`Combine`] trait, implemented for entity records that can be
//!   aggregated from several partial documents
//! - A delta codec that stores repeated samples as diffs from the previous one
//!
//! Nothing here performs I/O; merges always build a new record and re-run its
//! validators before returning it.

pub mod combine;
pub mod delta;
pub mod error;
pub mod utils;

pub use combine::Combine;
pub use error::MergeError;
