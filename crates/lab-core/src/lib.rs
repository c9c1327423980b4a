//! # lab-core
//!
//! Metadata records for neuroscience data assets.
//!
//! This crate provides the foundational types shared across all lab crates:
//! - Entity documents (subject, procedures, instrument, acquisition,
//!   processing, quality control) and the aggregate `Metadata`
//! - Component records nested inside them, with tagged unions for devices,
//!   configs, stimuli, and surgical procedures
//! - Read-only registries of organizations, species, and modalities
//! - Reusable field and cross-field validation rules
//! - Cross-document compatibility checks with batch reporting
//! - Error types and JSON persistence for every record
//! - Upgrades from the 1.x rig and session documents

pub mod compatibility;
pub mod components;
pub mod coordinates;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod record;
pub mod registries;
pub mod upgrade;
pub mod validate;
