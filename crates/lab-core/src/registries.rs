//! Static registries of named constants: organizations, species, and
//! modalities.
//!
//! The tables are `const` data built into the binary and never mutated.
//! Records store a [`PidName`] copied out of a table; validators check that
//! the stored value still matches a table entry.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::validate::OtherSentinel;

/// External registry a persistent identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Registry {
    /// Research Organization Registry
    Ror,
    /// NCBI Taxonomy
    Ncbi,
    /// Research Resource Identifiers
    Rrid,
    /// Mouse Genome Informatics
    Mgi,
}

/// Name with an optional abbreviation and registry reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PidName {
    pub name: String,
    pub abbreviation: Option<String>,
    pub registry: Option<Registry>,
    pub registry_identifier: Option<String>,
}

impl PidName {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbreviation: None,
            registry: None,
            registry_identifier: None,
        }
    }
}

impl OtherSentinel for PidName {
    fn is_other(&self) -> bool {
        self.name == OTHER.name
    }
}

impl fmt::Display for PidName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One row of a static registry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub name: &'static str,
    pub abbreviation: Option<&'static str>,
    pub registry: Option<Registry>,
    pub registry_identifier: Option<&'static str>,
}

impl RegistryEntry {
    const fn plain(name: &'static str) -> Self {
        Self {
            name,
            abbreviation: None,
            registry: None,
            registry_identifier: None,
        }
    }

    #[must_use]
    pub fn to_pid_name(&self) -> PidName {
        PidName {
            name: self.name.to_string(),
            abbreviation: self.abbreviation.map(str::to_string),
            registry: self.registry,
            registry_identifier: self.registry_identifier.map(str::to_string),
        }
    }

    /// Whether `pid` is exactly this entry.
    #[must_use]
    pub fn matches(&self, pid: &PidName) -> bool {
        pid.name == self.name
            && pid.abbreviation.as_deref() == self.abbreviation
            && pid.registry == self.registry
            && pid.registry_identifier.as_deref() == self.registry_identifier
    }
}

pub const OTHER: RegistryEntry = RegistryEntry::plain("Other");

pub const AIND: RegistryEntry = RegistryEntry {
    name: "Allen Institute for Neural Dynamics",
    abbreviation: Some("AIND"),
    registry: Some(Registry::Ror),
    registry_identifier: Some("04szwah67"),
};

pub const AI: RegistryEntry = RegistryEntry {
    name: "Allen Institute",
    abbreviation: Some("AI"),
    registry: Some(Registry::Ror),
    registry_identifier: Some("03cpe7c52"),
};

pub const JAX: RegistryEntry = RegistryEntry {
    name: "Jackson Laboratory",
    abbreviation: Some("JAX"),
    registry: Some(Registry::Ror),
    registry_identifier: Some("021sy4w91"),
};

/// Institutions and manufacturers.
pub const ORGANIZATIONS: &[RegistryEntry] = &[
    AIND,
    AI,
    JAX,
    RegistryEntry::plain("Charles River Laboratories"),
    RegistryEntry::plain("Coherent Scientific"),
    RegistryEntry::plain("Hamamatsu"),
    RegistryEntry::plain("Nikon"),
    RegistryEntry::plain("Olympus"),
    RegistryEntry::plain("Teledyne FLIR"),
    RegistryEntry::plain("Thorlabs"),
    RegistryEntry::plain("Doric"),
    RegistryEntry::plain("IMEC"),
    RegistryEntry::plain("New Scale Technologies"),
    RegistryEntry::plain("Open Ephys Production Site"),
    RegistryEntry::plain("Bruker"),
    OTHER,
];

pub const MUS_MUSCULUS: RegistryEntry = RegistryEntry {
    name: "Mus musculus",
    abbreviation: None,
    registry: Some(Registry::Ncbi),
    registry_identifier: Some("NCBI:txid10090"),
};

pub const SPECIES: &[RegistryEntry] = &[
    MUS_MUSCULUS,
    RegistryEntry {
        name: "Homo sapiens",
        abbreviation: None,
        registry: Some(Registry::Ncbi),
        registry_identifier: Some("NCBI:txid9606"),
    },
    RegistryEntry {
        name: "Rattus norvegicus",
        abbreviation: None,
        registry: Some(Registry::Ncbi),
        registry_identifier: Some("NCBI:txid10116"),
    },
    RegistryEntry {
        name: "Macaca mulatta",
        abbreviation: None,
        registry: Some(Registry::Ncbi),
        registry_identifier: Some("NCBI:txid9544"),
    },
    RegistryEntry {
        name: "Callithrix jacchus",
        abbreviation: None,
        registry: Some(Registry::Ncbi),
        registry_identifier: Some("NCBI:txid9483"),
    },
];

/// Find a table row by full name or abbreviation.
#[must_use]
pub fn lookup(table: &'static [RegistryEntry], key: &str) -> Option<&'static RegistryEntry> {
    table
        .iter()
        .find(|entry| entry.name == key || entry.abbreviation == Some(key))
}

/// Whether `pid` is one of the rows of `table`.
#[must_use]
pub fn is_registered(table: &'static [RegistryEntry], pid: &PidName) -> bool {
    table.iter().any(|entry| entry.matches(pid))
}

#[must_use]
pub fn organization(key: &str) -> Option<PidName> {
    lookup(ORGANIZATIONS, key).map(RegistryEntry::to_pid_name)
}

#[must_use]
pub fn species(key: &str) -> Option<PidName> {
    lookup(SPECIES, key).map(RegistryEntry::to_pid_name)
}

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// Data-collection modality, serialized by its abbreviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Modality {
    #[serde(rename = "behavior")]
    Behavior,
    #[serde(rename = "behavior-videos")]
    BehaviorVideos,
    #[serde(rename = "confocal")]
    Confocal,
    #[serde(rename = "ecephys")]
    Ecephys,
    #[serde(rename = "EMG")]
    Emg,
    #[serde(rename = "fib")]
    Fib,
    #[serde(rename = "fMOST")]
    Fmost,
    #[serde(rename = "icephys")]
    Icephys,
    #[serde(rename = "ISI")]
    Isi,
    #[serde(rename = "MRI")]
    Mri,
    #[serde(rename = "merfish")]
    Merfish,
    #[serde(rename = "pophys")]
    Pophys,
    #[serde(rename = "slap")]
    Slap,
    #[serde(rename = "SPIM")]
    Spim,
    #[serde(rename = "trained-behavior")]
    TrainedBehavior,
}

impl Modality {
    pub const ALL: [Self; 15] = [
        Self::Behavior,
        Self::BehaviorVideos,
        Self::Confocal,
        Self::Ecephys,
        Self::Emg,
        Self::Fib,
        Self::Fmost,
        Self::Icephys,
        Self::Isi,
        Self::Mri,
        Self::Merfish,
        Self::Pophys,
        Self::Slap,
        Self::Spim,
        Self::TrainedBehavior,
    ];

    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Behavior => "behavior",
            Self::BehaviorVideos => "behavior-videos",
            Self::Confocal => "confocal",
            Self::Ecephys => "ecephys",
            Self::Emg => "EMG",
            Self::Fib => "fib",
            Self::Fmost => "fMOST",
            Self::Icephys => "icephys",
            Self::Isi => "ISI",
            Self::Mri => "MRI",
            Self::Merfish => "merfish",
            Self::Pophys => "pophys",
            Self::Slap => "slap",
            Self::Spim => "SPIM",
            Self::TrainedBehavior => "trained-behavior",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Behavior => "Behavior",
            Self::BehaviorVideos => "Behavior videos",
            Self::Confocal => "Confocal microscopy",
            Self::Ecephys => "Extracellular electrophysiology",
            Self::Emg => "Electromyography",
            Self::Fib => "Fiber photometry",
            Self::Fmost => "Fluorescence micro-optical sectioning tomography",
            Self::Icephys => "Intracellular electrophysiology",
            Self::Isi => "Intrinsic signal imaging",
            Self::Mri => "Magnetic resonance imaging",
            Self::Merfish => "Multiplexed error-robust fluorescence in situ hybridization",
            Self::Pophys => "Planar optical physiology",
            Self::Slap => "Scanned line projection imaging",
            Self::Spim => "Selective plane illumination microscopy",
            Self::TrainedBehavior => "Trained behavior",
        }
    }

    #[must_use]
    pub fn from_abbreviation(abbreviation: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|modality| modality.abbreviation() == abbreviation)
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}
