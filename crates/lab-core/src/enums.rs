//! Unit enums and small shared enumerations.
//!
//! Units serialize as lowercase words (`"millimeter"`, `"nanoliter"`) so the
//! JSON stays readable without a lookup table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SizeUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SizeUnit {
    Meter,
    Centimeter,
    #[default]
    Millimeter,
    Micrometer,
    Nanometer,
    Inch,
    Pixel,
}

impl SizeUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Meter => "meter",
            Self::Centimeter => "centimeter",
            Self::Millimeter => "millimeter",
            Self::Micrometer => "micrometer",
            Self::Nanometer => "nanometer",
            Self::Inch => "inch",
            Self::Pixel => "pixel",
        }
    }
}

impl fmt::Display for SizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// VolumeUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolumeUnit {
    Milliliter,
    Microliter,
    #[default]
    Nanoliter,
}

impl VolumeUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Milliliter => "milliliter",
            Self::Microliter => "microliter",
            Self::Nanoliter => "nanoliter",
        }
    }
}

impl fmt::Display for VolumeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TimeUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Hour,
    Minute,
    #[default]
    Second,
    Millisecond,
    Microsecond,
}

impl TimeUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Second => "second",
            Self::Millisecond => "millisecond",
            Self::Microsecond => "microsecond",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AngleUnit / CurrentUnit / PowerUnit / FrequencyUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AngleUnit {
    Radians,
    #[default]
    Degrees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CurrentUnit {
    Amps,
    #[default]
    Microamps,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PowerUnit {
    Watt,
    #[default]
    Milliwatt,
    Microwatt,
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyUnit {
    Kilohertz,
    #[default]
    Hertz,
}

// ---------------------------------------------------------------------------
// Sex
// ---------------------------------------------------------------------------

/// Biological sex of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Female => "Female",
            Self::Male => "Male",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
