//! Hardware declared on an instrument.
//!
//! Every device embeds the shared [`Device`] fields by value (flattened in
//! JSON) instead of extending a base class.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{PowerUnit, SizeUnit};
use crate::errors::ValidationError;
use crate::registries::{ORGANIZATIONS, PidName, is_registered};
use crate::validate::{
    OtherRequiresNotes, OtherSentinel, Validate, check_not_blank, check_positive, check_range,
    validate_each,
};

/// Fields shared by every piece of hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Device {
    /// Unique within one instrument; configs refer to devices by this name.
    pub name: String,
    pub manufacturer: Option<PidName>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub notes: Option<String>,
}

impl Device {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            manufacturer: None,
            model: None,
            serial_number: None,
            notes: None,
        }
    }
}

impl Validate for Device {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("Device", "name", &self.name)?;
        if let Some(manufacturer) = &self.manufacturer {
            if !is_registered(ORGANIZATIONS, manufacturer) {
                return Err(ValidationError::field(
                    "Device",
                    "manufacturer",
                    &manufacturer.name,
                    "must be a registered organization",
                ));
            }
        }
        OtherRequiresNotes::new("Device", "manufacturer").check(&self.manufacturer, self.notes.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Detector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DetectorType {
    Camera,
    #[serde(rename = "Photomultiplier tube")]
    PhotomultiplierTube,
    #[serde(rename = "Photodiode")]
    Photodiode,
    Other,
}

impl OtherSentinel for DetectorType {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum DataInterface {
    #[serde(rename = "USB")]
    Usb,
    #[serde(rename = "PCIe")]
    Pcie,
    Ethernet,
    Coax,
    #[serde(rename = "Camera Link")]
    CameraLink,
    Other,
}

impl OtherSentinel for DataInterface {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Cooling {
    Air,
    Water,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Detector {
    #[serde(flatten)]
    pub device: Device,
    pub detector_type: DetectorType,
    pub data_interface: DataInterface,
    pub cooling: Option<Cooling>,
}

impl Validate for Detector {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device.validate()?;
        let notes = self.device.notes.as_deref();
        OtherRequiresNotes::new("Detector", "detector_type").check(&self.detector_type, notes)?;
        OtherRequiresNotes::new("Detector", "data_interface").check(&self.data_interface, notes)
    }
}

// ---------------------------------------------------------------------------
// Objective
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveImmersion {
    Air,
    Multi,
    Oil,
    Water,
    Other,
}

impl OtherSentinel for ObjectiveImmersion {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Objective {
    #[serde(flatten)]
    pub device: Device,
    pub numerical_aperture: f64,
    pub magnification: f64,
    pub immersion: ObjectiveImmersion,
}

impl Validate for Objective {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device.validate()?;
        check_range("Objective", "numerical_aperture", self.numerical_aperture, 0.0, 2.0)?;
        check_positive("Objective", "magnification", self.magnification)?;
        OtherRequiresNotes::new("Objective", "immersion")
            .check(&self.immersion, self.device.notes.as_deref())
    }
}

// ---------------------------------------------------------------------------
// HarpDevice
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum HarpDeviceType {
    Behavior,
    #[serde(rename = "Clock Synchronizer")]
    ClockSynchronizer,
    #[serde(rename = "Lickety Split")]
    LicketySplit,
    #[serde(rename = "Load Cells")]
    LoadCells,
    Olfactometer,
    #[serde(rename = "Sound Card")]
    SoundCard,
    Other,
}

impl OtherSentinel for HarpDeviceType {
    fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct HarpDevice {
    #[serde(flatten)]
    pub device: Device,
    pub harp_device_type: HarpDeviceType,
    pub core_version: Option<String>,
    pub tag_version: Option<String>,
    #[serde(default)]
    pub is_clock_generator: bool,
}

impl Validate for HarpDevice {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device.validate()?;
        OtherRequiresNotes::new("HarpDevice", "harp_device_type")
            .check(&self.harp_device_type, self.device.notes.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Light sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Laser {
    #[serde(flatten)]
    pub device: Device,
    /// Nanometers.
    pub wavelength: u32,
    pub maximum_power: Option<f64>,
    #[serde(default)]
    pub power_unit: PowerUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Led {
    #[serde(flatten)]
    pub device: Device,
    /// Nanometers.
    pub wavelength: u32,
    pub bandwidth: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum LightSource {
    Laser(Laser),
    #[serde(rename = "Light emitting diode")]
    Led(Led),
}

impl LightSource {
    #[must_use]
    pub const fn device(&self) -> &Device {
        match self {
            Self::Laser(laser) => &laser.device,
            Self::Led(led) => &led.device,
        }
    }
}

impl Validate for LightSource {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device().validate()?;
        match self {
            Self::Laser(laser) => {
                check_range("Laser", "wavelength", laser.wavelength, 300, 1000)?;
                if let Some(power) = laser.maximum_power {
                    check_positive("Laser", "maximum_power", power)?;
                }
                Ok(())
            }
            Self::Led(led) => check_range("Led", "wavelength", led.wavelength, 300, 1000),
        }
    }
}

// ---------------------------------------------------------------------------
// Fiber, ephys, cameras
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PatchCord {
    #[serde(flatten)]
    pub device: Device,
    /// Micrometers.
    pub core_diameter: f64,
    pub numerical_aperture: f64,
    pub ferrule_material: Option<String>,
}

impl Validate for PatchCord {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device.validate()?;
        check_positive("PatchCord", "core_diameter", self.core_diameter)?;
        check_range("PatchCord", "numerical_aperture", self.numerical_aperture, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EphysProbe {
    #[serde(flatten)]
    pub device: Device,
    pub probe_model: String,
}

impl Validate for EphysProbe {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device.validate()?;
        check_not_blank("EphysProbe", "probe_model", &self.probe_model)
    }
}

/// A manipulator and the probes it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EphysAssembly {
    pub name: String,
    pub manipulator: Device,
    pub probes: Vec<EphysProbe>,
}

impl Validate for EphysAssembly {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("EphysAssembly", "name", &self.name)?;
        self.manipulator
            .validate()
            .map_err(|err| err.nested("manipulator"))?;
        if self.probes.is_empty() {
            return Err(ValidationError::field(
                "EphysAssembly",
                "probes",
                &self.probes,
                "must carry at least one probe",
            ));
        }
        validate_each("probes", &self.probes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CameraTarget {
    Brain,
    Body,
    Eye,
    Face,
    Tongue,
    Other,
}

/// Camera plus lens; a stick microscope is a camera assembly aimed at the
/// brain surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CameraAssembly {
    pub name: String,
    pub camera: Detector,
    pub lens: Device,
    pub camera_target: CameraTarget,
}

impl Validate for CameraAssembly {
    fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("CameraAssembly", "name", &self.name)?;
        self.camera.validate().map_err(|err| err.nested("camera"))?;
        self.lens.validate().map_err(|err| err.nested("lens"))
    }
}

// ---------------------------------------------------------------------------
// MousePlatform
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Disc {
    #[serde(flatten)]
    pub device: Device,
    pub radius: f64,
    #[serde(default = "centimeter")]
    pub radius_unit: SizeUnit,
}

const fn centimeter() -> SizeUnit {
    SizeUnit::Centimeter
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Tube {
    #[serde(flatten)]
    pub device: Device,
    pub diameter: f64,
    #[serde(default = "centimeter")]
    pub diameter_unit: SizeUnit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Treadmill {
    #[serde(flatten)]
    pub device: Device,
}

/// What the animal stands or runs on during an acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "object_type")]
pub enum MousePlatform {
    Disc(Disc),
    Tube(Tube),
    Treadmill(Treadmill),
}

impl MousePlatform {
    #[must_use]
    pub const fn device(&self) -> &Device {
        match self {
            Self::Disc(disc) => &disc.device,
            Self::Tube(tube) => &tube.device,
            Self::Treadmill(treadmill) => &treadmill.device,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.device().name
    }
}

impl Validate for MousePlatform {
    fn validate(&self) -> Result<(), ValidationError> {
        self.device().validate()?;
        match self {
            Self::Disc(disc) => check_positive("Disc", "radius", disc.radius),
            Self::Tube(tube) => check_positive("Tube", "diameter", tube.diameter),
            Self::Treadmill(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registries::{OTHER, organization};

    fn camera(interface: DataInterface, notes: Option<&str>) -> Detector {
        Detector {
            device: Device {
                notes: notes.map(str::to_string),
                ..Device::named("Face camera")
            },
            detector_type: DetectorType::Camera,
            data_interface: interface,
            cooling: None,
        }
    }

    #[test]
    fn detector_other_interface_requires_notes() {
        assert!(camera(DataInterface::Usb, None).validate().is_ok());
        let err = camera(DataInterface::Other, None).validate().unwrap_err();
        assert_eq!(err.fields(), vec!["data_interface", "notes"]);
        assert!(camera(DataInterface::Other, Some("GigE vision")).validate().is_ok());
    }

    #[test]
    fn other_manufacturer_requires_notes() {
        let mut device = Device::named("Custom stage");
        device.manufacturer = Some(OTHER.to_pid_name());
        assert!(device.validate().is_err());
        device.notes = Some("Built in-house".into());
        assert!(device.validate().is_ok());
    }

    #[test]
    fn unregistered_manufacturer_is_rejected() {
        let mut device = Device::named("Stage");
        device.manufacturer = Some(PidName::named("Acme Widgets"));
        let err = device.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["manufacturer"]);
        device.manufacturer = organization("Thorlabs");
        assert!(device.validate().is_ok());
    }

    #[test]
    fn laser_wavelength_range_is_enforced() {
        let laser = |wavelength| {
            LightSource::Laser(Laser {
                device: Device::named("Laser A"),
                wavelength,
                maximum_power: None,
                power_unit: PowerUnit::Milliwatt,
            })
        };
        assert!(laser(488).validate().is_ok());
        assert!(laser(300).validate().is_ok());
        assert!(laser(1000).validate().is_ok());
        assert!(laser(1064).validate().is_err());
        assert!(laser(250).validate().is_err());
    }

    #[test]
    fn light_source_tag_roundtrip() {
        let led = LightSource::Led(Led {
            device: Device::named("LED 470"),
            wavelength: 470,
            bandwidth: Some(20),
        });
        let json = serde_json::to_value(&led).unwrap();
        assert_eq!(json["object_type"], "Light emitting diode");
        assert_eq!(json["name"], "LED 470");
        let back: LightSource = serde_json::from_value(json).unwrap();
        assert_eq!(back, led);
    }

    #[test]
    fn ephys_assembly_needs_probes() {
        let assembly = EphysAssembly {
            name: "Ephys Assembly A".into(),
            manipulator: Device::named("Manipulator A"),
            probes: Vec::new(),
        };
        assert!(assembly.validate().is_err());
    }

    #[test]
    fn platform_name_comes_from_device() {
        let platform = MousePlatform::Disc(Disc {
            device: Device::named("Running Wheel"),
            radius: 15.0,
            radius_unit: SizeUnit::Centimeter,
        });
        assert_eq!(platform.name(), "Running Wheel");
        assert!(platform.validate().is_ok());
    }
}
