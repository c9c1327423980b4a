//! Component records nested inside entity documents.
//!
//! Components are owned by exactly one parent. Tagged unions dispatch on
//! `object_type` so the discriminator is a constant per variant.

pub mod configs;
pub mod devices;
pub mod processing;
pub mod quality;
pub mod stimulus;
pub mod surgery;

pub use configs::{
    Channel, DetectorConfig, DeviceConfig, LaserConfig, LickSpoutConfig, Liquid, MriScan,
    MriScanSequence, PatchCordConfig, ScanType, TriggerType, Valence,
};
pub use devices::{
    CameraAssembly, CameraTarget, Cooling, DataInterface, Detector, DetectorType, Device, Disc,
    EphysAssembly, EphysProbe, HarpDevice, HarpDeviceType, Laser, Led, LightSource,
    MousePlatform, Objective, ObjectiveImmersion, PatchCord, Treadmill, Tube,
};
pub use processing::{Code, DataProcess, ProcessName, ProcessStage, ResourceTimestamped, ResourceUsage};
pub use quality::{Grouping, QcMetric, QcStatus, Stage, Status, aggregate_status};
pub use stimulus::{
    AuditoryStimulation, FilterType, OptoStimulation, PulseShape, Reward, RewardSolution,
    Stimulus, StimulusEpoch, StimulusModality,
};
pub use surgery::{
    Anaesthetic, Craniotomy, CraniotomyType, Headframe, Injection, InjectionDynamics,
    InjectionMaterial, InjectionProfile, MaterialType, Perfusion, Reagent, SpecimenProcedure,
    SpecimenProcedureType, Surgery, SurgeryProcedure,
};
