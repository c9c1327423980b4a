pub mod delta;
pub mod schema;
pub mod upgrade;

pub use delta::DeltaCommands;
pub use schema::SchemaCommands;
pub use upgrade::UpgradeCommands;
