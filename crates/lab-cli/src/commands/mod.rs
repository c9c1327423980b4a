pub mod compat;
pub mod delta;
pub mod dispatch;
pub mod merge;
pub mod schema;
pub mod shared;
pub mod upgrade;
pub mod validate;
