//! Shared building blocks for the upkeep crates: configuration, the common
//! error type, roles, machine status and the explicit session context.

pub mod config;
pub mod error;
pub mod types;

pub use config::UpkeepConfig;
pub use error::{Result, UpkeepError};
pub use types::{MachineStatus, Role, SessionContext};
