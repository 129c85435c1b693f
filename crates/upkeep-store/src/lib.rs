//! `upkeep-store`: SQLite persistence for everything except user accounts.
//!
//! [`RecordStore`] owns one connection and exposes CRUD for machines and their
//! service history, calendar events, inspections, resources, work orders and
//! inventory, plus the dashboard aggregates. Each entity's operations live in
//! their own module as an `impl RecordStore` block.
//!
//! Dates are stored as `YYYY-MM-DD` text and validated on write; calendar
//! date-times as `YYYY-MM-DD HH:MM:SS`. Predictions read a machine through
//! [`Machine::maintenance_input`] and never write back.

pub mod calendar;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod inspections;
pub mod inventory;
pub mod machines;
pub mod resources;
pub mod store;
pub mod types;
pub mod work_orders;

pub use dashboard::{DashboardSummary, MachineStats, UpcomingMaintenance};
pub use error::{Result, StoreError};
pub use machines::{MAX_FREQUENCY_DAYS, MIN_FREQUENCY_DAYS};
pub use store::RecordStore;
pub use types::*;
