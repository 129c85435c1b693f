//! `upkeep-predict`: maintenance scheduling and advisory status prediction.
//!
//! # Overview
//!
//! Every function here is pure apart from the [`WearSource`] it is handed:
//! the current date is always an explicit argument, and the random wear
//! multiplier comes from a caller-supplied source so a prediction can be
//! reproduced with [`FixedWear`].
//!
//! | Operation                   | Result                                           |
//! |-----------------------------|--------------------------------------------------|
//! | [`next_maintenance_date`]   | reference date + frequency (deterministic)       |
//! | [`predict_status`]          | `OK` / `Maintenance Due Soon` / `Maintenance Required` |
//! | [`estimate_remaining_life`] | `Good` / `Warning` / `Critical` / `Immediate ...` |
//!
//! The reference date is the last service date, or the installation date for
//! machines that were never serviced. Both predictor operations draw their own
//! wear factor from `[0.8, 1.2]`, so their outputs are not correlated.

pub mod error;
pub mod input;
pub mod predict;
pub mod schedule;
pub mod wear;

pub use error::{PredictError, Result};
pub use input::{format_date, parse_date, MaintenanceInput, DATE_FORMAT};
pub use predict::{estimate_remaining_life, predict_status, predicted_days, RemainingLife, StatusPrediction};
pub use schedule::next_maintenance_date;
pub use wear::{FixedWear, RngWear, WearSource, WEAR_MAX, WEAR_MIN};
