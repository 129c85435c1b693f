use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::input::MaintenanceInput;
use crate::wear::WearSource;

/// Share of the predicted interval after which service is "due soon".
const DUE_SOON_RATIO: f64 = 0.8;
/// Remaining-life share at or below which a machine is critical.
const CRITICAL_RATIO: f64 = 0.2;
/// Remaining-life share at or below which a machine needs attention.
const WARNING_RATIO: f64 = 0.5;

/// Scale the nominal interval by `wear`, truncating toward zero.
pub fn predicted_days(frequency_days: i64, wear: f64) -> i64 {
    (frequency_days as f64 * wear) as i64
}

/// Advisory service urgency. Never written back to the machine record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusPrediction {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Maintenance Due Soon")]
    DueSoon,
    #[serde(rename = "Maintenance Required")]
    Required,
}

impl StatusPrediction {
    pub fn label(&self) -> &'static str {
        match self {
            StatusPrediction::Ok => "OK",
            StatusPrediction::DueSoon => "Maintenance Due Soon",
            StatusPrediction::Required => "Maintenance Required",
        }
    }

    /// Classify `days_since` against an already-scaled interval.
    pub fn classify(days_since: i64, predicted_days: i64) -> Self {
        if days_since >= predicted_days {
            StatusPrediction::Required
        } else if days_since as f64 >= predicted_days as f64 * DUE_SOON_RATIO {
            StatusPrediction::DueSoon
        } else {
            StatusPrediction::Ok
        }
    }
}

impl fmt::Display for StatusPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Advisory remaining-life estimate in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "days_remaining", rename_all = "snake_case")]
pub enum RemainingLife {
    Immediate,
    Critical(i64),
    Warning(i64),
    Good(i64),
}

impl RemainingLife {
    /// Classify `remaining` against the scaled life it was derived from.
    pub fn classify(remaining: i64, estimated_life: i64) -> Self {
        let life = estimated_life as f64;
        if remaining <= 0 {
            RemainingLife::Immediate
        } else if remaining as f64 <= life * CRITICAL_RATIO {
            RemainingLife::Critical(remaining)
        } else if remaining as f64 <= life * WARNING_RATIO {
            RemainingLife::Warning(remaining)
        } else {
            RemainingLife::Good(remaining)
        }
    }

    pub fn days_remaining(&self) -> Option<i64> {
        match self {
            RemainingLife::Immediate => None,
            RemainingLife::Critical(d) | RemainingLife::Warning(d) | RemainingLife::Good(d) => {
                Some(*d)
            }
        }
    }
}

impl fmt::Display for RemainingLife {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainingLife::Immediate => f.write_str("Immediate Maintenance Required"),
            RemainingLife::Critical(d) => write!(f, "Critical: {d} days remaining"),
            RemainingLife::Warning(d) => write!(f, "Warning: {d} days remaining"),
            RemainingLife::Good(d) => write!(f, "Good: {d} days remaining"),
        }
    }
}

/// Predict how urgently a machine needs service as of `today`.
///
/// Draws one wear factor from `wear`.
pub fn predict_status(
    input: &MaintenanceInput,
    today: NaiveDate,
    mut wear: impl WearSource,
) -> StatusPrediction {
    let days_since = input.days_since_reference(today);
    let predicted = predicted_days(input.frequency_days, wear.wear_factor());
    StatusPrediction::classify(days_since, predicted)
}

/// Estimate remaining service life as of `today`.
///
/// Draws its own wear factor, so the result is not correlated with a
/// `predict_status` call made on the same machine.
pub fn estimate_remaining_life(
    input: &MaintenanceInput,
    today: NaiveDate,
    mut wear: impl WearSource,
) -> RemainingLife {
    let days_since = input.days_since_reference(today);
    let estimated_life = predicted_days(input.frequency_days, wear.wear_factor());
    RemainingLife::classify(estimated_life.saturating_sub(days_since), estimated_life)
}

impl MaintenanceInput {
    pub fn predict_status(&self, today: NaiveDate, wear: impl WearSource) -> StatusPrediction {
        predict_status(self, today, wear)
    }

    pub fn estimate_remaining_life(&self, today: NaiveDate, wear: impl WearSource) -> RemainingLife {
        estimate_remaining_life(self, today, wear)
    }
}
