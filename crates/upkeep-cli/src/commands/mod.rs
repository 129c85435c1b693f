//! One module per top-level subcommand. Handlers take the opened [`App`]
//! and, where the caller's identity matters, the [`SessionContext`] from
//! login.
//!
//! [`App`]: crate::app::App
//! [`SessionContext`]: upkeep_core::SessionContext

pub(crate) mod account;
pub(crate) mod calendar;
pub(crate) mod dashboard;
pub(crate) mod inspection;
pub(crate) mod inventory;
pub(crate) mod machine;
pub(crate) mod resource;
pub(crate) mod work_order;

use anyhow::Context;
use chrono::NaiveDate;
use upkeep_predict::parse_date;

/// Parse an optional `YYYY-MM-DD` argument, falling back to `default`.
pub(crate) fn date_or(value: Option<&str>, default: NaiveDate) -> anyhow::Result<NaiveDate> {
    match value {
        Some(v) => parse_date(v).with_context(|| format!("invalid date {v:?}")),
        None => Ok(default),
    }
}
