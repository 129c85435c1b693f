use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use std::str::FromStr;
use tracing::warn;
use upkeep_predict::parse_date;

use crate::db::init_db;
use crate::error::{Result, StoreError};

/// Storage format for calendar date-times.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Record store over its own SQLite connection. Entity operations live in
/// the sibling modules (`machines`, `calendar`, ...) as `impl RecordStore`
/// blocks.
pub struct RecordStore {
    pub(crate) conn: Connection,
}

impl RecordStore {
    /// Wrap `conn`, creating the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }
}

/// Trimmed, non-empty text or `InvalidField`.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to None.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn require_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    parse_date(value).map_err(|_| StoreError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM` or a bare date
/// (midnight).
pub(crate) fn require_datetime(field: &'static str, value: &str) -> Result<NaiveDateTime> {
    let v = value.trim();
    NaiveDateTime::parse_from_str(v, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| parse_date(v).ok().and_then(|d| d.and_hms_opt(0, 0, 0)))
        .ok_or_else(|| StoreError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Parse a label column, reading unknown values as the type's default.
pub(crate) fn stored_label<T: FromStr + Default>(
    table: &'static str,
    column: &'static str,
    id: &str,
    raw: &str,
) -> T {
    T::from_str(raw).unwrap_or_else(|_| {
        warn!(table, column, id, value = raw, "unknown stored label, reading as default");
        T::default()
    })
}

pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
