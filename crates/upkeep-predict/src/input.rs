use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PredictError, Result};

/// Storage and display format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Surrounding whitespace is tolerated; anything
/// else that chrono rejects becomes `InvalidDateFormat`.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        PredictError::InvalidDateFormat {
            value: value.to_string(),
        }
    })
}

/// Render a date the way it is stored.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The three machine fields every scheduling and prediction call reads.
///
/// `last_maintenance_date`, when present, is expected to be on or after
/// `installation_date`; that is the record store's job to uphold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceInput {
    pub installation_date: NaiveDate,
    /// Nominal days between services. Not validated here.
    pub frequency_days: i64,
    pub last_maintenance_date: Option<NaiveDate>,
}

impl MaintenanceInput {
    pub fn new(
        installation_date: NaiveDate,
        frequency_days: i64,
        last_maintenance_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            installation_date,
            frequency_days,
            last_maintenance_date,
        }
    }

    /// Build an input from the textual columns of a machine row.
    ///
    /// An empty `last_maintenance_date` string is treated like NULL.
    pub fn parse(
        installation_date: &str,
        frequency_days: i64,
        last_maintenance_date: Option<&str>,
    ) -> Result<Self> {
        let installation_date = parse_date(installation_date)?;
        let last_maintenance_date = match last_maintenance_date {
            Some(s) if !s.trim().is_empty() => Some(parse_date(s)?),
            _ => None,
        };
        Ok(Self::new(
            installation_date,
            frequency_days,
            last_maintenance_date,
        ))
    }

    /// Last service date, or installation date if never serviced.
    pub fn reference_date(&self) -> NaiveDate {
        self.last_maintenance_date.unwrap_or(self.installation_date)
    }

    /// Whole days from the reference date to `today`. Zero on the same day,
    /// negative if `today` precedes the reference date.
    pub fn days_since_reference(&self, today: NaiveDate) -> i64 {
        today.signed_duration_since(self.reference_date()).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2023-01-01").unwrap(), date(2023, 1, 1));
        assert_eq!(parse_date(" 2024-02-29 ").unwrap(), date(2024, 2, 29));
    }

    #[test]
    fn rejects_malformed_dates() {
        for bad in ["", "2023/01/01", "01-02-2023", "2023-02-30", "yesterday"] {
            assert_eq!(
                parse_date(bad),
                Err(PredictError::InvalidDateFormat {
                    value: bad.to_string()
                }),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn reference_prefers_last_maintenance() {
        let never = MaintenanceInput::parse("2023-01-01", 30, None).unwrap();
        assert_eq!(never.reference_date(), date(2023, 1, 1));

        let serviced = MaintenanceInput::parse("2023-01-01", 30, Some("2023-03-10")).unwrap();
        assert_eq!(serviced.reference_date(), date(2023, 3, 10));
    }

    #[test]
    fn empty_last_date_is_treated_as_absent() {
        let input = MaintenanceInput::parse("2023-01-01", 30, Some("")).unwrap();
        assert_eq!(input.last_maintenance_date, None);
    }

    #[test]
    fn malformed_last_date_propagates() {
        let err = MaintenanceInput::parse("2023-01-01", 30, Some("soon")).unwrap_err();
        assert_eq!(
            err,
            PredictError::InvalidDateFormat {
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn days_since_reference_truncates_to_whole_days() {
        let input = MaintenanceInput::new(date(2023, 1, 1), 30, None);
        assert_eq!(input.days_since_reference(date(2023, 1, 1)), 0);
        assert_eq!(input.days_since_reference(date(2023, 1, 31)), 30);
        assert_eq!(input.days_since_reference(date(2022, 12, 31)), -1);
    }
}
