use chrono::{Duration, NaiveDate};

use crate::input::MaintenanceInput;

/// Compute the next scheduled service date: the reference date (last service,
/// else installation) plus `frequency_days` calendar days.
///
/// A zero or negative frequency returns the reference date or an earlier one.
/// Results beyond chrono's representable range saturate at
/// `NaiveDate::MIN`/`NaiveDate::MAX`.
pub fn next_maintenance_date(
    installation_date: NaiveDate,
    frequency_days: i64,
    last_maintenance_date: Option<NaiveDate>,
) -> NaiveDate {
    let reference = last_maintenance_date.unwrap_or(installation_date);
    let saturated = if frequency_days < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    };
    Duration::try_days(frequency_days)
        .and_then(|delta| reference.checked_add_signed(delta))
        .unwrap_or(saturated)
}

impl MaintenanceInput {
    pub fn next_maintenance_date(&self) -> NaiveDate {
        next_maintenance_date(
            self.installation_date,
            self.frequency_days,
            self.last_maintenance_date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn anchors_on_installation_when_never_serviced() {
        assert_eq!(
            next_maintenance_date(date(2023, 1, 1), 30, None),
            date(2023, 1, 31)
        );
    }

    #[test]
    fn anchors_on_last_service_when_present() {
        assert_eq!(
            next_maintenance_date(date(2023, 1, 1), 30, Some(date(2023, 6, 15))),
            date(2023, 7, 15)
        );
    }

    #[test]
    fn crosses_month_and_leap_day_boundaries() {
        assert_eq!(
            next_maintenance_date(date(2024, 2, 1), 29, None),
            date(2024, 3, 1)
        );
        assert_eq!(
            next_maintenance_date(date(2023, 12, 20), 365, None),
            date(2024, 12, 19)
        );
    }

    #[test]
    fn non_positive_frequency_is_degenerate_but_harmless() {
        let d = date(2023, 5, 5);
        assert_eq!(next_maintenance_date(d, 0, None), d);
        assert_eq!(next_maintenance_date(d, -5, None), date(2023, 4, 30));
    }

    #[test]
    fn extreme_frequency_saturates() {
        let d = date(2023, 5, 5);
        assert_eq!(next_maintenance_date(d, i64::MAX, None), NaiveDate::MAX);
        assert_eq!(next_maintenance_date(d, i64::MIN, None), NaiveDate::MIN);
    }

    #[test]
    fn method_matches_free_function() {
        let input = MaintenanceInput::new(date(2023, 1, 1), 45, Some(date(2023, 2, 1)));
        assert_eq!(input.next_maintenance_date(), date(2023, 3, 18));
    }
}
