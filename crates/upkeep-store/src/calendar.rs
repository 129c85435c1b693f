use chrono::NaiveDate;
use rusqlite::params;
use tracing::info;
use upkeep_core::types::new_record_id;

use crate::error::{Result, StoreError};
use crate::store::{
    now_rfc3339, optional_text, require_datetime, require_text, RecordStore, DATETIME_FORMAT,
};
use crate::types::{CalendarEvent, NewCalendarEvent};

const EVENT_COLUMNS: &str = "id, title, start_date, end_date, description, event_type, created_at";

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<CalendarEvent> {
    Ok(CalendarEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        start_date: row.get(2)?,
        end_date: row.get(3)?,
        description: row.get(4)?,
        event_type: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn day_start(day: NaiveDate) -> String {
    format!("{} 00:00:00", day.format("%Y-%m-%d"))
}

fn day_end(day: NaiveDate) -> String {
    format!("{} 23:59:59", day.format("%Y-%m-%d"))
}

impl RecordStore {
    /// Add a calendar event. `end` may not precede `start`.
    pub fn add_event(&self, new: &NewCalendarEvent) -> Result<CalendarEvent> {
        let start = require_datetime("start_date", &new.start)?;
        let end = require_datetime("end_date", &new.end)?;
        if end < start {
            return Err(StoreError::invalid(
                "end_date",
                format!("{} is before the start {}", new.end, new.start),
            ));
        }

        let event = CalendarEvent {
            id: new_record_id(),
            title: require_text("title", &new.title)?,
            start_date: start.format(DATETIME_FORMAT).to_string(),
            end_date: end.format(DATETIME_FORMAT).to_string(),
            description: optional_text(new.description.as_deref()),
            event_type: require_text("event_type", &new.event_type)?,
            created_at: now_rfc3339(),
        };
        self.conn.execute(
            "INSERT INTO calendar_events (id, title, start_date, end_date, description, event_type, created_at)
             VALUES (?1,?2,?3,?4,?5,?6,?7)",
            params![
                event.id,
                event.title,
                event.start_date,
                event.end_date,
                event.description,
                event.event_type,
                event.created_at
            ],
        )?;
        info!(event_id = %event.id, start = %event.start_date, "calendar event added");
        Ok(event)
    }

    /// Events that lie entirely within `from`..=`to` (whole days).
    pub fn events_between(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<CalendarEvent>> {
        self.query_events(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM calendar_events
                 WHERE start_date >= ?1 AND end_date <= ?2
                 ORDER BY start_date, id"
            ),
            &day_start(from),
            &day_end(to),
        )
    }

    /// Events that overlap `day` at all, including multi-day events that
    /// started earlier or end later.
    pub fn events_on(&self, day: NaiveDate) -> Result<Vec<CalendarEvent>> {
        self.query_events(
            &format!(
                "SELECT {EVENT_COLUMNS} FROM calendar_events
                 WHERE start_date <= ?2 AND end_date >= ?1
                 ORDER BY start_date, id"
            ),
            &day_start(day),
            &day_end(day),
        )
    }

    fn query_events(&self, sql: &str, lo: &str, hi: &str) -> Result<Vec<CalendarEvent>> {
        let mut stmt = self.conn.prepare(sql)?;
        let events = stmt
            .query_map(params![lo, hi], row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn store() -> RecordStore {
        RecordStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn event(title: &str, start: &str, end: &str) -> NewCalendarEvent {
        NewCalendarEvent {
            title: title.into(),
            start: start.into(),
            end: end.into(),
            description: None,
            event_type: "maintenance".into(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        let store = store();
        let err = store
            .add_event(&event("Audit", "2023-06-15 10:00:00", "2023-06-15 09:00:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "end_date", .. }));
    }

    #[test]
    fn stored_times_are_normalised() {
        let store = store();
        let e = store
            .add_event(&event("Audit", "2023-06-15 09:00", "2023-06-15"))
            .unwrap_err();
        // End at midnight precedes a 09:00 start.
        assert!(matches!(e, StoreError::InvalidField { .. }));

        let ok = store
            .add_event(&event("Audit", "2023-06-15 09:00", "2023-06-15 17:30"))
            .unwrap();
        assert_eq!(ok.start_date, "2023-06-15 09:00:00");
        assert_eq!(ok.end_date, "2023-06-15 17:30:00");
    }

    #[test]
    fn same_day_events_are_found_for_that_day() {
        let store = store();
        store
            .add_event(&event("Oil change", "2023-06-15 08:00:00", "2023-06-15 10:00:00"))
            .unwrap();
        store
            .add_event(&event("Next day", "2023-06-16 08:00:00", "2023-06-16 10:00:00"))
            .unwrap();

        let on_day = store.events_on(date(2023, 6, 15)).unwrap();
        assert_eq!(on_day.len(), 1);
        assert_eq!(on_day[0].title, "Oil change");

        let within = store.events_between(date(2023, 6, 15), date(2023, 6, 15)).unwrap();
        assert_eq!(within.len(), 1);
    }

    #[test]
    fn multi_day_event_overlaps_but_is_not_within() {
        let store = store();
        store
            .add_event(&event("Overhaul", "2023-06-14 08:00:00", "2023-06-17 18:00:00"))
            .unwrap();

        assert_eq!(store.events_on(date(2023, 6, 15)).unwrap().len(), 1);
        assert!(store
            .events_between(date(2023, 6, 15), date(2023, 6, 16))
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .events_between(date(2023, 6, 1), date(2023, 6, 30))
                .unwrap()
                .len(),
            1
        );
    }
}
