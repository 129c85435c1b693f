use chrono::Duration;
use clap::Subcommand;
use upkeep_store::{CalendarEvent, NewCalendarEvent};

use crate::app::App;
use crate::commands::date_or;
use crate::output::{emit, or_dash, print_table};

/// Window `calendar list` covers when no `--to` is given.
const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Subcommand)]
pub(crate) enum CalendarCommand {
    /// Schedule an event
    Add {
        #[arg(long)]
        title: String,
        /// Start, "YYYY-MM-DD HH:MM[:SS]" or a bare date
        #[arg(long)]
        start: String,
        /// End, same formats as --start
        #[arg(long)]
        end: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", default_value = "maintenance")]
        event_type: String,
    },
    /// Events lying entirely within a date range
    List {
        /// First day (default: today)
        #[arg(long)]
        from: Option<String>,
        /// Last day (default: 30 days after --from)
        #[arg(long)]
        to: Option<String>,
    },
    /// Events touching one day (default: today)
    Day { date: Option<String> },
}

pub(crate) fn run(app: &App, command: CalendarCommand) -> anyhow::Result<()> {
    match command {
        CalendarCommand::Add {
            title,
            start,
            end,
            description,
            event_type,
        } => {
            let event = app.store.add_event(&NewCalendarEvent {
                title,
                start,
                end,
                description,
                event_type,
            })?;
            emit(app.output, &event, |e| {
                println!("Scheduled {} from {} to {}", e.title, e.start_date, e.end_date)
            })
        }
        CalendarCommand::List { from, to } => {
            let from = date_or(from.as_deref(), app.today)?;
            let to = date_or(to.as_deref(), from + Duration::days(DEFAULT_WINDOW_DAYS))?;
            if to < from {
                anyhow::bail!("--to {to} is before --from {from}");
            }
            let events = app.store.events_between(from, to)?;
            emit(app.output, &events, |events| print_events(events))
        }
        CalendarCommand::Day { date } => {
            let day = date_or(date.as_deref(), app.today)?;
            let events = app.store.events_on(day)?;
            emit(app.output, &events, |events| print_events(events))
        }
    }
}

fn print_events(events: &[CalendarEvent]) {
    let rows: Vec<_> = events
        .iter()
        .map(|e| {
            vec![
                e.start_date.clone(),
                e.end_date.clone(),
                e.title.clone(),
                e.event_type.clone(),
                or_dash(e.description.as_deref()),
            ]
        })
        .collect();
    print_table(&["START", "END", "TITLE", "TYPE", "DESCRIPTION"], &rows);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use chrono::NaiveDate;

    fn add(app: &App, start: &str, end: &str) -> anyhow::Result<()> {
        run(
            app,
            CalendarCommand::Add {
                title: "Audit".into(),
                start: start.into(),
                end: end.into(),
                description: None,
                event_type: "audit".into(),
            },
        )
    }

    #[test]
    fn added_events_are_listed() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        add(&app, "2023-06-20 09:00", "2023-06-20 11:00").unwrap();

        run(&app, CalendarCommand::List { from: None, to: None }).unwrap();
        let day = NaiveDate::from_ymd_opt(2023, 6, 20).unwrap();
        assert_eq!(app.store.events_on(day).unwrap().len(), 1);
    }

    #[test]
    fn reversed_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let err = run(
            &app,
            CalendarCommand::List {
                from: Some("2023-06-20".into()),
                to: Some("2023-06-01".into()),
            },
        );
        assert!(err.is_err());
    }

    #[test]
    fn end_before_start_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let err = add(&app, "2023-06-20 11:00", "2023-06-20 09:00").unwrap_err();
        assert_eq!(crate::output::error_code(&err), "INVALID_INPUT");
    }
}
