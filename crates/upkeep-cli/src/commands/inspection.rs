use clap::Subcommand;
use upkeep_core::SessionContext;
use upkeep_predict::format_date;
use upkeep_store::{InspectionResult, NewInspection, StoreError};

use crate::app::App;
use crate::commands::date_or;
use crate::output::{emit, or_dash, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum InspectionCommand {
    /// Record an inspection
    Add {
        /// Machine id
        #[arg(long)]
        machine: String,
        /// Pass, Fail or "Needs Attention"
        #[arg(long)]
        result: InspectionResult,
        /// Inspection date (default: today)
        #[arg(long)]
        date: Option<String>,
        /// Inspector name (default: the logged-in user)
        #[arg(long)]
        inspector: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List inspections, newest first
    List {
        /// Only this machine
        #[arg(long)]
        machine: Option<String>,
    },
    /// Show one inspection
    Show { id: String },
}

pub(crate) fn run(
    app: &App,
    session: &SessionContext,
    command: InspectionCommand,
) -> anyhow::Result<()> {
    match command {
        InspectionCommand::Add {
            machine,
            result,
            date,
            inspector,
            notes,
        } => {
            let date = date_or(date.as_deref(), app.today)?;
            let inspection = app.store.add_inspection(&NewInspection {
                machine_id: machine,
                inspection_date: format_date(date),
                inspector: inspector.unwrap_or_else(|| session.username.clone()),
                result,
                notes,
            })?;
            emit(app.output, &inspection, |i| {
                println!(
                    "Recorded {} inspection of {} on {}",
                    i.result,
                    i.machine_name.as_deref().unwrap_or(&i.machine_id),
                    i.inspection_date
                )
            })
        }
        InspectionCommand::List { machine } => {
            if let Some(id) = machine.as_deref() {
                app.store.require_machine(id)?;
            }
            let inspections = app.store.list_inspections(machine.as_deref())?;
            emit(app.output, &inspections, |inspections| {
                let rows: Vec<_> = inspections
                    .iter()
                    .map(|i| {
                        vec![
                            i.id.clone(),
                            i.inspection_date.clone(),
                            or_dash(i.machine_name.as_deref()),
                            i.inspector.clone(),
                            i.result.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "DATE", "MACHINE", "INSPECTOR", "RESULT"], &rows);
            })
        }
        InspectionCommand::Show { id } => {
            let inspection = app.store.get_inspection(&id)?.ok_or(StoreError::NotFound {
                kind: "inspection",
                id,
            })?;
            emit(app.output, &inspection, |i| {
                println!("Inspection {}", i.id);
                println!("  machine:   {}", or_dash(i.machine_name.as_deref()));
                println!("  date:      {}", i.inspection_date);
                println!("  inspector: {}", i.inspector);
                println!("  result:    {}", i.result);
                println!("  notes:     {}", or_dash(i.notes.as_deref()));
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upkeep_store::NewMachine;

    #[test]
    fn inspector_defaults_to_session_user() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::app::tests::test_app(&dir);
        let session = app.login(Some("admin"), Some("password")).unwrap();
        let machine = app
            .store
            .add_machine(&NewMachine {
                name: "Pump".into(),
                machine_type: "Type C".into(),
                location: "Basement".into(),
                installation_date: "2022-03-01".into(),
                frequency_days: 90,
            })
            .unwrap();

        run(
            &app,
            &session,
            InspectionCommand::Add {
                machine: machine.id.clone(),
                result: InspectionResult::NeedsAttention,
                date: None,
                inspector: None,
                notes: Some("seal weeping".into()),
            },
        )
        .unwrap();

        let stored = app.store.list_inspections(Some(&machine.id)).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].inspector, "admin");
        assert_eq!(stored[0].inspection_date, "2023-06-15");
    }

    #[test]
    fn show_unknown_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::app::tests::test_app(&dir);
        let session = app.login(Some("admin"), Some("password")).unwrap();
        let err = run(&app, &session, InspectionCommand::Show { id: "x".into() }).unwrap_err();
        assert_eq!(crate::output::error_code(&err), "NOT_FOUND");
    }
}
