use clap::Subcommand;
use serde::Serialize;
use tracing::warn;
use upkeep_core::MachineStatus;
use upkeep_predict::{format_date, RemainingLife, RngWear, StatusPrediction, WearSource};
use upkeep_store::{Machine, MachineUpdate, NewMachine};

use crate::app::App;
use crate::commands::date_or;
use crate::output::{emit, or_dash, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum MachineCommand {
    /// Register a machine
    Add {
        #[arg(long)]
        name: String,
        /// Machine type, e.g. "Type A"
        #[arg(long = "type")]
        machine_type: String,
        #[arg(long)]
        location: String,
        /// Installation date (YYYY-MM-DD)
        #[arg(long)]
        installed: String,
        /// Days between services (1-365)
        #[arg(long)]
        frequency: i64,
    },
    /// List all machines
    List,
    /// Show one machine with its schedule
    Show { id: String },
    /// Edit machine fields
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        machine_type: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        installed: Option<String>,
        #[arg(long)]
        frequency: Option<i64>,
        #[arg(long)]
        status: Option<MachineStatus>,
    },
    /// Set the health status (Healthy, Warning, Critical)
    Status { id: String, status: MachineStatus },
    /// Record a completed service
    Log {
        id: String,
        #[arg(long)]
        description: String,
        /// Service date (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Service history, newest first
    History { id: String },
    /// Advisory status and remaining-life estimate (all machines if no id)
    Predict { id: Option<String> },
}

#[derive(Debug, Serialize)]
struct MachineDetail {
    #[serde(flatten)]
    machine: Machine,
    next_maintenance_date: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PredictionReport {
    machine_id: String,
    name: String,
    next_maintenance_date: String,
    status: StatusPrediction,
    remaining_life: RemainingLife,
}

pub(crate) fn run(app: &App, command: MachineCommand) -> anyhow::Result<()> {
    match command {
        MachineCommand::Add {
            name,
            machine_type,
            location,
            installed,
            frequency,
        } => {
            let machine = app.store.add_machine(&NewMachine {
                name,
                machine_type,
                location,
                installation_date: installed,
                frequency_days: frequency,
            })?;
            emit(app.output, &machine, |m| println!("Added {} ({})", m.name, m.id))
        }
        MachineCommand::List => {
            let machines = app.store.list_machines()?;
            emit(app.output, &machines, |machines| {
                let rows: Vec<_> = machines
                    .iter()
                    .map(|m| {
                        vec![
                            m.id.clone(),
                            m.name.clone(),
                            m.machine_type.clone(),
                            m.location.clone(),
                            m.status.to_string(),
                            or_dash(m.last_maintenance_date.as_deref()),
                        ]
                    })
                    .collect();
                print_table(
                    &["ID", "NAME", "TYPE", "LOCATION", "STATUS", "LAST SERVICE"],
                    &rows,
                );
            })
        }
        MachineCommand::Show { id } => {
            let machine = app.store.require_machine(&id)?;
            let next = machine.maintenance_input()?.next_maintenance_date();
            let detail = MachineDetail {
                machine,
                next_maintenance_date: format_date(next),
            };
            emit(app.output, &detail, |d| {
                let m = &d.machine;
                println!("{} ({})", m.name, m.id);
                println!("  type:          {}", m.machine_type);
                println!("  location:      {}", m.location);
                println!("  status:        {}", m.status);
                println!("  installed:     {}", m.installation_date);
                println!("  frequency:     every {} days", m.frequency_days);
                println!("  last service:  {}", or_dash(m.last_maintenance_date.as_deref()));
                println!("  next service:  {}", d.next_maintenance_date);
            })
        }
        MachineCommand::Edit {
            id,
            name,
            machine_type,
            location,
            installed,
            frequency,
            status,
        } => {
            let machine = app.store.update_machine(
                &id,
                &MachineUpdate {
                    name,
                    machine_type,
                    location,
                    installation_date: installed,
                    frequency_days: frequency,
                    status,
                },
            )?;
            emit(app.output, &machine, |m| println!("Updated {} ({})", m.name, m.id))
        }
        MachineCommand::Status { id, status } => {
            app.store.update_machine_status(&id, status)?;
            emit(
                app.output,
                &serde_json::json!({ "id": id, "status": status }),
                |_| println!("{id} is now {status}"),
            )
        }
        MachineCommand::Log {
            id,
            description,
            date,
        } => {
            let date = format_date(date_or(date.as_deref(), app.today)?);
            let record = app.store.log_maintenance(&id, &date, &description)?;
            emit(app.output, &record, |r| {
                println!("Logged service on {} for {}", r.maintenance_date, r.machine_id)
            })
        }
        MachineCommand::History { id } => {
            app.store.require_machine(&id)?;
            let history = app.store.maintenance_history(&id)?;
            emit(app.output, &history, |history| {
                let rows: Vec<_> = history
                    .iter()
                    .map(|r| vec![r.maintenance_date.clone(), r.description.clone()])
                    .collect();
                print_table(&["DATE", "DESCRIPTION"], &rows);
            })
        }
        MachineCommand::Predict { id } => {
            let mut wear = RngWear::thread();
            let reports = match id {
                Some(id) => {
                    let machine = app.store.require_machine(&id)?;
                    vec![predict(&machine, app.today, &mut wear)?]
                }
                None => app
                    .store
                    .list_machines()?
                    .iter()
                    .filter_map(|m| match predict(m, app.today, &mut wear) {
                        Ok(report) => Some(report),
                        Err(e) => {
                            warn!(machine_id = %m.id, error = %e, "skipping prediction");
                            None
                        }
                    })
                    .collect(),
            };
            emit(app.output, &reports, |reports| {
                let rows: Vec<_> = reports
                    .iter()
                    .map(|r| {
                        vec![
                            r.name.clone(),
                            r.next_maintenance_date.clone(),
                            r.status.to_string(),
                            r.remaining_life.to_string(),
                        ]
                    })
                    .collect();
                print_table(&["NAME", "NEXT SERVICE", "STATUS", "REMAINING LIFE"], &rows);
            })
        }
    }
}

/// Both predictions for one machine. Each draws its own wear factor from
/// `wear`. The stored machine status is left untouched.
pub(crate) fn predict(
    machine: &Machine,
    today: chrono::NaiveDate,
    mut wear: impl WearSource,
) -> upkeep_predict::Result<PredictionReport> {
    let input = machine.maintenance_input()?;
    Ok(PredictionReport {
        machine_id: machine.id.clone(),
        name: machine.name.clone(),
        next_maintenance_date: format_date(input.next_maintenance_date()),
        status: input.predict_status(today, &mut wear),
        remaining_life: input.estimate_remaining_life(today, &mut wear),
    })
}
