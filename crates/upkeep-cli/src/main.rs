use std::process;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::warn;
use upkeep_core::{SessionContext, UpkeepConfig};

mod app;
mod commands;
mod output;

use app::App;
use commands::{
    account::UserCommand, calendar::CalendarCommand, inspection::InspectionCommand,
    inventory::InventoryCommand, machine::MachineCommand, resource::ResourceCommand,
    work_order::WorkOrderCommand,
};
use output::OutputFormat;

/// Equipment maintenance tracking and prediction.
#[derive(Parser)]
#[command(name = "upkeep", version, about = "Equipment maintenance tracking and prediction")]
struct Cli {
    /// Config file (default: ~/.upkeep/upkeep.toml)
    #[arg(long, global = true, env = "UPKEEP_CONFIG")]
    config: Option<String>,

    /// SQLite database file, overriding the config
    #[arg(long, global = true)]
    db: Option<String>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Username to log in with
    #[arg(long, global = true, env = "UPKEEP_USER")]
    user: Option<String>,

    /// Password to log in with
    #[arg(long, global = true, env = "UPKEEP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and the seed Super Admin account
    Init,

    /// Check credentials and show the resulting session
    Login,

    /// Machine counts, upcoming maintenance, stock alerts and open work
    Dashboard,

    /// Machines, their service log and predictions
    Machine {
        #[command(subcommand)]
        command: MachineCommand,
    },

    /// Account management (Super Admin only)
    User {
        #[command(subcommand)]
        command: UserCommand,
    },

    /// Scheduled events
    Calendar {
        #[command(subcommand)]
        command: CalendarCommand,
    },

    /// Machine inspections
    Inspection {
        #[command(subcommand)]
        command: InspectionCommand,
    },

    /// Equipment, tools and vehicles
    Resource {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Work orders
    WorkOrder {
        #[command(subcommand)]
        command: WorkOrderCommand,
    },

    /// Spare parts and consumables
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
}

fn main() {
    let cli = Cli::parse();

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "upkeep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let format = cli.output;
    if let Err(e) = run(cli) {
        output::report_error(&e, format);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = UpkeepConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!("Config load failed ({}), using defaults", e);
        UpkeepConfig::default()
    });
    if let Some(db) = cli.db {
        config.database.path = db;
    }
    let today = cli
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let app = App::open(config, cli.output, today)?;

    match cli.command {
        Commands::Init => commands::account::init(&app),
        command => {
            let session = app.login(cli.user.as_deref(), cli.password.as_deref())?;
            dispatch(&app, &session, command)
        }
    }
}

fn dispatch(app: &App, session: &SessionContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => commands::account::init(app),
        Commands::Login => commands::account::login(app, session),
        Commands::Dashboard => commands::dashboard::show(app),
        Commands::Machine { command } => commands::machine::run(app, command),
        Commands::User { command } => commands::account::run(app, session, command),
        Commands::Calendar { command } => commands::calendar::run(app, command),
        Commands::Inspection { command } => commands::inspection::run(app, session, command),
        Commands::Resource { command } => commands::resource::run(app, command),
        Commands::WorkOrder { command } => commands::work_order::run(app, command),
        Commands::Inventory { command } => commands::inventory::run(app, command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "upkeep",
            "machine",
            "predict",
            "--today",
            "2023-06-15",
            "--output",
            "json",
            "--user",
            "admin",
            "--password",
            "password",
        ])
        .unwrap();
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2023, 6, 15));
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.user.as_deref(), Some("admin"));
        assert!(matches!(
            cli.command,
            Commands::Machine {
                command: MachineCommand::Predict { .. }
            }
        ));
    }

    #[test]
    fn bad_today_is_a_usage_error() {
        assert!(Cli::try_parse_from(["upkeep", "--today", "15/06/2023", "dashboard"]).is_err());
    }
}
