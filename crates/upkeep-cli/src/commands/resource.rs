use clap::Subcommand;
use upkeep_store::{NewResource, ResourceKind, ResourceStatus, ResourceUpdate};

use crate::app::App;
use crate::output::{emit, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum ResourceCommand {
    /// Add a resource
    Add {
        #[arg(long)]
        name: String,
        /// Equipment, Tool, Vehicle or Other
        #[arg(long = "type")]
        kind: ResourceKind,
        /// Available, "In Use", Maintenance or "Out of Service"
        #[arg(long, default_value = "Available")]
        status: ResourceStatus,
        #[arg(long)]
        location: String,
    },
    /// List resources
    List,
    /// Edit a resource
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "type")]
        kind: Option<ResourceKind>,
        #[arg(long)]
        status: Option<ResourceStatus>,
        #[arg(long)]
        location: Option<String>,
    },
}

pub(crate) fn run(app: &App, command: ResourceCommand) -> anyhow::Result<()> {
    match command {
        ResourceCommand::Add {
            name,
            kind,
            status,
            location,
        } => {
            let resource = app.store.add_resource(&NewResource {
                name,
                kind,
                status,
                location,
            })?;
            emit(app.output, &resource, |r| {
                println!("Added {} {} ({})", r.kind, r.name, r.id)
            })
        }
        ResourceCommand::List => {
            let resources = app.store.list_resources()?;
            emit(app.output, &resources, |resources| {
                let rows: Vec<_> = resources
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.clone(),
                            r.name.clone(),
                            r.kind.to_string(),
                            r.status.to_string(),
                            r.location.clone(),
                        ]
                    })
                    .collect();
                print_table(&["ID", "NAME", "TYPE", "STATUS", "LOCATION"], &rows);
            })
        }
        ResourceCommand::Edit {
            id,
            name,
            kind,
            status,
            location,
        } => {
            let resource = app.store.update_resource(
                &id,
                &ResourceUpdate {
                    name,
                    kind,
                    status,
                    location,
                },
            )?;
            emit(app.output, &resource, |r| {
                println!("Updated {} ({}): {}", r.name, r.id, r.status)
            })
        }
    }
}
