use std::collections::HashMap;

use clap::Subcommand;
use serde::Serialize;
use upkeep_store::{NewWorkOrder, Priority, WorkOrder, WorkOrderStatus, WorkOrderUpdate};

use crate::app::App;
use crate::commands::account::resolve_user;
use crate::output::{emit, or_dash, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum WorkOrderCommand {
    /// Open a work order
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Low, Medium, High or Critical
        #[arg(long, default_value = "Medium")]
        priority: Priority,
        /// Open, "In Progress", Completed or "On Hold"
        #[arg(long, default_value = "Open")]
        status: WorkOrderStatus,
        /// Username or user id of the assignee
        #[arg(long)]
        assignee: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// List work orders by due date
    List,
    /// Edit a work order
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        status: Option<WorkOrderStatus>,
        #[arg(long, conflicts_with = "unassign")]
        assignee: Option<String>,
        /// Remove the assignee
        #[arg(long)]
        unassign: bool,
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
}

/// A work order with its assignee's username resolved for display.
#[derive(Debug, Serialize)]
struct WorkOrderView {
    #[serde(flatten)]
    order: WorkOrder,
    assignee: Option<String>,
}

pub(crate) fn run(app: &App, command: WorkOrderCommand) -> anyhow::Result<()> {
    match command {
        WorkOrderCommand::Add {
            title,
            description,
            priority,
            status,
            assignee,
            due,
        } => {
            let assigned_to = assignee
                .map(|a| resolve_user(app, &a).map(|u| u.id))
                .transpose()?;
            let order = app.store.add_work_order(&NewWorkOrder {
                title,
                description,
                status,
                priority,
                assigned_to,
                due_date: due,
            })?;
            emit(app.output, &order, |o| {
                println!("Opened {} ({}) with {} priority", o.title, o.id, o.priority)
            })
        }
        WorkOrderCommand::List => {
            let names: HashMap<String, String> = app
                .users
                .list_users()?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect();
            let views: Vec<_> = app
                .store
                .list_work_orders()?
                .into_iter()
                .map(|order| WorkOrderView {
                    assignee: order
                        .assigned_to
                        .as_ref()
                        .and_then(|id| names.get(id).cloned()),
                    order,
                })
                .collect();
            emit(app.output, &views, |views| {
                let rows: Vec<_> = views
                    .iter()
                    .map(|v| {
                        vec![
                            v.order.id.clone(),
                            v.order.title.clone(),
                            v.order.priority.to_string(),
                            v.order.status.to_string(),
                            or_dash(v.assignee.as_deref()),
                            or_dash(v.order.due_date.as_deref()),
                        ]
                    })
                    .collect();
                print_table(
                    &["ID", "TITLE", "PRIORITY", "STATUS", "ASSIGNEE", "DUE"],
                    &rows,
                );
            })
        }
        WorkOrderCommand::Edit {
            id,
            title,
            description,
            priority,
            status,
            assignee,
            unassign,
            due,
            clear_due,
        } => {
            let assigned_to = if unassign {
                Some(None)
            } else {
                assignee
                    .map(|a| resolve_user(app, &a).map(|u| Some(u.id)))
                    .transpose()?
            };
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let order = app.store.update_work_order(
                &id,
                &WorkOrderUpdate {
                    title,
                    description: description.map(Some),
                    status,
                    priority,
                    assigned_to,
                    due_date,
                },
            )?;
            emit(app.output, &order, |o| {
                println!("Updated {} ({}): {}", o.title, o.id, o.status)
            })
        }
    }
}
