use clap::Subcommand;
use upkeep_store::{InventoryItem, InventoryUpdate, NewInventoryItem};

use crate::app::App;
use crate::output::{emit, print_table};

#[derive(Debug, Subcommand)]
pub(crate) enum InventoryCommand {
    /// Add a stock item
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: i64,
        /// Unit of measure, e.g. pcs or litres
        #[arg(long, default_value = "pcs")]
        unit: String,
        /// Reorder when quantity falls to this level
        #[arg(long)]
        reorder_level: i64,
    },
    /// List all items
    List,
    /// Edit an item
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<i64>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        reorder_level: Option<i64>,
    },
    /// Items at or below their reorder level
    Low,
}

pub(crate) fn run(app: &App, command: InventoryCommand) -> anyhow::Result<()> {
    match command {
        InventoryCommand::Add {
            name,
            quantity,
            unit,
            reorder_level,
        } => {
            let item = app.store.add_item(&NewInventoryItem {
                item_name: name,
                quantity,
                unit,
                reorder_level,
            })?;
            emit(app.output, &item, |i| {
                println!("Added {} {} of {} ({})", i.quantity, i.unit, i.item_name, i.id)
            })
        }
        InventoryCommand::List => {
            let items = app.store.list_items()?;
            emit(app.output, &items, |items| print_items(items))
        }
        InventoryCommand::Edit {
            id,
            name,
            quantity,
            unit,
            reorder_level,
        } => {
            let item = app.store.update_item(
                &id,
                &InventoryUpdate {
                    item_name: name,
                    quantity,
                    unit,
                    reorder_level,
                },
            )?;
            emit(app.output, &item, |i| {
                println!("{}: {} {}", i.item_name, i.quantity, i.unit);
                if i.needs_reorder() {
                    println!("Stock is at or below the reorder level ({}).", i.reorder_level);
                }
            })
        }
        InventoryCommand::Low => {
            let items = app.store.low_stock()?;
            emit(app.output, &items, |items| print_items(items))
        }
    }
}

pub(crate) fn print_items(items: &[InventoryItem]) {
    let rows: Vec<_> = items
        .iter()
        .map(|i| {
            vec![
                i.id.clone(),
                i.item_name.clone(),
                format!("{} {}", i.quantity, i.unit),
                i.reorder_level.to_string(),
                if i.needs_reorder() { "REORDER" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["ID", "ITEM", "QUANTITY", "REORDER AT", ""], &rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_quantity_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::app::tests::test_app(&dir);
        let err = run(
            &app,
            InventoryCommand::Add {
                name: "Grease".into(),
                quantity: -2,
                unit: "kg".into(),
                reorder_level: 1,
            },
        )
        .unwrap_err();
        assert_eq!(crate::output::error_code(&err), "INVALID_INPUT");
    }

    #[test]
    fn low_lists_only_items_to_reorder() {
        let dir = tempfile::tempdir().unwrap();
        let app = crate::app::tests::test_app(&dir);
        for (name, quantity) in [("Fuse", 1), ("Bolt", 50)] {
            run(
                &app,
                InventoryCommand::Add {
                    name: name.into(),
                    quantity,
                    unit: "pcs".into(),
                    reorder_level: 5,
                },
            )
            .unwrap();
        }
        run(&app, InventoryCommand::Low).unwrap();
        let low = app.store.low_stock().unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].item_name, "Fuse");
    }
}
