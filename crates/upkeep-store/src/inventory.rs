use rusqlite::params;
use tracing::{info, warn};
use upkeep_core::types::new_record_id;

use crate::error::{Result, StoreError};
use crate::store::{now_rfc3339, require_text, RecordStore};
use crate::types::{InventoryItem, InventoryUpdate, NewInventoryItem};

const ITEM_COLUMNS: &str = "id, item_name, quantity, unit, reorder_level, created_at, updated_at";

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<InventoryItem> {
    Ok(InventoryItem {
        id: row.get(0)?,
        item_name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        reorder_level: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

fn non_negative(field: &'static str, value: i64) -> Result<i64> {
    if value < 0 {
        return Err(StoreError::invalid(field, format!("{value} is negative")));
    }
    Ok(value)
}

impl RecordStore {
    pub fn add_item(&self, new: &NewInventoryItem) -> Result<InventoryItem> {
        let now = now_rfc3339();
        let item = InventoryItem {
            id: new_record_id(),
            item_name: require_text("item_name", &new.item_name)?,
            quantity: non_negative("quantity", new.quantity)?,
            unit: require_text("unit", &new.unit)?,
            reorder_level: non_negative("reorder_level", new.reorder_level)?,
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn.execute(
            "INSERT INTO inventory (id, item_name, quantity, unit, reorder_level, created_at, updated_at)
             VALUES (?1,?2,?3,?4,?5,?6,?6)",
            params![
                item.id,
                item.item_name,
                item.quantity,
                item.unit,
                item.reorder_level,
                item.created_at
            ],
        )?;
        info!(item_id = %item.id, quantity = item.quantity, "inventory item added");
        if item.needs_reorder() {
            warn!(item = %item.item_name, quantity = item.quantity, "stock at or below reorder level");
        }
        Ok(item)
    }

    pub fn list_items(&self) -> Result<Vec<InventoryItem>> {
        self.query_items(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory ORDER BY item_name COLLATE NOCASE, id"
        ))
    }

    /// Items whose quantity is at or below their reorder level.
    pub fn low_stock(&self) -> Result<Vec<InventoryItem>> {
        self.query_items(&format!(
            "SELECT {ITEM_COLUMNS} FROM inventory
             WHERE quantity <= reorder_level
             ORDER BY quantity - reorder_level, item_name COLLATE NOCASE"
        ))
    }

    pub fn update_item(&self, id: &str, update: &InventoryUpdate) -> Result<InventoryItem> {
        let mut item = match self.conn.query_row(
            &format!("SELECT {ITEM_COLUMNS} FROM inventory WHERE id = ?1"),
            [id],
            row_to_item,
        ) {
            Ok(i) => i,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StoreError::not_found("inventory item", id))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(name) = &update.item_name {
            item.item_name = require_text("item_name", name)?;
        }
        if let Some(quantity) = update.quantity {
            item.quantity = non_negative("quantity", quantity)?;
        }
        if let Some(unit) = &update.unit {
            item.unit = require_text("unit", unit)?;
        }
        if let Some(level) = update.reorder_level {
            item.reorder_level = non_negative("reorder_level", level)?;
        }
        item.updated_at = now_rfc3339();

        self.conn.execute(
            "UPDATE inventory SET item_name=?2, quantity=?3, unit=?4, reorder_level=?5, updated_at=?6
             WHERE id=?1",
            params![
                item.id,
                item.item_name,
                item.quantity,
                item.unit,
                item.reorder_level,
                item.updated_at
            ],
        )?;
        info!(item_id = %item.id, quantity = item.quantity, "inventory item updated");
        Ok(item)
    }

    fn query_items(&self, sql: &str) -> Result<Vec<InventoryItem>> {
        let mut stmt = self.conn.prepare(sql)?;
        let items = stmt
            .query_map([], row_to_item)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn store() -> RecordStore {
        RecordStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    fn item(name: &str, quantity: i64, reorder_level: i64) -> NewInventoryItem {
        NewInventoryItem {
            item_name: name.into(),
            quantity,
            unit: "pcs".into(),
            reorder_level,
        }
    }

    #[test]
    fn low_stock_includes_items_at_the_threshold() {
        let store = store();
        store.add_item(&item("Bearing", 10, 4)).unwrap();
        store.add_item(&item("Belt", 4, 4)).unwrap();
        store.add_item(&item("Fuse", 0, 5)).unwrap();

        let low: Vec<_> = store
            .low_stock()
            .unwrap()
            .into_iter()
            .map(|i| i.item_name)
            .collect();
        assert_eq!(low, vec!["Fuse", "Belt"]);
        assert_eq!(store.list_items().unwrap().len(), 3);
    }

    #[test]
    fn negative_quantities_are_rejected() {
        let store = store();
        let err = store.add_item(&item("Oil", -1, 2)).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "quantity", .. }));

        let added = store.add_item(&item("Oil", 3, 2)).unwrap();
        let err = store
            .update_item(
                &added.id,
                &InventoryUpdate {
                    reorder_level: Some(-5),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidField { field: "reorder_level", .. }));
    }

    #[test]
    fn restocking_clears_low_stock() {
        let store = store();
        let belt = store.add_item(&item("Belt", 1, 2)).unwrap();
        assert_eq!(store.low_stock().unwrap().len(), 1);

        let updated = store
            .update_item(
                &belt.id,
                &InventoryUpdate {
                    quantity: Some(20),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.quantity, 20);
        assert_eq!(updated.unit, "pcs");
        assert!(store.low_stock().unwrap().is_empty());
    }

    #[test]
    fn update_missing_item_is_not_found() {
        let err = store()
            .update_item("none", &InventoryUpdate::default())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
