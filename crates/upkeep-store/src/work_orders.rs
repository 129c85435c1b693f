use rusqlite::{params, ErrorCode};
use tracing::info;
use upkeep_core::types::new_record_id;
use upkeep_predict::format_date;

use crate::error::{Result, StoreError};
use crate::store::{
    now_rfc3339, optional_text, require_date, require_text, stored_label, RecordStore,
};
use crate::types::{NewWorkOrder, Priority, WorkOrder, WorkOrderStatus, WorkOrderUpdate};

const WORK_ORDER_COLUMNS: &str =
    "id, title, description, status, priority, assigned_to, due_date, created_at, updated_at";

fn row_to_work_order(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkOrder> {
    let id: String = row.get(0)?;
    let status = stored_label("work_orders", "status", &id, &row.get::<_, String>(3)?);
    let priority = stored_label("work_orders", "priority", &id, &row.get::<_, String>(4)?);
    Ok(WorkOrder {
        id,
        title: row.get(1)?,
        description: row.get(2)?,
        status,
        priority,
        assigned_to: row.get(5)?,
        due_date: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn normalise_due_date(value: Option<&str>) -> Result<Option<String>> {
    match optional_text(value) {
        Some(v) => Ok(Some(format_date(require_date("due_date", &v)?))),
        None => Ok(None),
    }
}

/// A foreign-key failure on insert/update means the assignee id is unknown.
fn map_assignee_error(err: rusqlite::Error, assignee: Option<&str>) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            StoreError::invalid(
                "assigned_to",
                format!("no user with id {}", assignee.unwrap_or("?")),
            )
        }
        _ => err.into(),
    }
}

impl RecordStore {
    pub fn add_work_order(&self, new: &NewWorkOrder) -> Result<WorkOrder> {
        let now = now_rfc3339();
        let order = WorkOrder {
            id: new_record_id(),
            title: require_text("title", &new.title)?,
            description: optional_text(new.description.as_deref()),
            status: new.status,
            priority: new.priority,
            assigned_to: optional_text(new.assigned_to.as_deref()),
            due_date: normalise_due_date(new.due_date.as_deref())?,
            created_at: now.clone(),
            updated_at: now,
        };
        self.conn
            .execute(
                "INSERT INTO work_orders
                    (id, title, description, status, priority, assigned_to, due_date, created_at, updated_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?8)",
                params![
                    order.id,
                    order.title,
                    order.description,
                    order.status.as_str(),
                    order.priority.as_str(),
                    order.assigned_to,
                    order.due_date,
                    order.created_at
                ],
            )
            .map_err(|e| map_assignee_error(e, order.assigned_to.as_deref()))?;
        info!(
            work_order_id = %order.id,
            priority = %order.priority,
            "work order created"
        );
        Ok(order)
    }

    /// Work orders by due date (undated last), then priority, highest first.
    pub fn list_work_orders(&self) -> Result<Vec<WorkOrder>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {WORK_ORDER_COLUMNS} FROM work_orders
             ORDER BY due_date IS NULL, due_date, created_at"
        ))?;
        let mut orders = stmt
            .query_map([], row_to_work_order)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        // Stable sort, so ties stay in creation order.
        orders.sort_by(|a, b| {
            a.due_date
                .is_none()
                .cmp(&b.due_date.is_none())
                .then_with(|| a.due_date.cmp(&b.due_date))
                .then_with(|| b.priority.cmp(&a.priority))
        });
        Ok(orders)
    }

    /// Number of orders not yet completed.
    pub fn open_work_order_count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM work_orders WHERE status != ?1",
            [WorkOrderStatus::Completed.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn update_work_order(&self, id: &str, update: &WorkOrderUpdate) -> Result<WorkOrder> {
        let mut order = match self.conn.query_row(
            &format!("SELECT {WORK_ORDER_COLUMNS} FROM work_orders WHERE id = ?1"),
            [id],
            row_to_work_order,
        ) {
            Ok(o) => o,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(StoreError::not_found("work order", id))
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(title) = &update.title {
            order.title = require_text("title", title)?;
        }
        if let Some(description) = &update.description {
            order.description = optional_text(description.as_deref());
        }
        if let Some(status) = update.status {
            order.status = status;
        }
        if let Some(priority) = update.priority {
            order.priority = priority;
        }
        if let Some(assignee) = &update.assigned_to {
            order.assigned_to = optional_text(assignee.as_deref());
        }
        if let Some(due) = &update.due_date {
            order.due_date = normalise_due_date(due.as_deref())?;
        }
        order.updated_at = now_rfc3339();

        self.conn
            .execute(
                "UPDATE work_orders SET title=?2, description=?3, status=?4, priority=?5,
                    assigned_to=?6, due_date=?7, updated_at=?8
                 WHERE id=?1",
                params![
                    order.id,
                    order.title,
                    order.description,
                    order.status.as_str(),
                    order.priority.as_str(),
                    order.assigned_to,
                    order.due_date,
                    order.updated_at
                ],
            )
            .map_err(|e| map_assignee_error(e, order.assigned_to.as_deref()))?;
        info!(work_order_id = %order.id, status = %order.status, "work order updated");
        Ok(order)
    }
}
