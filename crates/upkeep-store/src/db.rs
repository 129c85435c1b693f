use rusqlite::{Connection, Result};

/// Initialise every record-store table. Safe to call on every startup:
/// CREATE IF NOT EXISTS means it's idempotent.
///
/// `work_orders.assigned_to` references the `users` table owned by
/// `upkeep-users`; SQLite resolves the reference lazily, so the order in
/// which the two schemas are created does not matter.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_machines_tables(conn)?;
    create_calendar_table(conn)?;
    create_inspections_table(conn)?;
    create_resources_table(conn)?;
    create_work_orders_table(conn)?;
    create_inventory_table(conn)?;
    Ok(())
}

fn create_machines_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS machines (
            id                      TEXT PRIMARY KEY NOT NULL,
            name                    TEXT NOT NULL,
            type                    TEXT NOT NULL,
            location                TEXT NOT NULL,
            installation_date       TEXT NOT NULL,   -- YYYY-MM-DD
            maintenance_frequency   INTEGER NOT NULL,
            last_maintenance_date   TEXT,            -- YYYY-MM-DD or NULL
            status                  TEXT NOT NULL DEFAULT 'Healthy',
            created_at              TEXT NOT NULL,
            updated_at              TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS maintenance_history (
            id                  TEXT PRIMARY KEY NOT NULL,
            machine_id          TEXT NOT NULL REFERENCES machines(id) ON DELETE CASCADE,
            maintenance_date    TEXT NOT NULL,
            description         TEXT NOT NULL,
            created_at          TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_history_machine
            ON maintenance_history (machine_id, maintenance_date);",
    )
}

fn create_calendar_table(conn: &Connection) -> Result<()> {
    // Date-times are stored as 'YYYY-MM-DD HH:MM:SS' so range filters can
    // compare the text directly.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS calendar_events (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            start_date  TEXT NOT NULL,
            end_date    TEXT NOT NULL,
            description TEXT,
            event_type  TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_calendar_start
            ON calendar_events (start_date);",
    )
}

fn create_inspections_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS inspections (
            id              TEXT PRIMARY KEY NOT NULL,
            machine_id      TEXT NOT NULL REFERENCES machines(id) ON DELETE CASCADE,
            inspection_date TEXT NOT NULL,
            inspector       TEXT NOT NULL,
            result          TEXT NOT NULL,
            notes           TEXT,
            created_at      TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_inspections_machine
            ON inspections (machine_id);",
    )
}

fn create_resources_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS resources (
            id          TEXT PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            type        TEXT NOT NULL,
            status      TEXT NOT NULL,
            location    TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );",
    )
}

fn create_work_orders_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS work_orders (
            id          TEXT PRIMARY KEY NOT NULL,
            title       TEXT NOT NULL,
            description TEXT,
            status      TEXT NOT NULL,
            priority    TEXT NOT NULL,
            assigned_to TEXT REFERENCES users(id) ON DELETE SET NULL,
            due_date    TEXT,            -- YYYY-MM-DD or NULL
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL
        );",
    )
}

fn create_inventory_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS inventory (
            id              TEXT PRIMARY KEY NOT NULL,
            item_name       TEXT NOT NULL,
            quantity        INTEGER NOT NULL,
            unit            TEXT NOT NULL,
            reorder_level   INTEGER NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );",
    )
}
