use rusqlite::{Connection, Result};
use upkeep_core::Role;

use crate::types::User;

/// Column list shared by every account query so `row_to_user` stays in sync.
pub(crate) const USER_COLUMNS: &str =
    "id, username, role, is_validated, created_at, updated_at";

/// Map a SELECT row (column order from USER_COLUMNS) to a User.
pub(crate) fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    use std::str::FromStr;
    let role = Role::from_str(&row.get::<_, String>(2)?).unwrap_or_default();
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        role,
        is_validated: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Initialise the accounts table. Safe to call on every startup:
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    // UNIQUE(username) is what turns a duplicate registration into a
    // constraint violation instead of a second row.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY NOT NULL,
            username        TEXT NOT NULL UNIQUE,
            password_hash   TEXT NOT NULL,   -- hex SHA-256
            role            TEXT NOT NULL DEFAULT 'User',
            is_validated    INTEGER NOT NULL DEFAULT 0,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );",
    )
}
