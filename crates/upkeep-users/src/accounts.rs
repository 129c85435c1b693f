use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use tracing::{debug, info, instrument, warn};
use upkeep_core::types::new_record_id;
use upkeep_core::{Role, SessionContext};

use crate::db::{init_db, row_to_user, USER_COLUMNS};
use crate::error::{Result, UserError};
use crate::password::{hash_password, verify_password};
use crate::types::User;

/// Account store over its own SQLite connection.
pub struct UserDirectory {
    conn: Connection,
}

impl UserDirectory {
    /// Wrap `conn`, creating the `users` table if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self { conn })
    }

    /// Register a new, unvalidated account.
    ///
    /// Returns `AlreadyExists` when the username is taken.
    #[instrument(skip(self, password))]
    pub fn add_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(UserError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let now = Utc::now().to_rfc3339();
        let user = User {
            id: new_record_id(),
            username: username.to_string(),
            role,
            is_validated: false,
            created_at: now.clone(),
            updated_at: now,
        };

        let inserted = self.conn.execute(
            "INSERT INTO users (id, username, password_hash, role, is_validated, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
            params![
                user.id,
                user.username,
                hash_password(password),
                user.role.as_str(),
                user.created_at
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(UserError::AlreadyExists(user.username));
            }
            Err(e) => return Err(e.into()),
        }

        info!(user_id = %user.id, username = %user.username, "user added");
        Ok(user)
    }

    /// Mark an account as validated so it can log in.
    pub fn validate_user(&self, user_id: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let n = self.conn.execute(
            "UPDATE users SET is_validated = 1, updated_at = ?2 WHERE id = ?1",
            params![user_id, now],
        )?;
        if n == 0 {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        info!(user_id, "user validated");
        Ok(())
    }

    /// Check credentials. Only validated accounts with a matching password
    /// get a session; everything else is `None`.
    #[instrument(skip(self, password))]
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<SessionContext>> {
        let row = self.conn.query_row(
            &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?1"),
            params![username.trim()],
            |row| Ok((row_to_user(row)?, row.get::<_, String>(6)?)),
        );
        let (user, stored_hash) = match row {
            Ok(found) => found,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!("unknown username");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        if !verify_password(password, &stored_hash) {
            warn!(user_id = %user.id, "password mismatch");
            return Ok(None);
        }
        if !user.is_validated {
            warn!(user_id = %user.id, "login refused: account not validated");
            return Ok(None);
        }
        info!(user_id = %user.id, "login succeeded");
        Ok(Some(user.session()))
    }

    /// All accounts, oldest first.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"))?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Load an account by id. Returns None instead of an error when absent
    /// so callers decide whether missing is exceptional in their context.
    pub fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.query_one(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"), user_id)
    }

    pub fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.query_one(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            username.trim(),
        )
    }

    /// Permanently delete an account. Work orders assigned to it become
    /// unassigned through the foreign key's ON DELETE SET NULL.
    pub fn delete_user(&self, user_id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
        if n == 0 {
            return Err(UserError::NotFound(user_id.to_string()));
        }
        info!(user_id, "user deleted");
        Ok(())
    }

    /// Create and validate the seed Super Admin unless an account with that
    /// username already exists. Returns true when an account was created.
    pub fn ensure_bootstrap_admin(&self, username: &str, password: &str) -> Result<bool> {
        if self.find_by_username(username)?.is_some() {
            debug!(username, "bootstrap admin already present");
            return Ok(false);
        }
        let user = self.add_user(username, password, Role::SuperAdmin)?;
        self.validate_user(&user.id)?;
        info!(user_id = %user.id, "bootstrap admin created");
        Ok(true)
    }

    fn query_one(&self, sql: &str, key: &str) -> Result<Option<User>> {
        match self.conn.query_row(sql, params![key], row_to_user) {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(UserError::DatabaseError(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn new_accounts_cannot_log_in_until_validated() {
        let dir = directory();
        let user = dir.add_user("maria", "s3cret", Role::User).unwrap();
        assert!(!user.is_validated);
        assert!(dir.authenticate("maria", "s3cret").unwrap().is_none());

        dir.validate_user(&user.id).unwrap();
        let session = dir.authenticate("maria", "s3cret").unwrap().unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(session.role, Role::User);
    }

    #[test]
    fn wrong_password_and_unknown_user_fail_quietly() {
        let dir = directory();
        let user = dir.add_user("maria", "s3cret", Role::Admin).unwrap();
        dir.validate_user(&user.id).unwrap();
        assert!(dir.authenticate("maria", "guess").unwrap().is_none());
        assert!(dir.authenticate("nobody", "s3cret").unwrap().is_none());
    }

    #[test]
    fn duplicate_username_is_rejected() {
        let dir = directory();
        dir.add_user("maria", "a", Role::User).unwrap();
        let err = dir.add_user("maria", "b", Role::Admin).unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists(name) if name == "maria"));
        assert_eq!(dir.list_users().unwrap().len(), 1);
    }

    #[test]
    fn empty_credentials_are_rejected() {
        let dir = directory();
        assert!(matches!(
            dir.add_user("  ", "pw", Role::User),
            Err(UserError::InvalidInput(_))
        ));
        assert!(matches!(
            dir.add_user("maria", "", Role::User),
            Err(UserError::InvalidInput(_))
        ));
    }

    #[test]
    fn list_and_delete() {
        let dir = directory();
        let a = dir.add_user("a", "pw", Role::User).unwrap();
        let b = dir.add_user("b", "pw", Role::Admin).unwrap();
        let names: Vec<_> = dir.list_users().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["a", "b"]);

        dir.delete_user(&a.id).unwrap();
        assert!(dir.get_user(&a.id).unwrap().is_none());
        assert_eq!(dir.get_user(&b.id).unwrap().unwrap().role, Role::Admin);
        assert!(matches!(dir.delete_user(&a.id), Err(UserError::NotFound(_))));
    }

    #[test]
    fn validating_missing_user_is_not_found() {
        let dir = directory();
        assert!(matches!(dir.validate_user("nope"), Err(UserError::NotFound(_))));
    }

    #[test]
    fn bootstrap_admin_is_created_once() {
        let dir = directory();
        assert!(dir.ensure_bootstrap_admin("admin", "password").unwrap());
        assert!(!dir.ensure_bootstrap_admin("admin", "password").unwrap());

        let session = dir.authenticate("admin", "password").unwrap().unwrap();
        assert_eq!(session.role, Role::SuperAdmin);
        assert!(session.can_manage_users());
    }
}
