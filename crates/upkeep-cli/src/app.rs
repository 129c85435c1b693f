use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::Connection;
use tracing::info;
use upkeep_core::{SessionContext, UpkeepConfig, UpkeepError};
use upkeep_store::RecordStore;
use upkeep_users::UserDirectory;

use crate::output::OutputFormat;

/// Everything a command handler needs: config, the two subsystems (each on
/// its own connection to the same SQLite file), the output format and the
/// effective current date.
pub(crate) struct App {
    pub config: UpkeepConfig,
    pub users: UserDirectory,
    pub store: RecordStore,
    pub output: OutputFormat,
    pub today: NaiveDate,
}

impl App {
    /// Open the database, run the schema setup of both subsystems and seed
    /// the bootstrap Super Admin when enabled.
    pub fn open(config: UpkeepConfig, output: OutputFormat, today: NaiveDate) -> anyhow::Result<Self> {
        let db_path = config.database.path.clone();
        ensure_parent_dir(&db_path);
        info!(path = %db_path, "opening SQLite database");

        let users = UserDirectory::new(open_connection(&db_path)?)?;
        let store = RecordStore::new(open_connection(&db_path)?)?;
        info!("database migrations complete");

        if config.bootstrap.enabled {
            users.ensure_bootstrap_admin(&config.bootstrap.username, &config.bootstrap.password)?;
        }

        Ok(Self {
            config,
            users,
            store,
            output,
            today,
        })
    }

    /// Authenticate the caller. Missing credentials and rejected logins are
    /// both `AuthFailed`.
    pub fn login(&self, username: Option<&str>, password: Option<&str>) -> anyhow::Result<SessionContext> {
        let (Some(username), Some(password)) = (username, password) else {
            return Err(UpkeepError::AuthFailed(
                "credentials required: pass --user/--password or set UPKEEP_USER/UPKEEP_PASSWORD"
                    .to_string(),
            )
            .into());
        };
        match self.users.authenticate(username, password)? {
            Some(session) => Ok(session),
            None => Err(UpkeepError::AuthFailed(
                "invalid username or password, or account not yet validated".to_string(),
            )
            .into()),
        }
    }
}

fn open_connection(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("opening database {path}"))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=3000;")?;
    Ok(conn)
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use upkeep_core::Role;

    /// An app over a fresh on-disk database with the default seed admin.
    pub(crate) fn test_app(dir: &tempfile::TempDir) -> App {
        let mut config = UpkeepConfig::default();
        config.database.path = dir.path().join("upkeep.db").display().to_string();
        let today = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        App::open(config, OutputFormat::Json, today).unwrap()
    }

    #[test]
    fn bootstrap_admin_can_log_in() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        let session = app.login(Some("admin"), Some("password")).unwrap();
        assert_eq!(session.role, Role::SuperAdmin);
    }

    #[test]
    fn reopening_does_not_duplicate_the_seed_account() {
        let dir = tempfile::tempdir().unwrap();
        drop(test_app(&dir));
        let app = test_app(&dir);
        assert_eq!(app.users.list_users().unwrap().len(), 1);
    }

    #[test]
    fn missing_or_wrong_credentials_fail() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);

        let err = app.login(None, Some("password")).unwrap_err();
        assert_eq!(err.downcast_ref::<UpkeepError>().map(|e| e.code()), Some("AUTH_FAILED"));

        let err = app.login(Some("admin"), Some("wrong")).unwrap_err();
        assert_eq!(err.downcast_ref::<UpkeepError>().map(|e| e.code()), Some("AUTH_FAILED"));
    }

    #[test]
    fn connections_wait_on_a_busy_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upkeep.db").display().to_string();
        let conn = open_connection(&path).unwrap();
        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 3000);
    }

    #[test]
    fn unvalidated_accounts_cannot_log_in() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(&dir);
        app.users.add_user("tech", "secret", Role::User).unwrap();
        assert!(app.login(Some("tech"), Some("secret")).is_err());
    }
}
