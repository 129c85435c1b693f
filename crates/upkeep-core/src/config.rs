use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BOOTSTRAP_USERNAME: &str = "admin";
pub const DEFAULT_BOOTSTRAP_PASSWORD: &str = "password";
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Top-level config (upkeep.toml + UPKEEP_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpkeepConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Seed Super Admin created at startup when it does not exist yet.
///
/// Override with env vars: UPKEEP_BOOTSTRAP_USERNAME / UPKEEP_BOOTSTRAP_PASSWORD,
/// or disable with UPKEEP_BOOTSTRAP_ENABLED=false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_bootstrap_username")]
    pub username: String,
    #[serde(default = "default_bootstrap_password")]
    pub password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            username: default_bootstrap_username(),
            password: default_bootstrap_password(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// How many machines the "upcoming maintenance" list shows.
    #[serde(default = "default_upcoming")]
    pub upcoming: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            upcoming: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_bootstrap_username() -> String {
    DEFAULT_BOOTSTRAP_USERNAME.to_string()
}
fn default_bootstrap_password() -> String {
    DEFAULT_BOOTSTRAP_PASSWORD.to_string()
}
fn default_upcoming() -> usize {
    DEFAULT_UPCOMING_LIMIT
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.upkeep/upkeep.db", home)
}

impl UpkeepConfig {
    /// Load config from a TOML file with UPKEEP_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.upkeep/upkeep.toml (the binary also honours UPKEEP_CONFIG)
    ///
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(%path, "loading config");

        let config: UpkeepConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("UPKEEP_").split("_"))
            .extract()
            .map_err(|e| crate::error::UpkeepError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.upkeep/upkeep.toml", home)
}
