use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, UpkeepError};

/// Generate a new record identifier (UUIDv7, so ids sort by creation time).
pub fn new_record_id() -> String {
    Uuid::now_v7().to_string()
}

/// Account role hierarchy: super admin > admin > user.
///
/// Only `SuperAdmin` may manage other accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Role {
    #[default]
    User,
    Admin,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
}

impl Role {
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    /// Accepts the stored labels plus the lowercase/kebab spellings typed on
    /// the command line (`super-admin`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "super admin" | "super-admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// Health label on a machine record. Set by users, never by the predictor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MachineStatus {
    #[default]
    Healthy,
    Warning,
    Critical,
}

impl MachineStatus {
    pub const ALL: [MachineStatus; 3] = [
        MachineStatus::Healthy,
        MachineStatus::Warning,
        MachineStatus::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Healthy => "Healthy",
            MachineStatus::Warning => "Warning",
            MachineStatus::Critical => "Critical",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MachineStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "healthy" => Ok(MachineStatus::Healthy),
            "warning" => Ok(MachineStatus::Warning),
            "critical" => Ok(MachineStatus::Critical),
            _ => Err(format!("unknown machine status: {}", s)),
        }
    }
}

/// The authenticated caller, handed explicitly to every handler that needs
/// to know who is acting. Produced by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            role,
        }
    }

    pub fn can_manage_users(&self) -> bool {
        self.role.is_super_admin()
    }

    /// Gate for the account-management commands.
    pub fn require_user_admin(&self) -> Result<()> {
        if self.can_manage_users() {
            Ok(())
        } else {
            Err(UpkeepError::PermissionDenied {
                reason: format!(
                    "{} ({}) may not manage users; Super Admin required",
                    self.username, self.role
                ),
            })
        }
    }
}

impl fmt::Display for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.username, self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_parses_stored_and_cli_spellings() {
        assert_eq!(Role::from_str("Super Admin").unwrap(), Role::SuperAdmin);
        assert_eq!(Role::from_str("super-admin").unwrap(), Role::SuperAdmin);
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert!(Role::from_str("root").is_err());
    }

    #[test]
    fn role_serializes_with_display_label() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, r#""Super Admin""#);
    }

    #[test]
    fn only_super_admin_manages_users() {
        let admin = SessionContext::new("u1", "alice", Role::Admin);
        let root = SessionContext::new("u2", "root", Role::SuperAdmin);
        assert!(admin.require_user_admin().is_err());
        assert!(root.require_user_admin().is_ok());
    }

    #[test]
    fn machine_status_round_trips_through_label() {
        for status in MachineStatus::ALL {
            assert_eq!(MachineStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn record_ids_are_unique() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
