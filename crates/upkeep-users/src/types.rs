use serde::{Deserialize, Serialize};
use upkeep_core::{Role, SessionContext};

/// An account row. The password digest never leaves the db layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// UUIDv7, so ids sort by creation time.
    pub id: String,
    pub username: String,
    pub role: Role,
    /// Accounts cannot log in until an administrator validates them.
    pub is_validated: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// The explicit session value handed to command handlers after login.
    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.id.clone(), self.username.clone(), self.role)
    }
}
