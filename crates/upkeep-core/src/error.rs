use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpkeepError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },
}

impl UpkeepError {
    /// Short error code string printed by the CLI next to the message.
    pub fn code(&self) -> &'static str {
        match self {
            UpkeepError::Config(_) => "CONFIG_ERROR",
            UpkeepError::AuthFailed(_) => "AUTH_FAILED",
            UpkeepError::PermissionDenied { .. } => "PERMISSION_DENIED",
        }
    }
}

pub type Result<T> = std::result::Result<T, UpkeepError>;
