use thiserror::Error;

/// Errors raised while turning stored machine fields into prediction inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    /// A date field is empty or not formatted as `YYYY-MM-DD`.
    #[error("Invalid date format: {value:?} (expected YYYY-MM-DD)")]
    InvalidDateFormat { value: String },
}

pub type Result<T> = std::result::Result<T, PredictError>;
