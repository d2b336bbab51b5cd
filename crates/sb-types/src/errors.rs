//! Error types and conversions

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Popup blocked: {0}")]
    PopupBlocked(String),

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("Malformed callback message: {0}")]
    MalformedCallback(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<AppError> for String {
    fn from(err: AppError) -> String {
        err.to_string()
    }
}
