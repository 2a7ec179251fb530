//! Error types for fixture control
use thiserror::Error;

/// Control errors
#[derive(Error, Debug)]
pub enum ControlError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Discovery could not run
    #[error("Discovery error: {0}")]
    DiscoveryError(String),

    /// Background sender thread died
    #[error("Sender error: {0}")]
    SenderError(String),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;
