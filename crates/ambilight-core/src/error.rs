//! Error types for the color pipeline
use crate::mode::Mode;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// A mode profile violates one of its invariants
    #[error("Invalid {mode} profile: {reason}")]
    InvalidProfile {
        /// Mode the profile belongs to
        mode: Mode,
        /// What is wrong with it
        reason: String,
    },

    /// Mode name not recognised
    #[error("Unknown mode '{0}' (expected ambient, gaming, movie or sound)")]
    UnknownMode(String),

    /// Mode cannot be used for the requested operation
    #[error("Mode {0} has no visual pipeline")]
    NotVisual(Mode),

    /// Pixel data does not match the declared dimensions
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Frame acquisition failed
    #[error("Capture error: {0}")]
    Capture(String),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, CoreError>;
