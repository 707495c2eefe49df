//! Error types for lifecycle operations

use thiserror::Error;

/// Errors that can occur during lifecycle operations
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Claim key does not exist
    #[error("Unknown claim key: {0}")]
    UnknownKey(String),

    /// Invalid maturity transition
    #[error("Invalid maturity transition: {0}")]
    InvalidTransition(String),
}
