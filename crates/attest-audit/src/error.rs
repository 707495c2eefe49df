//! Audit error types

use thiserror::Error;

/// Errors that can occur while writing or reading the audit log
#[derive(Error, Debug)]
pub enum AuditError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// In-memory sink is unusable
    #[error("Sink error: {0}")]
    Sink(String),
}
