//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] attest_store::StoreError),

    /// Ingestion error
    #[error("Ingestion error: {0}")]
    Extractor(#[from] attest_extractor::ExtractorError),

    /// Challenge or decision error
    #[error("Challenge error: {0}")]
    Challenge(#[from] attest_challenge::ChallengeError),

    /// Lifecycle error
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] attest_janitor::LifecycleError),

    /// Promotion classifier error
    #[error("Promotion error: {0}")]
    Promotion(#[from] attest_gatekeeper::PromotionError),

    /// Audit error
    #[error("Audit error: {0}")]
    Audit(#[from] attest_audit::AuditError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Background task failed
    #[error("Task join error: {0}")]
    Task(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
