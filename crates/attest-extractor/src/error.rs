//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during extraction and ingestion
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Fact store error
    #[error("Store error: {0}")]
    Store(String),

    /// A registry or vocabulary pattern failed to compile
    #[error("Invalid pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        message: String,
    },

    /// A unit carries more assertions than allowed
    #[error("Too many assertions: {0} (max: {1})")]
    TooManyAssertions(usize, usize),

    /// Promotion classifier error
    #[error("Promotion error: {0}")]
    Promotion(String),

    /// Claim key lifecycle error
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// Audit log error
    #[error("Audit error: {0}")]
    Audit(String),

    /// Internal invariant violated; processing of the unit halts
    #[error("Invariant violated: {0}")]
    Invariant(String),

    /// Blocking analysis task failed
    #[error("Task error: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<attest_gatekeeper::PromotionError> for ExtractorError {
    fn from(e: attest_gatekeeper::PromotionError) -> Self {
        ExtractorError::Promotion(e.to_string())
    }
}

impl From<attest_janitor::LifecycleError> for ExtractorError {
    fn from(e: attest_janitor::LifecycleError) -> Self {
        ExtractorError::Lifecycle(e.to_string())
    }
}

impl From<attest_audit::AuditError> for ExtractorError {
    fn from(e: attest_audit::AuditError) -> Self {
        ExtractorError::Audit(e.to_string())
    }
}
