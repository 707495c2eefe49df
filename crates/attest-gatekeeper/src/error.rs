//! Gatekeeper error types

use thiserror::Error;

/// Errors that can occur while building or running the promotion classifier
#[derive(Error, Debug)]
pub enum PromotionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A boilerplate pattern failed to compile
    #[error("Invalid boilerplate pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern
        pattern: String,
        /// Compiler message
        message: String,
    },
}
