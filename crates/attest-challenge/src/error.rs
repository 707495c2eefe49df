//! Error types for challenges and decisions

use thiserror::Error;

/// Errors that can occur while answering a challenge or building a decision
#[derive(Error, Debug)]
pub enum ChallengeError {
    /// Fact store error
    #[error("Store error: {0}")]
    Store(String),

    /// Extraction building block error (normalizer, resolver, segmenter)
    #[error("Extractor error: {0}")]
    Extractor(String),

    /// A key has no facts and nothing adjacent in the corpus explains why
    #[error("Gap qualifier defect: no documentary evidence for missing key '{0}'")]
    GapDefect(String),

    /// A gap reason could not be built
    #[error("Invalid gap: {0}")]
    InvalidGap(String),

    /// Blocking lookup task failed
    #[error("Task error: {0}")]
    Task(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<attest_extractor::ExtractorError> for ChallengeError {
    fn from(e: attest_extractor::ExtractorError) -> Self {
        ChallengeError::Extractor(e.to_string())
    }
}
