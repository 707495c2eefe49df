//! Attest Extractor
//!
//! Turns text units and the assertions extracted from them into typed,
//! deduplicated facts linked to canonical claim keys.
//!
//! # Architecture
//!
//! ```text
//! TextUnit + assertions
//!     → quote check → key resolution → value normalization → promotion
//!     → fingerprint → FactStore upsert → tension check → lifecycle recompute
//!     → audit record
//! ```
//!
//! The building blocks ([`ValueNormalizer`], [`KeyResolver`],
//! [`ClaimSegmenter`], [`fingerprint`]) are pure and reused by the challenge
//! orchestrator.
//!
//! # Example Usage
//!
//! ```no_run
//! use attest_audit::{AuditConfig, AuditLog};
//! use attest_domain::{AssertionType, ContextFrame, ExtractedAssertion, Position, RhetoricalRole, TextUnit};
//! use attest_extractor::{ExtractorConfig, IngestRequest, Ingestor};
//! use attest_gatekeeper::PromotionClassifier;
//! use attest_janitor::LifecycleManager;
//! use attest_store::SqliteStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ingestor = Ingestor::new(
//!     SqliteStore::new(":memory:")?,
//!     PromotionClassifier::default_config()?,
//!     LifecycleManager::default_config(),
//!     Arc::new(AuditLog::in_memory("acme", AuditConfig::default())?),
//!     ExtractorConfig::default(),
//! )?;
//!
//! let unit = TextUnit {
//!     document_id: "security-whitepaper".into(),
//!     unit_id: "p3-2".into(),
//!     text: "All endpoints require TLS minimum version 1.2.".into(),
//!     position: Position::new(3, 2),
//!     context: ContextFrame::new(),
//!     theme: None,
//! };
//! let assertion = ExtractedAssertion {
//!     text: "TLS minimum version 1.2".into(),
//!     quote: "TLS minimum version 1.2".into(),
//!     assertion_type: AssertionType::Prescriptive,
//!     role: RhetoricalRole::Fact,
//!     position: Position::new(3, 2),
//!     confidence: 0.9,
//!     overrides: None,
//! };
//!
//! let report = ingestor.ingest(vec![IngestRequest { unit, assertions: vec![assertion] }]).await?;
//! println!("{} facts created", report.created());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod error;
mod fingerprint;
mod ingestor;
mod normalizer;
mod patterns;
mod resolver;
mod segment;
mod types;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use fingerprint::{fingerprint, normalize_quote};
pub use ingestor::Ingestor;
pub use normalizer::ValueNormalizer;
pub use patterns::{default_registry, Matcher, PatternEntry};
pub use resolver::{slugify, KeyResolver, Resolution};
pub use segment::ClaimSegmenter;
pub use types::{AssertionOutcome, IngestReport, IngestRequest, UnitFailure, UnitReport};
