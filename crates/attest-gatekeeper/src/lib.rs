//! Attest Gatekeeper
//!
//! Decides the promotion status of every extracted assertion. Nothing is
//! dropped silently: each assertion ends up linked, unlinked (kept for audit)
//! or rejected, always with a reason code.
//!
//! # Examples
//!
//! ```
//! use attest_gatekeeper::{PromotionClassifier, PromotionConfig, PromotionSignals};
//! use attest_domain::{AssertionType, ContextFrame, ExtractedAssertion, Position, PromotionStatus, RhetoricalRole, TextUnit};
//!
//! let classifier = PromotionClassifier::new(PromotionConfig::default()).unwrap();
//! let unit = TextUnit {
//!     document_id: "security-whitepaper".into(),
//!     unit_id: "p2-1".into(),
//!     text: "Connections require TLS minimum version 1.2.".into(),
//!     position: Position::new(2, 1),
//!     context: ContextFrame::new(),
//!     theme: None,
//! };
//! let assertion = ExtractedAssertion {
//!     text: "Connections require TLS minimum version 1.2".into(),
//!     quote: "Connections require TLS minimum version 1.2".into(),
//!     assertion_type: AssertionType::Prescriptive,
//!     role: RhetoricalRole::Fact,
//!     position: Position::new(2, 1),
//!     confidence: 0.9,
//!     overrides: None,
//! };
//!
//! let signals = PromotionSignals { has_value: true, key_resolved: true };
//! let decision = classifier.classify(&assertion, &unit, signals);
//! assert_eq!(decision.status, PromotionStatus::Linked);
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod error;

pub use classifier::{PromotionClassifier, PromotionDecision, PromotionReason, PromotionSignals};
pub use config::PromotionConfig;
pub use error::PromotionError;
