//! Attest Domain Layer
//!
//! Core model of the verification engine: typed values, context frames,
//! facts, claim keys, tensions, gaps and decisions, plus the pure functions
//! that operate on them (value comparison and decision status derivation).
//!
//! ## Key Concepts
//!
//! - **Claim key**: canonical identity of a factual question, independent of wording
//! - **Fact**: a promoted, deduplicated statement with an optional typed value
//! - **Fingerprint**: content address used to merge repeated mentions
//! - **Tension**: none / soft / hard disagreement between two values of one key
//! - **Gap**: absence of evidence, valid only with documentary proof
//!
//! ## Example
//!
//! ```
//! use attest_domain::{compare_values, Comparability, NormalizedValue, Operator, TensionLevel, TypedValue, ValueKind};
//!
//! let required = TypedValue::new(ValueKind::Version, "TLS minimum version 1.2",
//!     NormalizedValue::Version(vec![1, 2]), None, Operator::Ge, Comparability::Strict).unwrap();
//! let claimed = TypedValue::new(ValueKind::Version, "TLS 1.0",
//!     NormalizedValue::Version(vec![1, 0]), None, Operator::Eq, Comparability::Strict).unwrap();
//!
//! assert_eq!(compare_values(&required, &claimed).level(), Some(TensionLevel::Hard));
//! ```
//!
//! Infrastructure (storage, extraction, auditing) lives in other crates and
//! meets this one at the [`FactStore`] trait.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assertion;
pub mod claim_key;
pub mod comparison;
pub mod context;
pub mod decision;
pub mod fact;
pub mod gap;
pub mod id;
pub mod provenance;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use assertion::{AssertionType, ExtractedAssertion, Position, RhetoricalRole, TextUnit};
pub use claim_key::{ClaimKey, ClaimKeyDraft, KeyStats, Maturity, MaturityPolicy, MaturityTransition};
pub use comparison::{compare_facts, compare_values, Tension, TensionLevel, TensionNature, ValueComparison};
pub use context::{ContextFrame, ContextOverrides, InheritanceMode};
pub use decision::{
    derive_decision_status, ClaimStatus, ClaimSupport, DecisionClaim, DecisionPackage, DecisionStatus,
};
pub use fact::{Fact, Fingerprint, PromotionStatus};
pub use gap::{DocumentaryEvidence, GapQualification, GapReason};
pub use id::{ClaimKeyId, FactId, RecordId};
pub use provenance::SourceRef;
pub use traits::{FactQuery, FactStore, UpsertOutcome};
pub use value::{Comparability, NormalizedValue, Operator, TypedValue, ValueKind};
