//! Fact module - the durable unit produced by promotion

use crate::assertion::{AssertionType, Position, RhetoricalRole};
use crate::context::ContextFrame;
use crate::id::FactId;
use crate::provenance::SourceRef;
use crate::value::TypedValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Outcome of the promotion policy for one assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromotionStatus {
    /// Accepted and linked to a claim key
    Linked,
    /// Accepted, retained for audit, not linked to any claim key
    Unlinked,
    /// Discarded (boilerplate, too short, paraphrased quote)
    Rejected,
}

impl PromotionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionStatus::Linked => "linked",
            PromotionStatus::Unlinked => "unlinked",
            PromotionStatus::Rejected => "rejected",
        }
    }

    /// Parse a status from its string name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "linked" => Some(PromotionStatus::Linked),
            "unlinked" => Some(PromotionStatus::Unlinked),
            "rejected" => Some(PromotionStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for PromotionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content address of a fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed digest
    pub fn from_digest(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Digest string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A promoted, deduplicated statement
///
/// One Fact exists per fingerprint. Re-extraction appends to `sources`
/// and may raise `confidence`; it never creates a second Fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Unique identifier
    pub id: FactId,

    /// Document the fact was first extracted from
    pub document_id: String,

    /// Exact quote (literal substring of the source unit)
    pub quote: String,

    /// Semantic type of the originating assertion
    pub assertion_type: AssertionType,

    /// Rhetorical role of the originating assertion
    pub role: RhetoricalRole,

    /// Position of the first mention
    pub position: Position,

    /// Extracted value, if any
    pub value: Option<TypedValue>,

    /// Context the fact applies to
    pub context: ContextFrame,

    /// Promotion status (never `Rejected` for stored facts)
    pub status: PromotionStatus,

    /// Reason code attached by the promotion policy
    pub reason: String,

    /// Machine key of the linked claim key
    pub claim_key: Option<String>,

    /// Content address
    pub fingerprint: Fingerprint,

    /// Confidence in [0, 1]
    pub confidence: f64,

    /// Accumulated provenance
    pub sources: Vec<SourceRef>,

    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,
}

impl Fact {
    /// Whether the fact is linked to a claim key
    pub fn is_linked(&self) -> bool {
        self.status == PromotionStatus::Linked && self.claim_key.is_some()
    }

    /// Distinct documents across all provenance entries
    pub fn documents(&self) -> BTreeSet<&str> {
        let mut docs: BTreeSet<&str> = self.sources.iter().map(|s| s.document_id.as_str()).collect();
        docs.insert(self.document_id.as_str());
        docs
    }

    /// Whether the value states a lower or upper bound
    ///
    /// A bound-stating fact is the reference when two facts of a key are
    /// compared.
    pub fn states_bound(&self) -> bool {
        self.value
            .as_ref()
            .is_some_and(|v| v.operator().is_minimum() || v.operator().is_maximum())
    }

    /// Short excerpt with its first source, for explanations
    pub fn excerpt(&self) -> String {
        match self.sources.first() {
            Some(source) => format!("\"{}\" ({})", self.quote, source.label()),
            None => format!("\"{}\" ({})", self.quote, self.document_id),
        }
    }
}
