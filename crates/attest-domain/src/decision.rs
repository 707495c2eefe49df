//! Decision packages and status derivation
//!
//! The overall status of a decision is derived, never chosen: it is a pure
//! function of the per-claim statuses, with no model or heuristic involved.

use crate::fact::Fact;
use crate::gap::GapReason;
use serde::Serialize;

/// Status of one claim inside a decision package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Corpus facts support the claim
    Supported,
    /// Corpus facts contradict each other or the claim
    Contradicted,
    /// No corpus evidence
    Missing,
}

impl ClaimStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Supported => "supported",
            ClaimStatus::Contradicted => "contradicted",
            ClaimStatus::Missing => "missing",
        }
    }
}

/// Overall status of a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    /// Every claim is supported
    Supported,
    /// At least one claim, but not all, is supported
    PartiallySupported,
    /// No claim is supported (or there are no claims)
    NotSupported,
}

impl DecisionStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionStatus::Supported => "supported",
            DecisionStatus::PartiallySupported => "partially_supported",
            DecisionStatus::NotSupported => "not_supported",
        }
    }
}

/// Derive the overall status from per-claim statuses
///
/// Order-independent: only the multiset of statuses matters.
///
/// # Examples
///
/// ```
/// use attest_domain::{derive_decision_status, ClaimStatus, DecisionStatus};
///
/// assert_eq!(derive_decision_status(&[ClaimStatus::Supported]), DecisionStatus::Supported);
/// assert_eq!(
///     derive_decision_status(&[ClaimStatus::Supported, ClaimStatus::Missing]),
///     DecisionStatus::PartiallySupported
/// );
/// assert_eq!(derive_decision_status(&[]), DecisionStatus::NotSupported);
/// ```
pub fn derive_decision_status(statuses: &[ClaimStatus]) -> DecisionStatus {
    let supported = statuses
        .iter()
        .filter(|s| **s == ClaimStatus::Supported)
        .count();

    if statuses.is_empty() || supported == 0 {
        DecisionStatus::NotSupported
    } else if supported == statuses.len() {
        DecisionStatus::Supported
    } else {
        DecisionStatus::PartiallySupported
    }
}

/// What backs a claim: facts, or a qualified gap
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClaimSupport {
    /// Supporting facts
    Facts {
        /// The facts
        facts: Vec<Fact>,
    },
    /// Qualified absence or contradiction
    Gap {
        /// The gap reason
        gap: GapReason,
    },
}

/// One claim of a decision package
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionClaim {
    /// Canonical question text
    pub text: String,
    /// Machine key
    pub claim_key: String,
    /// Claim status
    pub status: ClaimStatus,
    /// Supporting facts or gap
    pub support: ClaimSupport,
}

/// Structured proof answering one business question
///
/// Immutable: the status is derived once from the claims at construction.
/// Asking again builds a new package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionPackage {
    question: String,
    claims: Vec<DecisionClaim>,
    status: DecisionStatus,
}

impl DecisionPackage {
    /// Build a package, deriving its status from the claims
    pub fn new(question: impl Into<String>, claims: Vec<DecisionClaim>) -> Self {
        let statuses: Vec<ClaimStatus> = claims.iter().map(|c| c.status).collect();
        let status = derive_decision_status(&statuses);
        Self {
            question: question.into(),
            claims,
            status,
        }
    }

    /// Business question
    pub fn question(&self) -> &str {
        &self.question
    }

    /// Claims in the order they were requested
    pub fn claims(&self) -> &[DecisionClaim] {
        &self.claims
    }

    /// Derived overall status
    pub fn status(&self) -> DecisionStatus {
        self.status
    }
}
