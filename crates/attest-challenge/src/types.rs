//! Challenge response types

use attest_domain::{GapReason, TensionLevel};
use serde::Serialize;

/// Verdict for one challenged claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStatus {
    /// Corpus values agree, or the claim exceeds a corpus minimum
    Confirmed,
    /// A corpus value is in hard conflict with the claim
    Contradicted,
    /// Facts exist but none is comparable with the claim
    Partial,
    /// The key resolved but the corpus has no fact for it
    Missing,
    /// No pattern recognises the claim
    Unmapped,
}

impl ChallengeStatus {
    /// Get the status name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Confirmed => "confirmed",
            ChallengeStatus::Contradicted => "contradicted",
            ChallengeStatus::Partial => "partial",
            ChallengeStatus::Missing => "missing",
            ChallengeStatus::Unmapped => "unmapped",
        }
    }
}

/// Outcome for one segmented claim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimMatch {
    /// Claim text as segmented
    pub claim: String,

    /// Resolved claim key
    pub claim_key: Option<String>,

    /// Value extracted from the claim, rendered
    pub value: Option<String>,

    /// Corpus excerpts backing the verdict
    pub excerpts: Vec<String>,

    /// Verdict
    pub status: ChallengeStatus,

    /// Tension level (null when nothing was compared)
    pub tension: Option<TensionLevel>,

    /// Human-readable explanation
    pub explanation: String,

    /// Qualified gap for missing claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gap: Option<GapReason>,
}

/// Aggregate counts over a challenge
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChallengeSummary {
    /// Claims answered
    pub total: usize,
    /// Confirmed claims
    pub confirmed: usize,
    /// Contradicted claims
    pub contradicted: usize,
    /// Partial claims
    pub partial: usize,
    /// Missing claims
    pub missing: usize,
    /// Unmapped claims
    pub unmapped: usize,
    /// Unmapped share exceeded the configured threshold
    pub high_unmapped_rate: bool,
}

impl ChallengeSummary {
    /// Count the statuses of `matches`
    pub fn from_matches(matches: &[ClaimMatch], unmapped_alert_threshold: f64) -> Self {
        let mut summary = ChallengeSummary {
            total: matches.len(),
            ..Default::default()
        };

        for m in matches {
            match m.status {
                ChallengeStatus::Confirmed => summary.confirmed += 1,
                ChallengeStatus::Contradicted => summary.contradicted += 1,
                ChallengeStatus::Partial => summary.partial += 1,
                ChallengeStatus::Missing => summary.missing += 1,
                ChallengeStatus::Unmapped => summary.unmapped += 1,
            }
        }

        summary.high_unmapped_rate = summary.unmapped_rate() > unmapped_alert_threshold;
        summary
    }

    /// Unmapped share (0 for an empty challenge)
    pub fn unmapped_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.unmapped as f64 / self.total as f64
        }
    }
}

/// Full answer to a challenge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeResponse {
    /// Segmented claims, in input order
    pub claims: Vec<String>,

    /// One match per claim, in the same order
    pub matches: Vec<ClaimMatch>,

    /// Aggregate counts
    pub summary: ChallengeSummary,
}
