//! One audit record per promotion decision

use attest_domain::{ContextFrame, PromotionStatus};
use serde::{Deserialize, Serialize};

/// Whether the assertion was kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Linked or unlinked
    Accept,
    /// Discarded
    Reject,
}

impl AuditAction {
    /// Action implied by a promotion status
    pub fn for_status(status: PromotionStatus) -> Self {
        match status {
            PromotionStatus::Rejected => AuditAction::Reject,
            PromotionStatus::Linked | PromotionStatus::Unlinked => AuditAction::Accept,
        }
    }
}

/// A single JSON line of the audit log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Seconds since Unix epoch
    pub timestamp: u64,
    /// Tenant the decision belongs to
    pub tenant: String,
    /// Source document
    pub document_id: String,
    /// Source unit
    pub unit_id: String,
    /// Accept or reject
    pub action: AuditAction,
    /// Promotion reason code
    pub reason: String,
    /// Assertion text
    pub text: String,
    /// Extracted value, rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Resolved claim key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_key: Option<String>,
    /// Effective context of the assertion
    #[serde(default)]
    pub context: ContextFrame,
    /// Promotion status
    pub status: PromotionStatus,
    /// Resulting confidence
    pub confidence: f64,
}

/// Reason codes of unlinked assertions that no pattern could place
///
/// Example and caution roles are unlinked on purpose and are not listed.
pub const PATTERN_MISS_REASONS: &[&str] = &["no_pattern_match", "uncategorized"];

impl AuditRecord {
    /// Whether the record is an accepted but unlinked assertion
    pub fn is_unlinked(&self) -> bool {
        self.status == PromotionStatus::Unlinked
    }

    /// Whether the record is unlinked for lack of a matching pattern
    pub fn is_pattern_miss(&self) -> bool {
        self.is_unlinked() && PATTERN_MISS_REASONS.contains(&self.reason.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: PromotionStatus, reason: &str) -> AuditRecord {
        AuditRecord {
            timestamp: 0,
            tenant: "acme".to_string(),
            document_id: "doc".to_string(),
            unit_id: "u".to_string(),
            action: AuditAction::for_status(status),
            reason: reason.to_string(),
            text: "text".to_string(),
            value: None,
            claim_key: None,
            context: ContextFrame::new(),
            status,
            confidence: 0.5,
        }
    }

    #[test]
    fn test_pattern_miss_excludes_deliberate_unlinks() {
        assert!(record(PromotionStatus::Unlinked, "no_pattern_match").is_pattern_miss());
        assert!(record(PromotionStatus::Unlinked, "uncategorized").is_pattern_miss());
        assert!(!record(PromotionStatus::Unlinked, "role_example").is_pattern_miss());
        assert!(!record(PromotionStatus::Unlinked, "role_caution").is_pattern_miss());
        assert!(!record(PromotionStatus::Linked, "no_pattern_match").is_pattern_miss());
    }
}
