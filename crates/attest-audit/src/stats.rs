//! Statistics aggregated on demand from audit records

use crate::backlog::BacklogReport;
use crate::record::{AuditAction, AuditRecord};
use attest_domain::PromotionStatus;
use serde::Serialize;
use std::collections::BTreeMap;

/// Aggregate counts over a set of audit records
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditStats {
    /// Records seen
    pub total: usize,
    /// Accepted records (linked + unlinked)
    pub accepted: usize,
    /// Rejected records
    pub rejected: usize,
    /// Linked records
    pub linked: usize,
    /// Unlinked records
    pub unlinked: usize,
    /// Unlinked records no pattern matched
    pub pattern_misses: usize,
    /// Count per reason code
    pub reasons: BTreeMap<String, usize>,
}

impl AuditStats {
    /// Aggregate a slice of records
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total += 1;
            match record.action {
                AuditAction::Accept => stats.accepted += 1,
                AuditAction::Reject => stats.rejected += 1,
            }
            match record.status {
                PromotionStatus::Linked => stats.linked += 1,
                PromotionStatus::Unlinked => stats.unlinked += 1,
                PromotionStatus::Rejected => {}
            }
            if record.is_pattern_miss() {
                stats.pattern_misses += 1;
            }
            *stats.reasons.entry(record.reason.clone()).or_insert(0) += 1;
        }
        stats
    }

    /// Share of accepted records that no pattern matched
    ///
    /// Assertions unlinked because of their example or caution role do not
    /// count.
    pub fn unlinked_rate(&self) -> f64 {
        if self.accepted == 0 {
            0.0
        } else {
            self.pattern_misses as f64 / self.accepted as f64
        }
    }

    /// Share of all records that were rejected
    pub fn rejection_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.rejected as f64 / self.total as f64
        }
    }
}

/// Raised when too many accepted assertions find no claim key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlinkedAlert {
    /// Tenant
    pub tenant: String,
    /// Observed unlinked rate
    pub rate: f64,
    /// Configured threshold
    pub threshold: f64,
    /// Accepted records the rate was computed on
    pub sample: usize,
    /// Missing-pattern backlog at the time of the alert
    pub backlog: BacklogReport,
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::ContextFrame;

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
    fn test_rates() {
        let records = vec![
            record(PromotionStatus::Linked, "type_prescriptive"),
            record(PromotionStatus::Unlinked, "no_pattern_match"),
            record(PromotionStatus::Unlinked, "role_example"),
            record(PromotionStatus::Linked, "role_fact"),
            record(PromotionStatus::Rejected, "boilerplate"),
        ];
        let stats = AuditStats::from_records(&records);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.accepted, 4);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.unlinked, 2);
        assert_eq!(stats.pattern_misses, 1);
        assert_eq!(stats.unlinked_rate(), 0.25);
        assert_eq!(stats.rejection_rate(), 0.2);
        assert_eq!(stats.reasons.get("boilerplate"), Some(&1));
    }

    #[test]
    fn test_empty_rates_are_zero() {
        let stats = AuditStats::from_records(&[]);
        assert_eq!(stats.unlinked_rate(), 0.0);
        assert_eq!(stats.rejection_rate(), 0.0);
    }
}
