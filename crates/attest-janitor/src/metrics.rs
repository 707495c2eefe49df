//! Metrics collection for lifecycle operations

use attest_domain::{Maturity, MaturityTransition};
use std::collections::BTreeMap;

/// Metrics collected by the lifecycle manager
#[derive(Debug, Clone, Default)]
pub struct LifecycleMetrics {
    /// Keys entering each maturity
    pub entered: BTreeMap<&'static str, usize>,

    /// Recompute calls
    pub recomputes: usize,

    /// Manual deprecations
    pub deprecations: usize,

    /// Full sweeps completed
    pub sweep_count: usize,
}

impl LifecycleMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one recompute
    pub fn record_recompute(&mut self, transition: &MaturityTransition) {
        self.recomputes += 1;
        if transition.changed() {
            *self.entered.entry(transition.to.as_str()).or_insert(0) += 1;
        }
    }

    /// Record a manual deprecation
    pub fn record_deprecation(&mut self) {
        self.deprecations += 1;
        *self.entered.entry(Maturity::Deprecated.as_str()).or_insert(0) += 1;
    }

    /// Record a sweep completion
    pub fn record_sweep(&mut self) {
        self.sweep_count += 1;
    }

    /// Total status changes
    pub fn total_transitions(&self) -> usize {
        self.entered.values().sum()
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        self.entered.clear();
        self.recomputes = 0;
        self.deprecations = 0;
        self.sweep_count = 0;
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Lifecycle Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Sweeps: {}", self.sweep_count),
            format!("Recomputes: {}", self.recomputes),
            format!("Deprecations: {}", self.deprecations),
        ];

        if !self.entered.is_empty() {
            lines.push(String::new());
            lines.push("Transitions into:".to_string());
            for (maturity, count) in &self.entered {
                lines.push(format!("  {}: {}", maturity, count));
            }
            lines.push(format!("  Total: {}", self.total_transitions()));
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::KeyStats;

    fn transition(from: Maturity, to: Maturity) -> MaturityTransition {
        MaturityTransition {
            machine_key: "k".to_string(),
            from,
            to,
            stats: KeyStats::default(),
        }
    }

    #[test]
    fn test_unchanged_recompute_is_not_a_transition() {
        let mut metrics = LifecycleMetrics::new();
        metrics.record_recompute(&transition(Maturity::Emergent, Maturity::Emergent));
        metrics.record_recompute(&transition(Maturity::Emergent, Maturity::Comparable));

        assert_eq!(metrics.recomputes, 2);
        assert_eq!(metrics.total_transitions(), 1);
        assert_eq!(metrics.entered.get("comparable"), Some(&1));
    }

    #[test]
    fn test_summary() {
        let mut metrics = LifecycleMetrics::new();
        metrics.record_recompute(&transition(Maturity::Orphan, Maturity::Emergent));
        metrics.record_deprecation();
        metrics.record_sweep();

        let summary = metrics.summary();
        assert!(summary.contains("Sweeps: 1"));
        assert!(summary.contains("emergent: 1"));
        assert!(summary.contains("deprecated: 1"));
        assert!(summary.contains("Total: 2"));
    }

    #[test]
    fn test_reset() {
        let mut metrics = LifecycleMetrics::new();
        metrics.record_deprecation();
        metrics.record_sweep();
        metrics.reset();
        assert_eq!(metrics.total_transitions(), 0);
        assert_eq!(metrics.sweep_count, 0);
    }
}
