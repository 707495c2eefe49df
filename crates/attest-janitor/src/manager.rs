//! Claim key lifecycle: maturity recompute, manual deprecation, full sweeps

use crate::{LifecycleConfig, LifecycleError, LifecycleMetrics};
use attest_domain::traits::FactStore;
use attest_domain::{ClaimKey, Maturity, MaturityPolicy, MaturityTransition};
use tracing::{debug, info, warn};

/// Transitions observed during one full sweep
#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    /// Keys visited
    pub keys_checked: usize,
    /// Keys whose maturity changed
    pub transitions: Vec<MaturityTransition>,
}

impl SweepReport {
    /// Number of keys whose status changed
    pub fn changed(&self) -> usize {
        self.transitions.len()
    }
}

/// Lifecycle manager for claim keys
///
/// Maturity is never set directly: it is recomputed from the store's counts.
/// The only manual transition is deprecation, which recomputes never undo.
///
/// # Examples
///
/// ```no_run
/// use attest_janitor::{LifecycleConfig, LifecycleManager};
/// use attest_store::SqliteStore;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteStore::new("attest.db")?;
/// let mut manager = LifecycleManager::new(LifecycleConfig::default())?;
///
/// let report = manager.sweep(&mut store)?;
/// println!("{} of {} keys changed", report.changed(), report.keys_checked);
/// println!("{}", manager.metrics().summary());
/// # Ok(())
/// # }
/// ```
pub struct LifecycleManager {
    config: LifecycleConfig,
    policy: MaturityPolicy,
    metrics: LifecycleMetrics,
}

impl LifecycleManager {
    /// Create a new manager with the given configuration
    pub fn new(config: LifecycleConfig) -> Result<Self, LifecycleError> {
        config.validate().map_err(LifecycleError::Config)?;
        let policy = config.policy();
        Ok(Self {
            config,
            policy,
            metrics: LifecycleMetrics::new(),
        })
    }

    /// Create a manager with default configuration
    pub fn default_config() -> Self {
        let config = LifecycleConfig::default();
        let policy = config.policy();
        Self {
            config,
            policy,
            metrics: LifecycleMetrics::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Get a reference to the current metrics
    pub fn metrics(&self) -> &LifecycleMetrics {
        &self.metrics
    }

    /// Reset metrics counters
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }

    /// Recompute one key after its supporting set changed
    pub fn recompute<S: FactStore>(
        &mut self,
        store: &mut S,
        machine_key: &str,
    ) -> Result<MaturityTransition, LifecycleError>
    where
        S::Error: std::fmt::Display,
    {
        let transition = store
            .recompute_claim_key(machine_key, &self.policy)
            .map_err(|e| LifecycleError::Store(e.to_string()))?
            .ok_or_else(|| LifecycleError::UnknownKey(machine_key.to_string()))?;

        if transition.changed() {
            info!(
                "Claim key {} moved {} -> {} ({} facts, {} documents)",
                machine_key,
                transition.from.as_str(),
                transition.to.as_str(),
                transition.stats.linked_facts,
                transition.stats.distinct_documents
            );
        } else {
            debug!("Claim key {} stays {}", machine_key, transition.to.as_str());
        }

        self.metrics.record_recompute(&transition);
        Ok(transition)
    }

    /// Deprecate a key, optionally naming the key that supersedes it
    pub fn deprecate<S: FactStore>(
        &mut self,
        store: &mut S,
        machine_key: &str,
        superseded_by: Option<&str>,
    ) -> Result<ClaimKey, LifecycleError>
    where
        S::Error: std::fmt::Display,
    {
        if superseded_by == Some(machine_key) {
            return Err(LifecycleError::InvalidTransition(format!(
                "{} cannot supersede itself",
                machine_key
            )));
        }

        let current = store
            .get_claim_key(machine_key)
            .map_err(|e| LifecycleError::Store(e.to_string()))?
            .ok_or_else(|| LifecycleError::UnknownKey(machine_key.to_string()))?;
        if current.maturity == Maturity::Deprecated {
            return Err(LifecycleError::InvalidTransition(format!(
                "{} is already deprecated",
                machine_key
            )));
        }

        if let Some(successor) = superseded_by {
            let known = store
                .get_claim_key(successor)
                .map_err(|e| LifecycleError::Store(e.to_string()))?
                .is_some();
            if !known {
                warn!("Deprecating {} in favour of unknown key {}", machine_key, successor);
            }
        }

        let key = store
            .deprecate_claim_key(machine_key, superseded_by)
            .map_err(|e| LifecycleError::Store(e.to_string()))?
            .ok_or_else(|| LifecycleError::UnknownKey(machine_key.to_string()))?;

        info!(
            "Deprecated claim key {} (superseded by {})",
            machine_key,
            superseded_by.unwrap_or("nothing")
        );
        self.metrics.record_deprecation();
        Ok(key)
    }

    /// Mark a key as contradicted, when enabled
    pub fn flag_contradiction<S: FactStore>(
        &mut self,
        store: &mut S,
        machine_key: &str,
    ) -> Result<bool, LifecycleError>
    where
        S::Error: std::fmt::Display,
    {
        if !self.config.flag_contradictions {
            return Ok(false);
        }
        store
            .flag_contradiction(machine_key)
            .map_err(|e| LifecycleError::Store(e.to_string()))?;
        warn!("Claim key {} has contradicting facts", machine_key);
        Ok(true)
    }

    /// Recompute every key and report the ones that changed
    pub fn sweep<S: FactStore>(&mut self, store: &mut S) -> Result<SweepReport, LifecycleError>
    where
        S::Error: std::fmt::Display,
    {
        let keys = store
            .find_claim_keys("")
            .map_err(|e| LifecycleError::Store(e.to_string()))?;

        let mut report = SweepReport::default();
        for key in keys {
            let transition = self.recompute(store, &key.machine_key)?;
            report.keys_checked += 1;
            if transition.changed() {
                report.transitions.push(transition);
            }
        }

        self.metrics.record_sweep();
        info!(
            "Lifecycle sweep checked {} keys, {} changed",
            report.keys_checked,
            report.changed()
        );
        Ok(report)
    }
}
