//! Core ingestion pipeline

use crate::analyzer::{Analysis, Analyzer};
use crate::normalizer::ValueNormalizer;
use crate::resolver::KeyResolver;
use crate::types::{AssertionOutcome, IngestReport, IngestRequest, UnitFailure, UnitReport};
use crate::{ExtractorConfig, ExtractorError};
use attest_audit::{AuditAction, AuditLog, AuditRecord};
use attest_domain::{
    compare_facts, FactId, FactQuery, FactStore, PromotionStatus, Tension, TensionLevel, TextUnit,
};
use attest_gatekeeper::PromotionClassifier;
use attest_janitor::LifecycleManager;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Turns extracted assertions into facts
///
/// Analysis (quote check, resolution, normalization, classification,
/// fingerprinting) is pure and runs on blocking tasks, several units at a
/// time. Persistence, tension detection, lifecycle recompute and auditing
/// then run unit by unit in input order.
pub struct Ingestor<S> {
    store: Arc<Mutex<S>>,
    analyzer: Arc<Analyzer>,
    lifecycle: Mutex<LifecycleManager>,
    audit: Arc<AuditLog>,
    config: ExtractorConfig,
}

impl<S> Ingestor<S>
where
    S: FactStore + Send + 'static,
    S::Error: std::fmt::Display,
{
    /// Create an ingestor owning its store
    pub fn new(
        store: S,
        classifier: PromotionClassifier,
        lifecycle: LifecycleManager,
        audit: Arc<AuditLog>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        Self::with_shared_store(Arc::new(Mutex::new(store)), classifier, lifecycle, audit, config)
    }

    /// Create an ingestor over a store shared with other components
    pub fn with_shared_store(
        store: Arc<Mutex<S>>,
        classifier: PromotionClassifier,
        lifecycle: LifecycleManager,
        audit: Arc<AuditLog>,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        let analyzer = Analyzer {
            normalizer: ValueNormalizer::new()?,
            resolver: KeyResolver::new(config.patterns.clone())?,
            classifier,
            page_bucket_size: config.page_bucket_size,
        };

        Ok(Self {
            store,
            analyzer: Arc::new(analyzer),
            lifecycle: Mutex::new(lifecycle),
            audit,
            config,
        })
    }

    /// Shared handle to the store
    pub fn store(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.store)
    }

    /// Audit log this ingestor writes to
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Lifecycle metrics summary
    pub fn lifecycle_summary(&self) -> Result<String, ExtractorError> {
        let lifecycle = self
            .lifecycle
            .lock()
            .map_err(|e| ExtractorError::Lifecycle(format!("Lifecycle lock error: {}", e)))?;
        Ok(lifecycle.metrics().summary())
    }

    /// Ingest units
    ///
    /// A unit whose analysis violates an invariant is reported in
    /// `failures` and skipped; store and audit errors abort the run.
    pub async fn ingest(&self, requests: Vec<IngestRequest>) -> Result<IngestReport, ExtractorError> {
        info!("Ingesting {} units", requests.len());

        let mut report = IngestReport::default();
        let mut pending = requests.into_iter().peekable();

        while pending.peek().is_some() {
            let batch: Vec<IngestRequest> = pending.by_ref().take(self.config.concurrency).collect();

            let mut handles = Vec::with_capacity(batch.len());
            for request in batch {
                if request.assertions.len() > self.config.max_assertions_per_unit {
                    let error = ExtractorError::TooManyAssertions(
                        request.assertions.len(),
                        self.config.max_assertions_per_unit,
                    );
                    handles.push((request.unit, Err(error)));
                    continue;
                }

                let analyzer = Arc::clone(&self.analyzer);
                let unit = request.unit.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    analyzer.analyze_unit(&request.unit, &request.assertions)
                });
                handles.push((unit, Ok(handle)));
            }

            for (unit, handle) in handles {
                let analyses = match handle {
                    Ok(handle) => handle
                        .await
                        .map_err(|e| ExtractorError::Task(format!("Task join error: {}", e)))?,
                    Err(e) => Err(e),
                };

                match analyses {
                    Ok(analyses) => report.units.push(self.persist(&unit, analyses)?),
                    Err(e) => {
                        warn!("Unit {}/{} halted: {}", unit.document_id, unit.unit_id, e);
                        report.failures.push(UnitFailure {
                            document_id: unit.document_id.clone(),
                            unit_id: unit.unit_id.clone(),
                            error: e.to_string(),
                        });
                    }
                }
            }
        }

        report.alert = self.audit.check_unlinked_rate()?;

        info!(
            "Ingestion complete: {} linked, {} unlinked, {} rejected, {} created, {} merged, {} failed",
            report.count(PromotionStatus::Linked),
            report.count(PromotionStatus::Unlinked),
            report.count(PromotionStatus::Rejected),
            report.created(),
            report.merged(),
            report.failures.len()
        );

        Ok(report)
    }

    /// Persist one analysed unit
    fn persist(&self, unit: &TextUnit, analyses: Vec<Analysis>) -> Result<UnitReport, ExtractorError> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| ExtractorError::Store(format!("Store lock error: {}", e)))?;
        let mut lifecycle = self
            .lifecycle
            .lock()
            .map_err(|e| ExtractorError::Lifecycle(format!("Lifecycle lock error: {}", e)))?;

        store
            .put_unit(unit)
            .map_err(|e| ExtractorError::Store(e.to_string()))?;

        let now = now_secs();
        let mut report = UnitReport {
            document_id: unit.document_id.clone(),
            unit_id: unit.unit_id.clone(),
            ..Default::default()
        };
        let mut touched_keys: Vec<String> = Vec::new();

        for analysis in analyses {
            let resolved_key = analysis.resolution.as_ref().map(|r| r.machine_key().to_string());
            let mut outcome = AssertionOutcome {
                text: analysis.assertion.text.clone(),
                status: analysis.decision.status,
                reason: analysis.decision.reason.code(),
                claim_key: resolved_key.clone(),
                value: analysis.value.as_ref().map(|v| v.to_string()),
                fact_id: None,
                created: false,
            };
            let mut confidence = analysis.assertion.confidence;

            if analysis.decision.is_accepted() {
                if let (Some(key), Some(resolution)) = (analysis.linked_key(), &analysis.resolution) {
                    store
                        .ensure_claim_key(&resolution.draft)
                        .map_err(|e| ExtractorError::Store(e.to_string()))?;
                    if !touched_keys.iter().any(|k| k == key) {
                        touched_keys.push(key.to_string());
                    }
                }

                let upsert = store
                    .upsert_fact(analysis.to_fact(unit, now))
                    .map_err(|e| ExtractorError::Store(e.to_string()))?;
                outcome.fact_id = Some(upsert.id());
                outcome.created = upsert.is_created();

                if !upsert.is_created() {
                    if let Some(stored) = store
                        .get_fact(upsert.id())
                        .map_err(|e| ExtractorError::Store(e.to_string()))?
                    {
                        confidence = stored.confidence;
                    }
                }

                if let (Some(key), true) = (analysis.linked_key(), upsert.is_created()) {
                    let tensions = detect_tensions(&*store, key, upsert.id())?;
                    if tensions.iter().any(|t| t.level == TensionLevel::Hard) {
                        lifecycle.flag_contradiction(&mut *store, key)?;
                    }
                    report.tensions.extend(tensions);
                }
            }

            self.audit.record(&AuditRecord {
                timestamp: now,
                tenant: self.audit.tenant().to_string(),
                document_id: unit.document_id.clone(),
                unit_id: unit.unit_id.clone(),
                action: AuditAction::for_status(analysis.decision.status),
                reason: outcome.reason.to_string(),
                text: analysis.assertion.text.clone(),
                value: outcome.value.clone(),
                claim_key: resolved_key,
                context: analysis.context.clone(),
                status: analysis.decision.status,
                confidence,
            })?;

            report.outcomes.push(outcome);
        }

        for key in touched_keys {
            let transition = lifecycle.recompute(&mut *store, &key)?;
            if transition.changed() {
                report.transitions.push(transition);
            }
        }

        debug!(
            "Unit {}/{}: {} outcomes, {} tensions",
            unit.document_id,
            unit.unit_id,
            report.outcomes.len(),
            report.tensions.len()
        );
        Ok(report)
    }
}

/// Compare a newly created linked fact with every other fact of its key
///
/// Whichever fact of a pair states a bound is the reference.
fn detect_tensions<S>(store: &S, machine_key: &str, new_id: FactId) -> Result<Vec<Tension>, ExtractorError>
where
    S: FactStore,
    S::Error: std::fmt::Display,
{
    let facts = store
        .query_facts(&FactQuery::for_key(machine_key))
        .map_err(|e| ExtractorError::Store(e.to_string()))?;

    let Some(candidate) = facts.iter().find(|f| f.id == new_id) else {
        return Ok(Vec::new());
    };

    Ok(facts
        .iter()
        .filter(|f| f.id != new_id)
        .filter_map(|other| {
            if candidate.states_bound() && !other.states_bound() {
                compare_facts(candidate, other)
            } else {
                compare_facts(other, candidate)
            }
        })
        .filter(|t| t.level != TensionLevel::None)
        .collect())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
