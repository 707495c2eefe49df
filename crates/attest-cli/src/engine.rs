//! Composition of the engine components behind one shared store.

use crate::config::Config;
use crate::error::Result;
use attest_audit::{AuditLog, AuditRegistry};
use attest_challenge::{Challenger, DecisionBuilder};
use attest_extractor::Ingestor;
use attest_gatekeeper::PromotionClassifier;
use attest_janitor::LifecycleManager;
use attest_store::SqliteStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Store, audit log and configuration for one tenant.
///
/// This is the only place tenants are looked up: components built from
/// the engine receive the tenant's log directly.
pub struct Engine {
    store: Arc<Mutex<SqliteStore>>,
    audit: Arc<AuditLog>,
    database: PathBuf,
    config: Config,
}

impl Engine {
    /// Open the database and the tenant's audit log.
    pub fn open(config: Config, database: &Path, tenant: &str) -> Result<Self> {
        if let Some(parent) = database.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = SqliteStore::new(database)?;
        let registry = AuditRegistry::new(config.audit_for(database))?;
        let audit = registry.log(tenant)?;
        debug!("Opened {} for tenant '{}'", database.display(), audit.tenant());

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
            audit,
            database: database.to_path_buf(),
            config,
        })
    }

    /// Shared store handle.
    pub fn store(&self) -> Arc<Mutex<SqliteStore>> {
        Arc::clone(&self.store)
    }

    /// The tenant's audit log.
    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Database path.
    pub fn database(&self) -> &Path {
        &self.database
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Ingestor writing to the shared store.
    pub fn ingestor(&self) -> Result<Ingestor<SqliteStore>> {
        Ok(Ingestor::with_shared_store(
            self.store(),
            PromotionClassifier::new(self.config.promotion.clone())?,
            self.lifecycle()?,
            Arc::clone(&self.audit),
            self.config.extractor.clone(),
        )?)
    }

    /// Challenger resolving claims with the configured registry.
    pub fn challenger(&self) -> Result<Challenger<SqliteStore>> {
        Ok(Challenger::new(
            self.store(),
            self.config.extractor.patterns.clone(),
            self.config.challenge.clone(),
        )?)
    }

    /// Decision package builder.
    pub fn decisions(&self) -> Result<DecisionBuilder<SqliteStore>> {
        Ok(DecisionBuilder::new(self.store(), &self.config.challenge)?)
    }

    /// Fresh lifecycle manager.
    pub fn lifecycle(&self) -> Result<LifecycleManager> {
        Ok(LifecycleManager::new(self.config.lifecycle.clone())?)
    }
}
