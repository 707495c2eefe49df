//! Tenant-keyed registry of audit logs

use crate::{AuditConfig, AuditError, AuditLog};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Hands out one shared [`AuditLog`] per tenant
///
/// Meant for the outermost composition point only. Components receive an
/// `Arc<AuditLog>` and never look tenants up themselves.
pub struct AuditRegistry {
    config: AuditConfig,
    logs: Mutex<HashMap<String, Arc<AuditLog>>>,
}

impl AuditRegistry {
    /// Create a registry
    pub fn new(config: AuditConfig) -> Result<Self, AuditError> {
        config.validate().map_err(AuditError::Config)?;
        Ok(Self {
            config,
            logs: Mutex::new(HashMap::new()),
        })
    }

    /// Log for a tenant, opening it on first use
    pub fn log(&self, tenant: &str) -> Result<Arc<AuditLog>, AuditError> {
        let tenant = sanitize_tenant(tenant)?;
        let mut logs = self.logs.lock().map_err(|e| AuditError::Sink(e.to_string()))?;
        if let Some(log) = logs.get(&tenant) {
            return Ok(Arc::clone(log));
        }

        let log = match &self.config.directory {
            Some(directory) => AuditLog::open(
                tenant.clone(),
                directory.join(format!("{}.jsonl", tenant)),
                self.config.clone(),
            )?,
            None => AuditLog::in_memory(tenant.clone(), self.config.clone())?,
        };
        let log = Arc::new(log);
        logs.insert(tenant, Arc::clone(&log));
        Ok(log)
    }

    /// Tenants opened so far
    pub fn tenants(&self) -> Result<Vec<String>, AuditError> {
        let logs = self.logs.lock().map_err(|e| AuditError::Sink(e.to_string()))?;
        let mut tenants: Vec<String> = logs.keys().cloned().collect();
        tenants.sort();
        Ok(tenants)
    }
}

/// Tenant ids become file names: keep them to a safe alphabet
fn sanitize_tenant(tenant: &str) -> Result<String, AuditError> {
    let tenant = tenant.trim();
    let valid = !tenant.is_empty()
        && tenant
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(tenant.to_string())
    } else {
        Err(AuditError::Config(format!("Invalid tenant id: '{}'", tenant)))
    }
}
