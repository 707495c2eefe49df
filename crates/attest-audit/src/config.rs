//! Audit configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for audit logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory holding one `<tenant>.jsonl` file per tenant; in-memory
    /// logs are used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Unlinked share of accepted records that raises an alert
    pub unlinked_alert_threshold: f64,

    /// Accepted records needed before the alert is evaluated
    pub alert_min_sample: usize,

    /// Keywords listed in the backlog
    pub backlog_top_n: usize,

    /// Shortest word counted as a backlog keyword
    pub min_keyword_length: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            directory: None,
            unlinked_alert_threshold: 0.25,
            alert_min_sample: 20,
            backlog_top_n: 20,
            min_keyword_length: 4,
        }
    }
}

impl AuditConfig {
    /// Strict preset: alert earlier, on smaller samples
    pub fn strict() -> Self {
        Self {
            unlinked_alert_threshold: 0.15,
            alert_min_sample: 10,
            ..Self::default()
        }
    }

    /// Lenient preset: tolerate a large unlinked share
    pub fn lenient() -> Self {
        Self {
            unlinked_alert_threshold: 0.5,
            alert_min_sample: 50,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.unlinked_alert_threshold) {
            return Err("unlinked_alert_threshold must be within [0, 1]".to_string());
        }
        if self.backlog_top_n == 0 {
            return Err("backlog_top_n must be greater than 0".to_string());
        }
        if self.min_keyword_length == 0 {
            return Err("min_keyword_length must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
