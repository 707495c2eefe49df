//! Configuration for claim key lifecycle management

use attest_domain::MaturityPolicy;
use serde::{Deserialize, Serialize};

/// Configuration for the lifecycle manager
///
/// # Examples
///
/// ```
/// use attest_janitor::LifecycleConfig;
///
/// let config = LifecycleConfig::default();
/// assert_eq!(config.comparable_min_documents, 2);
///
/// let strict = LifecycleConfig::strict();
/// assert_eq!(strict.comparable_min_documents, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Distinct supporting documents needed before a key is comparable
    pub comparable_min_documents: usize,

    /// Set the contradiction flag when a new linked fact is in hard tension
    /// with an existing fact of the same key
    #[serde(default = "default_flag_contradictions")]
    pub flag_contradictions: bool,
}

fn default_flag_contradictions() -> bool {
    true
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            comparable_min_documents: 2,
            flag_contradictions: true,
        }
    }
}

impl LifecycleConfig {
    /// Strict preset: three independent documents before comparing
    pub fn strict() -> Self {
        Self {
            comparable_min_documents: 3,
            ..Self::default()
        }
    }

    /// Lenient preset: a single document makes a key comparable
    pub fn lenient() -> Self {
        Self {
            comparable_min_documents: 1,
            ..Self::default()
        }
    }

    /// Maturity rule derived from this configuration
    pub fn policy(&self) -> MaturityPolicy {
        MaturityPolicy {
            comparable_min_documents: self.comparable_min_documents,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.comparable_min_documents == 0 {
            return Err("comparable_min_documents must be at least 1".to_string());
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
