//! Configuration for the extraction pipeline

use crate::patterns::{default_registry, PatternEntry};
use serde::{Deserialize, Serialize};

/// Configuration for the ingestor
///
/// # Examples
///
/// ```
/// use attest_extractor::ExtractorConfig;
///
/// let config = ExtractorConfig::from_toml(r#"
/// page_bucket_size = 10
///
/// [[patterns]]
/// key = "security.pentest.frequency"
/// domain = "security"
/// question = "How often is penetration testing performed?"
/// expected_kind = "token"
/// matcher = { type = "keywords", all = ["penetration test"] }
/// "#).unwrap();
///
/// assert_eq!(config.page_bucket_size, 10);
/// assert_eq!(config.patterns.len(), 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Pages per fingerprint bucket
    pub page_bucket_size: u32,

    /// Units analysed concurrently
    pub concurrency: usize,

    /// Maximum assertions accepted per unit
    pub max_assertions_per_unit: usize,

    /// Claim key registry, in priority order
    pub patterns: Vec<PatternEntry>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            page_bucket_size: 5,
            concurrency: 4,
            max_assertions_per_unit: 256,
            patterns: default_registry(),
        }
    }
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.page_bucket_size == 0 {
            return Err("page_bucket_size must be greater than 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".to_string());
        }
        if self.max_assertions_per_unit == 0 {
            return Err("max_assertions_per_unit must be greater than 0".to_string());
        }
        if self.patterns.is_empty() {
            return Err("patterns cannot be empty".to_string());
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_bucket_size, 5);
        assert_eq!(config.patterns, default_registry());
    }

    #[test]
    fn test_zero_bucket_is_invalid() {
        let config = ExtractorConfig {
            page_bucket_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_patterns_use_registry() {
        let config = ExtractorConfig::from_toml("concurrency = 2").unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.patterns, default_registry());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ExtractorConfig::default();
        let toml = config.to_toml().unwrap();
        assert_eq!(ExtractorConfig::from_toml(&toml).unwrap(), config);
    }
}
