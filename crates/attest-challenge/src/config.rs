//! Configuration for challenges and decision packages

use serde::{Deserialize, Serialize};

/// Configuration for the challenger, gap qualifier and decision builder
///
/// # Examples
///
/// ```
/// use attest_challenge::ChallengeConfig;
///
/// let config = ChallengeConfig::default();
/// assert_eq!(config.unmapped_alert_threshold, 0.30);
/// assert!(config.validate().is_ok());
///
/// let strict = ChallengeConfig::strict();
/// assert!(strict.min_claim_length > config.min_claim_length);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Segmented fragments shorter than this are dropped
    pub min_claim_length: usize,

    /// Unmapped share above which the response is flagged
    pub unmapped_alert_threshold: f64,

    /// Corpus excerpts returned per claim
    pub max_excerpts: usize,

    /// Characters kept from a unit when quoting it as gap evidence
    pub excerpt_chars: usize,

    /// Adjacent units inspected when qualifying a gap
    pub adjacent_limit: usize,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            min_claim_length: 8,
            unmapped_alert_threshold: 0.30,
            max_excerpts: 3,
            excerpt_chars: 200,
            adjacent_limit: 5,
        }
    }
}

impl ChallengeConfig {
    /// Strict preset: longer claims only, earlier unmapped alert
    pub fn strict() -> Self {
        Self {
            min_claim_length: 12,
            unmapped_alert_threshold: 0.20,
            ..Self::default()
        }
    }

    /// Lenient preset: short fragments kept, late unmapped alert
    pub fn lenient() -> Self {
        Self {
            min_claim_length: 4,
            unmapped_alert_threshold: 0.50,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_claim_length == 0 {
            return Err("min_claim_length must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.unmapped_alert_threshold) {
            return Err("unmapped_alert_threshold must be between 0.0 and 1.0".to_string());
        }
        if self.excerpt_chars == 0 {
            return Err("excerpt_chars must be greater than 0".to_string());
        }
        if self.adjacent_limit == 0 {
            return Err("adjacent_limit must be greater than 0".to_string());
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
    fn test_presets_are_valid() {
        assert!(ChallengeConfig::default().validate().is_ok());
        assert!(ChallengeConfig::strict().validate().is_ok());
        assert!(ChallengeConfig::lenient().validate().is_ok());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = ChallengeConfig {
            unmapped_alert_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial() {
        let config = ChallengeConfig::from_toml("max_excerpts = 1").unwrap();
        assert_eq!(config.max_excerpts, 1);
        assert_eq!(config.min_claim_length, 8);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ChallengeConfig::lenient();
        let toml = config.to_toml().unwrap();
        assert_eq!(ChallengeConfig::from_toml(&toml).unwrap(), config);
    }
}
