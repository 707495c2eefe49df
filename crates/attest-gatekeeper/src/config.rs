//! Promotion policy configuration

use serde::{Deserialize, Serialize};

/// Configuration for the promotion classifier
///
/// # Examples
///
/// ```
/// use attest_gatekeeper::PromotionConfig;
///
/// let config = PromotionConfig::default();
/// assert_eq!(config.min_length, 12);
/// assert!(config.validate().is_ok());
///
/// let strict = PromotionConfig::strict();
/// assert!(strict.min_length > config.min_length);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionConfig {
    /// Assertions shorter than this (in characters, trimmed) are rejected
    pub min_length: usize,

    /// Case-insensitive regexes marking navigation, legal and layout text
    #[serde(default = "default_boilerplate_patterns")]
    pub boilerplate_patterns: Vec<String>,
}

fn default_boilerplate_patterns() -> Vec<String> {
    [
        r"^\s*(home|back|next|previous|menu|skip to (main )?content)\s*$",
        r"(©|\(c\)|copyright)\s*\d{4}",
        r"all rights reserved",
        r"^\s*see also\b",
        r"^\s*(table of )?contents\s*$",
        r"^\s*(section|chapter)?\s*\d+(\.\d+)*\.?\s+[a-z][\w\s]{0,40}\.{3,}\s*\d+\s*$",
        r"^\s*\d+(\.\d+)*\.?\s*$",
        r"^\s*page \d+( of \d+)?\s*$",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            min_length: 12,
            boilerplate_patterns: default_boilerplate_patterns(),
        }
    }
}

impl PromotionConfig {
    /// Strict preset: longer minimum length
    pub fn strict() -> Self {
        Self {
            min_length: 25,
            ..Self::default()
        }
    }

    /// Lenient preset: short assertions are kept
    pub fn lenient() -> Self {
        Self {
            min_length: 6,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.min_length == 0 {
            return Err("min_length must be greater than 0".to_string());
        }
        if self.boilerplate_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err("boilerplate_patterns cannot contain empty patterns".to_string());
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
