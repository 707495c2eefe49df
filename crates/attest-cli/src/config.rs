//! Configuration management for the CLI.
//!
//! One TOML file carries a `[settings]` table for the CLI itself and one
//! table per engine component. Missing tables fall back to defaults.

use crate::error::{CliError, Result};
use attest_audit::AuditConfig;
use attest_challenge::ChallengeConfig;
use attest_extractor::ExtractorConfig;
use attest_gatekeeper::PromotionConfig;
use attest_janitor::LifecycleConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Full engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// CLI settings
    #[serde(default)]
    pub settings: Settings,

    /// Ingestion pipeline and claim key registry
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Promotion gate
    #[serde(default)]
    pub promotion: PromotionConfig,

    /// Claim key lifecycle
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Audit logs
    #[serde(default)]
    pub audit: AuditConfig,

    /// Challenges and decisions
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,

    /// Fact database path (defaults to `~/.attest/attest.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Tenant used when `--tenant` is not given
    #[serde(default = "default_tenant")]
    pub tenant: String,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
}

impl Config {
    /// Directory holding the default configuration, database and audit logs.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".attest"))
    }

    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default path is read
    /// when present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::path()?;
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("Cannot read {}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("extractor", self.extractor.validate()),
            ("lifecycle", self.lifecycle.validate()),
            ("audit", self.audit.validate()),
            ("challenge", self.challenge.validate()),
        ];
        for (section, check) in checks {
            check.map_err(|e| CliError::Config(format!("[{}] {}", section, e)))?;
        }
        if self.promotion.min_length == 0 {
            return Err(CliError::Config("[promotion] min_length must be greater than 0".into()));
        }
        if self.settings.tenant.trim().is_empty() {
            return Err(CliError::Config("[settings] tenant must not be empty".into()));
        }
        Ok(())
    }

    /// Database path: the override, then the configured path, then the default.
    pub fn database_path(&self, overridden: Option<&str>) -> Result<PathBuf> {
        match (overridden, &self.settings.database) {
            (Some(path), _) => Ok(PathBuf::from(path)),
            (None, Some(path)) => Ok(path.clone()),
            (None, None) => Ok(Self::home()?.join("attest.db")),
        }
    }

    /// Audit configuration with a persistent directory filled in.
    ///
    /// Logs live next to the database unless a directory is configured.
    pub fn audit_for(&self, database: &Path) -> AuditConfig {
        let mut audit = self.audit.clone();
        if audit.directory.is_none() {
            let parent = database.parent().unwrap_or_else(|| Path::new("."));
            audit.directory = Some(parent.join("audit"));
        }
        audit
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
            database: None,
            tenant: default_tenant(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

fn default_tenant() -> String {
    "default".to_string()
}
