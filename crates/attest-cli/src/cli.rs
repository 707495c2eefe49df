//! CLI command definitions and argument parsing.

use attest_domain::ContextFrame;
use clap::{Args, Parser, Subcommand};

/// Attest CLI - Verify statements against a corpus of documentary facts.
#[derive(Debug, Parser)]
#[command(name = "attest")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "ATTEST_CONFIG")]
    pub config: Option<String>,

    /// Fact database path (overrides the configuration)
    #[arg(long, global = true, env = "ATTEST_DB")]
    pub db: Option<String>,

    /// Tenant whose audit log is written
    #[arg(short, long, global = true, env = "ATTEST_TENANT")]
    pub tenant: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest extracted assertions (JSON array of units)
    Ingest(IngestArgs),

    /// Check free text claim by claim against the corpus
    Challenge(ChallengeArgs),

    /// Build a decision package for a business question
    Decide(DecideArgs),

    /// Inspect and manage claim keys
    Keys(KeysArgs),

    /// Audit statistics and pattern backlog
    Audit(AuditArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the ingest command.
#[derive(Debug, Parser)]
pub struct IngestArgs {
    /// JSON file holding the units to ingest
    #[arg(short = 'i', long, conflicts_with = "stdin")]
    pub file: Option<String>,

    /// Read units from stdin
    #[arg(long)]
    pub stdin: bool,
}

/// Applicability scope given on the command line.
#[derive(Debug, Clone, Default, Args)]
pub struct ContextArgs {
    /// Edition (e.g. enterprise)
    #[arg(long)]
    pub edition: Option<String>,

    /// Region; repeat for several
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Product version
    #[arg(long = "product-version")]
    pub version: Option<String>,

    /// Product
    #[arg(long)]
    pub product: Option<String>,

    /// Deployment model (e.g. saas)
    #[arg(long)]
    pub deployment: Option<String>,
}

impl ContextArgs {
    /// Frame built from the given fields, or `None` when nothing was given
    pub fn to_frame(&self) -> Option<ContextFrame> {
        let mut frame = ContextFrame::new();
        if let Some(edition) = &self.edition {
            frame = frame.with_edition(edition.as_str());
        }
        for region in &self.regions {
            frame = frame.with_region(region.as_str());
        }
        if let Some(version) = &self.version {
            frame = frame.with_version(version.as_str());
        }
        if let Some(product) = &self.product {
            frame = frame.with_product(product.as_str());
        }
        if let Some(deployment) = &self.deployment {
            frame = frame.with_deployment(deployment.as_str());
        }

        if frame.is_unscoped() {
            None
        } else {
            Some(frame)
        }
    }
}

/// Arguments for the challenge command.
#[derive(Debug, Parser)]
pub struct ChallengeArgs {
    /// Text to check (reads stdin when omitted)
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(short = 'i', long, conflicts_with = "text")]
    pub file: Option<String>,

    /// Do not qualify missing claims
    #[arg(long)]
    pub no_missing: bool,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the decide command.
#[derive(Debug, Parser)]
pub struct DecideArgs {
    /// Business question
    pub question: String,

    /// Claim key the answer depends on; repeat for several
    #[arg(short, long = "key", required = true)]
    pub keys: Vec<String>,

    #[command(flatten)]
    pub context: ContextArgs,
}

/// Arguments for the keys command.
#[derive(Debug, Parser)]
pub struct KeysArgs {
    #[command(subcommand)]
    pub action: KeysAction,
}

/// Claim key actions.
#[derive(Debug, Subcommand)]
pub enum KeysAction {
    /// List claim keys whose machine key contains a fragment
    List {
        /// Fragment to match (all keys when omitted)
        fragment: Option<String>,
    },

    /// Deprecate a claim key
    Deprecate {
        /// Machine key to deprecate
        key: String,

        /// Key replacing it
        #[arg(long)]
        superseded_by: Option<String>,
    },

    /// Recompute the maturity of every key
    Sweep,
}

/// Arguments for the audit command.
#[derive(Debug, Parser)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub action: AuditAction,
}

/// Audit actions.
#[derive(Debug, Subcommand)]
pub enum AuditAction {
    /// Promotion statistics for the tenant
    Stats,

    /// Keywords of unlinked assertions, most frequent first
    Backlog,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Print built-in defaults instead of the loaded configuration
    #[arg(long)]
    pub defaults: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
