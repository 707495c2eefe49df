//! Attest CLI - Command-line interface for the Attest verification engine.

use attest_cli::commands;
use attest_cli::{Cli, Command, Config, Engine, Formatter};
use clap::Parser;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> attest_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref().map(Path::new))?;

    // Determine output format
    let format = cli.format.map(Into::into).unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Config(args) => {
            commands::execute_config(args, &config, &formatter).await?;
        }
        cmd => {
            // Commands that need the store and the tenant's audit log
            let database = config.database_path(cli.db.as_deref())?;
            let tenant = cli.tenant.unwrap_or_else(|| config.settings.tenant.clone());
            let engine = Engine::open(config, &database, &tenant)?;

            match cmd {
                Command::Ingest(args) => commands::execute_ingest(args, &engine, &formatter).await?,
                Command::Challenge(args) => commands::execute_challenge(args, &engine, &formatter).await?,
                Command::Decide(args) => commands::execute_decide(args, &engine, &formatter).await?,
                Command::Keys(args) => commands::execute_keys(args, &engine, &formatter).await?,
                Command::Audit(args) => commands::execute_audit(args, &engine, &formatter).await?,
                Command::Config(_) => unreachable!(),
            }
        }
    }

    Ok(())
}
