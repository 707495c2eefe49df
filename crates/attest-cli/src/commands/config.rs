//! Config command implementation.

use crate::cli::ConfigArgs;
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::output::Formatter;

/// Execute the config command.
///
/// Prints TOML in table mode so the output can be saved as a config file.
pub async fn execute_config(args: ConfigArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let defaults;
    let shown = if args.defaults {
        defaults = Config::default();
        &defaults
    } else {
        config
    };

    match formatter.format() {
        OutputFormat::Json => println!("{}", formatter.json(shown)?),
        OutputFormat::Table => print!("{}", shown.to_toml()?),
    }

    Ok(())
}
