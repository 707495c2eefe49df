//! Challenge command implementation.

use crate::cli::ChallengeArgs;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::fs;
use std::io::{self, Read};

/// Execute the challenge command.
pub async fn execute_challenge(args: ChallengeArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let text = match (args.text, args.file) {
        (Some(text), _) => text,
        (None, Some(file_path)) => fs::read_to_string(file_path)?,
        (None, None) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Err(CliError::InvalidInput("Nothing to challenge".to_string()));
    }

    let response = engine
        .challenger()?
        .challenge(&text, args.context.to_frame(), !args.no_missing)
        .await?;

    println!("{}", formatter.format_challenge(&response)?);

    Ok(())
}
