//! Ingest command implementation.

use crate::cli::IngestArgs;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_extractor::IngestRequest;
use std::fs;
use std::io::{self, Read};

/// Execute the ingest command.
pub async fn execute_ingest(args: IngestArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    // Read units from file or stdin
    let json_data = if args.stdin {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else if let Some(file_path) = args.file {
        fs::read_to_string(file_path)?
    } else {
        return Err(CliError::InvalidInput(
            "Must specify either --file or --stdin".to_string(),
        ));
    };

    let requests = parse_requests(&json_data)?;
    let report = engine.ingestor()?.ingest(requests).await?;

    println!("{}", formatter.format_ingest(&report)?);

    if !report.failures.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "{} unit(s) could not be ingested",
            report.failures.len()
        )));
    }
    Ok(())
}

/// Parse a JSON array of units, or a single unit.
pub fn parse_requests(json_data: &str) -> Result<Vec<IngestRequest>> {
    let value: serde_json::Value = serde_json::from_str(json_data)?;
    let requests = if value.is_array() {
        serde_json::from_value::<Vec<IngestRequest>>(value)?
    } else {
        vec![serde_json::from_value::<IngestRequest>(value)?]
    };

    if requests.is_empty() {
        return Err(CliError::InvalidInput("No units provided".to_string()));
    }
    Ok(requests)
}
