//! Decide command implementation.

use crate::cli::DecideArgs;
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the decide command.
pub async fn execute_decide(args: DecideArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let keys = normalize_keys(&args.keys)?;
    let context = args.context.to_frame();
    let builder = engine.decisions()?;
    let question = args.question;

    let package = tokio::task::spawn_blocking(move || builder.decide(&question, &keys, context.as_ref()))
        .await
        .map_err(|e| CliError::Task(e.to_string()))??;

    println!("{}", formatter.format_decision(&package)?);

    Ok(())
}

/// Trim keys and drop duplicates, keeping the first occurrence.
fn normalize_keys(keys: &[String]) -> Result<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(keys.len());
    for key in keys {
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::InvalidInput("Claim keys must not be empty".to_string()));
        }
        if !normalized.iter().any(|k| k == key) {
            normalized.push(key.to_string());
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_are_dropped_in_order() {
        let keys = vec![
            " security.tls.min_version".to_string(),
            "security.mfa.required".to_string(),
            "security.tls.min_version".to_string(),
        ];
        assert_eq!(
            normalize_keys(&keys).unwrap(),
            vec!["security.tls.min_version", "security.mfa.required"]
        );
    }

    #[test]
    fn test_blank_key_is_rejected() {
        assert!(normalize_keys(&["  ".to_string()]).is_err());
    }
}
