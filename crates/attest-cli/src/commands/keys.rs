//! Keys command implementation.

use crate::cli::{KeysAction, KeysArgs};
use crate::engine::Engine;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_domain::FactStore;
use attest_store::SqliteStore;
use std::sync::{Arc, Mutex, MutexGuard};

/// Execute the keys command.
pub async fn execute_keys(args: KeysArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let store = engine.store();

    match args.action {
        KeysAction::List { fragment } => {
            let keys = lock(&store)?.find_claim_keys(fragment.as_deref().unwrap_or(""))?;
            println!("{}", formatter.format_keys(&keys)?);
        }
        KeysAction::Deprecate { key, superseded_by } => {
            let mut lifecycle = engine.lifecycle()?;
            let deprecated = lifecycle.deprecate(&mut *lock(&store)?, &key, superseded_by.as_deref())?;
            println!("{}", formatter.success(&format!("Deprecated {}", deprecated.machine_key)));
        }
        KeysAction::Sweep => {
            let mut lifecycle = engine.lifecycle()?;
            let report = lifecycle.sweep(&mut *lock(&store)?)?;
            println!("{}", formatter.format_sweep(&report)?);
        }
    }

    Ok(())
}

fn lock(store: &Arc<Mutex<SqliteStore>>) -> Result<MutexGuard<'_, SqliteStore>> {
    store
        .lock()
        .map_err(|e| CliError::Config(format!("Store lock error: {}", e)))
}
