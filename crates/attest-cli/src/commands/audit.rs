//! Audit command implementation.

use crate::cli::{AuditAction, AuditArgs};
use crate::engine::Engine;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the audit command.
pub async fn execute_audit(args: AuditArgs, engine: &Engine, formatter: &Formatter) -> Result<()> {
    let audit = engine.audit();

    match args.action {
        AuditAction::Stats => {
            let stats = audit.stats()?;
            println!("{}", formatter.format_stats(audit.tenant(), &stats)?);
            if let Some(alert) = audit.check_unlinked_rate()? {
                println!("{}", formatter.format_alert(&alert)?);
            }
        }
        AuditAction::Backlog => {
            let backlog = audit.backlog()?;
            println!("{}", formatter.format_backlog(&backlog)?);
        }
    }

    Ok(())
}
