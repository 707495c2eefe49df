//! Append-only tenant audit log

use crate::backlog::BacklogReport;
use crate::record::AuditRecord;
use crate::stats::{AuditStats, UnlinkedAlert};
use crate::{AuditConfig, AuditError};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

enum Sink {
    File { file: File, path: PathBuf },
    Memory(Mutex<Vec<String>>),
}

/// Audit log for one tenant
///
/// Records are JSON lines. On a file sink each record is a single
/// `write_all` on a file opened with `O_APPEND`, so concurrent writers never
/// interleave partial lines and no lock is taken. Statistics are computed on
/// demand from the records, never maintained incrementally.
pub struct AuditLog {
    tenant: String,
    config: AuditConfig,
    sink: Sink,
}

impl AuditLog {
    /// Open (or create) a file-backed log
    pub fn open(tenant: impl Into<String>, path: impl AsRef<Path>, config: AuditConfig) -> Result<Self, AuditError> {
        config.validate().map_err(AuditError::Config)?;
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            tenant: tenant.into(),
            config,
            sink: Sink::File { file, path },
        })
    }

    /// Create an in-memory log
    pub fn in_memory(tenant: impl Into<String>, config: AuditConfig) -> Result<Self, AuditError> {
        config.validate().map_err(AuditError::Config)?;
        Ok(Self {
            tenant: tenant.into(),
            config,
            sink: Sink::Memory(Mutex::new(Vec::new())),
        })
    }

    /// Tenant id
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            Sink::File { path, .. } => Some(path),
            Sink::Memory(_) => None,
        }
    }

    /// Append one record
    pub fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        match &self.sink {
            Sink::File { file, .. } => {
                let mut handle: &File = file;
                handle.write_all(line.as_bytes())?;
            }
            Sink::Memory(lines) => {
                lines
                    .lock()
                    .map_err(|e| AuditError::Sink(e.to_string()))?
                    .push(line);
            }
        }
        Ok(())
    }

    /// Read every record back
    pub fn records(&self) -> Result<Vec<AuditRecord>, AuditError> {
        match &self.sink {
            Sink::File { path, .. } => {
                let reader = BufReader::new(File::open(path)?);
                let mut records = Vec::new();
                for line in reader.lines() {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    records.push(serde_json::from_str(&line)?);
                }
                Ok(records)
            }
            Sink::Memory(lines) => {
                let lines = lines.lock().map_err(|e| AuditError::Sink(e.to_string()))?;
                lines
                    .iter()
                    .map(|line| serde_json::from_str(line).map_err(AuditError::from))
                    .collect()
            }
        }
    }

    /// Aggregate statistics
    pub fn stats(&self) -> Result<AuditStats, AuditError> {
        Ok(AuditStats::from_records(&self.records()?))
    }

    /// Evaluate the unlinked-rate alert, logging a warning when raised
    ///
    /// A raised alert carries the missing-pattern backlog built from the same
    /// records.
    pub fn check_unlinked_rate(&self) -> Result<Option<UnlinkedAlert>, AuditError> {
        let records = self.records()?;
        let stats = AuditStats::from_records(&records);
        if stats.accepted < self.config.alert_min_sample {
            return Ok(None);
        }

        let rate = stats.unlinked_rate();
        if rate <= self.config.unlinked_alert_threshold {
            return Ok(None);
        }

        warn!(
            "Tenant {}: {:.1}% of {} accepted assertions are unlinked (threshold {:.1}%)",
            self.tenant,
            rate * 100.0,
            stats.accepted,
            self.config.unlinked_alert_threshold * 100.0
        );
        Ok(Some(UnlinkedAlert {
            tenant: self.tenant.clone(),
            rate,
            threshold: self.config.unlinked_alert_threshold,
            sample: stats.accepted,
            backlog: self.build_backlog(&records),
        }))
    }

    /// Keyword backlog of unlinked assertions
    pub fn backlog(&self) -> Result<BacklogReport, AuditError> {
        Ok(self.build_backlog(&self.records()?))
    }

    fn build_backlog(&self, records: &[AuditRecord]) -> BacklogReport {
        BacklogReport::build(
            &self.tenant,
            records,
            self.config.backlog_top_n,
            self.config.min_keyword_length,
        )
    }
}
