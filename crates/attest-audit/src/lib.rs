//! Attest Audit
//!
//! Exhaustive record of promotion decisions. Every accept, reject and unlink
//! produces one JSON line, so the extraction pipeline can be audited after
//! the fact and the pattern registry grown from what it failed to link.
//!
//! # Examples
//!
//! ```
//! use attest_audit::{AuditAction, AuditConfig, AuditLog, AuditRecord};
//! use attest_domain::{ContextFrame, PromotionStatus};
//!
//! let log = AuditLog::in_memory("acme", AuditConfig::default()).unwrap();
//! log.record(&AuditRecord {
//!     timestamp: 0,
//!     tenant: "acme".into(),
//!     document_id: "whitepaper".into(),
//!     unit_id: "p4-2".into(),
//!     action: AuditAction::Accept,
//!     reason: "no_pattern_match".into(),
//!     text: "Escrow agreements are available on request".into(),
//!     value: None,
//!     claim_key: None,
//!     context: ContextFrame::new(),
//!     status: PromotionStatus::Unlinked,
//!     confidence: 0.7,
//! }).unwrap();
//!
//! let stats = log.stats().unwrap();
//! assert_eq!(stats.unlinked, 1);
//! println!("{}", log.backlog().unwrap().to_markdown());
//! ```

#![warn(missing_docs)]

mod backlog;
mod config;
mod error;
mod log;
mod record;
mod registry;
mod stats;

pub use backlog::{BacklogEntry, BacklogReport};
pub use config::AuditConfig;
pub use error::AuditError;
pub use log::AuditLog;
pub use record::{AuditAction, AuditRecord};
pub use registry::AuditRegistry;
pub use stats::{AuditStats, UnlinkedAlert};
