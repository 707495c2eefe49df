//! Attest Janitor
//!
//! Claim key lifecycle management.
//!
//! # Overview
//!
//! The lifecycle manager is responsible for:
//! - **Maturity recompute**: deriving a key's status from its linked-fact and
//!   distinct-document counts whenever its supporting set changes
//! - **Deprecation**: the one manual transition, with an optional successor key
//! - **Sweeps**: recomputing every key and reporting transitions
//! - **Metrics**: counting transitions for monitoring
//!
//! ## Maturity
//!
//! | Status | Condition |
//! |--------|-----------|
//! | **Orphan** | no linked facts |
//! | **Emergent** | fewer distinct documents than `comparable_min_documents` |
//! | **Comparable** | at least `comparable_min_documents` distinct documents |
//! | **Deprecated** | manual only, never assigned or cleared by recompute |
//!
//! # Configuration
//!
//! ```toml
//! [lifecycle]
//! comparable_min_documents = 2
//! flag_contradictions = true
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod metrics;

pub use config::LifecycleConfig;
pub use error::LifecycleError;
pub use manager::{LifecycleManager, SweepReport};
pub use metrics::LifecycleMetrics;
