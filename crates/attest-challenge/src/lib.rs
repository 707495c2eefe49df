//! Attest Challenge
//!
//! Answers questions against the fact corpus without inventing anything:
//!
//! - [`Challenger`] checks free text claim by claim and returns one verdict
//!   per claim (confirmed, contradicted, partial, missing, unmapped).
//! - [`DecisionBuilder`] assembles a [`DecisionPackage`](attest_domain::DecisionPackage)
//!   for a business question from the claim keys it depends on.
//! - [`GapQualifier`] backs every missing claim with documentary evidence,
//!   or fails with [`ChallengeError::GapDefect`].
//!
//! # Example Usage
//!
//! ```no_run
//! use attest_challenge::{ChallengeConfig, Challenger};
//! use attest_extractor::default_registry;
//! use attest_store::SqliteStore;
//! use std::sync::{Arc, Mutex};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(Mutex::new(SqliteStore::new("attest.db")?));
//! let challenger = Challenger::new(store, default_registry(), ChallengeConfig::default())?;
//!
//! let response = challenger.challenge("TLS 1.3 is used. MFA is enforced.", None, true).await?;
//! for m in &response.matches {
//!     println!("{}: {}", m.claim, m.status.as_str());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod challenger;
mod config;
mod decision;
mod error;
mod gap;
mod types;

pub use challenger::Challenger;
pub use config::ChallengeConfig;
pub use decision::DecisionBuilder;
pub use error::ChallengeError;
pub use gap::{search_terms, GapQualifier};
pub use types::{ChallengeResponse, ChallengeStatus, ChallengeSummary, ClaimMatch};
