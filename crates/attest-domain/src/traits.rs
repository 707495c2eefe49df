//! Trait definitions for external interactions
//!
//! The engine consumes storage through this boundary. Implementations live
//! in other crates (attest-store).

use crate::assertion::TextUnit;
use crate::claim_key::{ClaimKey, ClaimKeyDraft, MaturityPolicy, MaturityTransition};
use crate::context::ContextFrame;
use crate::fact::{Fact, PromotionStatus};
use crate::id::FactId;

/// Trait for storing facts, claim keys and the units they came from
///
/// Implemented by the infrastructure layer (attest-store)
pub trait FactStore {
    /// Error type for store operations
    type Error;

    /// Record a text unit (idempotent per document/unit id)
    fn put_unit(&mut self, unit: &TextUnit) -> Result<(), Self::Error>;

    /// Units whose text contains any of the terms, optionally restricted to
    /// units whose context overlaps `context`
    fn search_units(
        &self,
        terms: &[String],
        context: Option<&ContextFrame>,
        limit: usize,
    ) -> Result<Vec<TextUnit>, Self::Error>;

    /// Merge-if-exists-else-create, keyed by fingerprint
    ///
    /// Must be atomic: concurrent writers racing on one fingerprint end with
    /// exactly one stored fact.
    fn upsert_fact(&mut self, fact: Fact) -> Result<UpsertOutcome, Self::Error>;

    /// Get a fact by ID
    fn get_fact(&self, id: FactId) -> Result<Option<Fact>, Self::Error>;

    /// Query facts matching criteria
    fn query_facts(&self, query: &FactQuery) -> Result<Vec<Fact>, Self::Error>;

    /// Get a claim key, creating it as orphan on first use
    fn ensure_claim_key(&mut self, draft: &ClaimKeyDraft) -> Result<ClaimKey, Self::Error>;

    /// Get a claim key by machine key
    fn get_claim_key(&self, machine_key: &str) -> Result<Option<ClaimKey>, Self::Error>;

    /// Claim keys whose machine key contains `fragment` (all keys when empty)
    fn find_claim_keys(&self, fragment: &str) -> Result<Vec<ClaimKey>, Self::Error>;

    /// Recount a key's supporting facts and store its new maturity
    ///
    /// The counts are read in the same transaction that writes the status.
    /// Returns `None` when the key does not exist.
    fn recompute_claim_key(
        &mut self,
        machine_key: &str,
        policy: &MaturityPolicy,
    ) -> Result<Option<MaturityTransition>, Self::Error>;

    /// Mark a key deprecated, optionally naming its successor
    fn deprecate_claim_key(
        &mut self,
        machine_key: &str,
        superseded_by: Option<&str>,
    ) -> Result<Option<ClaimKey>, Self::Error>;

    /// Set the contradiction flag on a key
    fn flag_contradiction(&mut self, machine_key: &str) -> Result<(), Self::Error>;
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// No fact had this fingerprint
    Created(FactId),
    /// Provenance was merged into an existing fact
    Merged {
        /// Existing fact
        id: FactId,
        /// Whether the incoming confidence replaced the stored one
        upgraded: bool,
    },
}

impl UpsertOutcome {
    /// ID of the stored fact
    pub fn id(&self) -> FactId {
        match self {
            UpsertOutcome::Created(id) => *id,
            UpsertOutcome::Merged { id, .. } => *id,
        }
    }

    /// Whether a new fact was created
    pub fn is_created(&self) -> bool {
        matches!(self, UpsertOutcome::Created(_))
    }
}

/// Query criteria for retrieving facts
#[derive(Debug, Clone, Default)]
pub struct FactQuery {
    /// Filter by claim key (exact)
    pub claim_key: Option<String>,

    /// Keep only facts whose context overlaps this frame
    pub context: Option<ContextFrame>,

    /// Filter by promotion status
    pub status: Option<PromotionStatus>,

    /// Filter by source document
    pub document_id: Option<String>,

    /// Maximum results to return
    pub limit: Option<usize>,
}

impl FactQuery {
    /// Linked facts for one claim key
    pub fn for_key(machine_key: impl Into<String>) -> Self {
        Self {
            claim_key: Some(machine_key.into()),
            status: Some(PromotionStatus::Linked),
            ..Default::default()
        }
    }

    /// Restrict to an overlapping context
    pub fn in_context(mut self, context: Option<ContextFrame>) -> Self {
        self.context = context;
        self
    }
}
