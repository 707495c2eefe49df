//! Request and report types for ingestion

use attest_audit::UnlinkedAlert;
use attest_domain::{ExtractedAssertion, FactId, MaturityTransition, PromotionStatus, Tension, TextUnit};
use serde::{Deserialize, Serialize};

/// One unit with the assertions extracted from it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// Source unit, with its inherited context
    pub unit: TextUnit,

    /// Assertions extracted from the unit
    #[serde(default)]
    pub assertions: Vec<ExtractedAssertion>,
}

/// What happened to one assertion
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionOutcome {
    /// Assertion text
    pub text: String,

    /// Promotion status
    pub status: PromotionStatus,

    /// Reason code
    pub reason: &'static str,

    /// Claim key the assertion resolved to, if any
    pub claim_key: Option<String>,

    /// Extracted value, rendered
    pub value: Option<String>,

    /// Stored fact, for accepted assertions
    pub fact_id: Option<FactId>,

    /// Whether a new fact was created (false on merge)
    pub created: bool,
}

/// Result of ingesting one unit
#[derive(Debug, Clone, Default)]
pub struct UnitReport {
    /// Document id
    pub document_id: String,

    /// Unit id
    pub unit_id: String,

    /// One outcome per assertion, in input order
    pub outcomes: Vec<AssertionOutcome>,

    /// Tensions found between new linked facts and existing ones
    pub tensions: Vec<Tension>,

    /// Maturity changes caused by the unit
    pub transitions: Vec<MaturityTransition>,
}

/// A unit whose processing halted
#[derive(Debug, Clone, PartialEq)]
pub struct UnitFailure {
    /// Document id
    pub document_id: String,

    /// Unit id
    pub unit_id: String,

    /// Error message
    pub error: String,
}

/// Result of an ingestion run
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Per-unit results, in input order
    pub units: Vec<UnitReport>,

    /// Units that failed
    pub failures: Vec<UnitFailure>,

    /// Unlinked-rate alert raised after the run
    pub alert: Option<UnlinkedAlert>,
}

impl IngestReport {
    /// Assertions with the given status
    pub fn count(&self, status: PromotionStatus) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.outcomes.iter())
            .filter(|o| o.status == status)
            .count()
    }

    /// Facts created
    pub fn created(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.outcomes.iter())
            .filter(|o| o.created)
            .count()
    }

    /// Accepted assertions merged into existing facts
    pub fn merged(&self) -> usize {
        self.units
            .iter()
            .flat_map(|u| u.outcomes.iter())
            .filter(|o| o.fact_id.is_some() && !o.created)
            .count()
    }

    /// All tensions found during the run
    pub fn tensions(&self) -> impl Iterator<Item = &Tension> {
        self.units.iter().flat_map(|u| u.tensions.iter())
    }
}
