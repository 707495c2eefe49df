//! Provenance tracking for facts

use crate::assertion::Position;
use serde::{Deserialize, Serialize};

/// One mention of a fact in the corpus
///
/// Facts accumulate provenance when the same fingerprint is re-extracted;
/// they are never duplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source document identifier
    pub document_id: String,

    /// Unit identifier within the document
    pub unit_id: String,

    /// Position of the mention
    pub position: Position,

    /// When this mention was recorded (seconds since Unix epoch)
    pub recorded_at: u64,
}

impl SourceRef {
    /// Create a new source reference
    pub fn new(document_id: String, unit_id: String, position: Position, recorded_at: u64) -> Self {
        Self {
            document_id,
            unit_id,
            position,
            recorded_at,
        }
    }

    /// Whether two references point at the same mention (timestamps ignored)
    pub fn same_mention(&self, other: &SourceRef) -> bool {
        self.document_id == other.document_id
            && self.unit_id == other.unit_id
            && self.position == other.position
    }

    /// Short `document#unit@page` label for explanations
    pub fn label(&self) -> String {
        format!("{}#{}@p{}", self.document_id, self.unit_id, self.position.page)
    }
}
