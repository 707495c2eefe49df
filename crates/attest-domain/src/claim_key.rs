//! Claim keys - canonical identities of factual questions

use crate::id::ClaimKeyId;
use crate::value::ValueKind;
use serde::{Deserialize, Serialize};

/// Maturity of a claim key
///
/// Keys move between the first three states automatically as supporting
/// facts change:
/// - Orphan: no linked facts
/// - Emergent: supported by fewer documents than the comparable threshold
/// - Comparable: supported by enough distinct documents to cross-check
///
/// Deprecated is entered manually (superseded by a newer key) and is never
/// assigned or cleared by recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Maturity {
    /// Few supporting documents
    Emergent,
    /// Enough distinct documents to compare
    Comparable,
    /// No linked facts
    Orphan,
    /// Superseded (manual only)
    Deprecated,
}

impl Maturity {
    /// Get the maturity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Maturity::Emergent => "emergent",
            Maturity::Comparable => "comparable",
            Maturity::Orphan => "orphan",
            Maturity::Deprecated => "deprecated",
        }
    }

    /// Parse a maturity from a string (internal use)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "emergent" => Some(Maturity::Emergent),
            "comparable" => Some(Maturity::Comparable),
            "orphan" => Some(Maturity::Orphan),
            "deprecated" => Some(Maturity::Deprecated),
            _ => None,
        }
    }
}

impl std::str::FromStr for Maturity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid maturity: {}", s))
    }
}

/// Counts a maturity decision is made from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyStats {
    /// Facts linked to the key
    pub linked_facts: usize,
    /// Distinct documents across those facts' provenance
    pub distinct_documents: usize,
}

/// Maturity transition rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityPolicy {
    /// Distinct documents needed for `Comparable`
    pub comparable_min_documents: usize,
}

impl Default for MaturityPolicy {
    fn default() -> Self {
        Self {
            comparable_min_documents: 2,
        }
    }
}

impl MaturityPolicy {
    /// Classify a key from its counts
    ///
    /// Pure: the same stats and current status always give the same result,
    /// whatever order the supporting facts arrived in.
    ///
    /// # Examples
    ///
    /// ```
    /// use attest_domain::{KeyStats, Maturity, MaturityPolicy};
    ///
    /// let policy = MaturityPolicy::default();
    /// let stats = KeyStats { linked_facts: 3, distinct_documents: 2 };
    /// assert_eq!(policy.classify(stats, Maturity::Emergent), Maturity::Comparable);
    /// assert_eq!(policy.classify(stats, Maturity::Deprecated), Maturity::Deprecated);
    /// ```
    pub fn classify(&self, stats: KeyStats, current: Maturity) -> Maturity {
        if current == Maturity::Deprecated {
            return Maturity::Deprecated;
        }
        if stats.linked_facts == 0 {
            Maturity::Orphan
        } else if stats.distinct_documents < self.comparable_min_documents {
            Maturity::Emergent
        } else {
            Maturity::Comparable
        }
    }
}

/// Result of recomputing one key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityTransition {
    /// Machine key
    pub machine_key: String,
    /// Status before the recompute
    pub from: Maturity,
    /// Status after the recompute
    pub to: Maturity,
    /// Counts the decision was made from
    pub stats: KeyStats,
}

impl MaturityTransition {
    /// Whether the status changed
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// What the key resolver knows about a key before it is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimKeyDraft {
    /// Machine key (e.g. `security.tls.min_version`)
    pub machine_key: String,
    /// Canonical question text
    pub question: String,
    /// Domain tag
    pub domain: String,
    /// Value kind answers are expected to carry
    pub expected_kind: Option<ValueKind>,
}

/// A stored claim key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimKey {
    /// Unique identifier
    pub id: ClaimKeyId,
    /// Machine key
    pub machine_key: String,
    /// Canonical question text
    pub question: String,
    /// Domain tag
    pub domain: String,
    /// Expected value kind
    pub expected_kind: Option<ValueKind>,
    /// Maturity status
    pub maturity: Maturity,
    /// Number of linked facts
    pub supporting_facts: usize,
    /// Number of distinct supporting documents
    pub distinct_documents: usize,
    /// Set when two linked facts are in hard tension
    pub contradiction: bool,
    /// Newer key that replaced this one
    pub superseded_by: Option<String>,
    /// Creation timestamp (seconds since Unix epoch)
    pub created_at: u64,
    /// Last status recompute (seconds since Unix epoch)
    pub updated_at: u64,
}

impl ClaimKey {
    /// Create a fresh orphan key from a resolver draft
    pub fn from_draft(draft: &ClaimKeyDraft, now: u64) -> Self {
        Self {
            id: ClaimKeyId::new(),
            machine_key: draft.machine_key.clone(),
            question: draft.question.clone(),
            domain: draft.domain.clone(),
            expected_kind: draft.expected_kind,
            maturity: Maturity::Orphan,
            supporting_facts: 0,
            distinct_documents: 0,
            contradiction: false,
            superseded_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Current counts
    pub fn stats(&self) -> KeyStats {
        KeyStats {
            linked_facts: self.supporting_facts,
            distinct_documents: self.distinct_documents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maturity_transitions() {
        let policy = MaturityPolicy::default();
        let stats = |facts, docs| KeyStats {
            linked_facts: facts,
            distinct_documents: docs,
        };

        assert_eq!(policy.classify(stats(0, 0), Maturity::Comparable), Maturity::Orphan);
        assert_eq!(policy.classify(stats(4, 1), Maturity::Orphan), Maturity::Emergent);
        assert_eq!(policy.classify(stats(2, 2), Maturity::Emergent), Maturity::Comparable);
    }

    #[test]
    fn test_deprecated_is_sticky() {
        let policy = MaturityPolicy::default();
        for stats in [KeyStats::default(), KeyStats { linked_facts: 9, distinct_documents: 9 }] {
            assert_eq!(policy.classify(stats, Maturity::Deprecated), Maturity::Deprecated);
        }
    }

    #[test]
    fn test_maturity_parse() {
        assert_eq!("Comparable".parse::<Maturity>().unwrap(), Maturity::Comparable);
        assert!("retired".parse::<Maturity>().is_err());
    }
}
