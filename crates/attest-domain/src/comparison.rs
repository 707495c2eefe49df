//! Value comparison (pure, bounded time)
//!
//! The soft/hard split is the anti-false-positive guarantee: a value that is
//! stricter than a stated minimum or maximum is compatible with it and is
//! reported as soft tension, never as a contradiction. Only an explicit
//! mismatch under matching kinds is hard.

use crate::fact::Fact;
use crate::id::FactId;
use crate::value::{pad_version, Comparability, NormalizedValue, Operator, TypedValue, ValueKind};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Relative tolerance for strict numeric equality
pub const STRICT_TOLERANCE: f64 = 1e-9;

/// Relative tolerance for loose (approximate or unit-less) numeric equality
pub const LOOSE_TOLERANCE: f64 = 0.05;

/// Severity of a disagreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensionLevel {
    /// Values agree
    None,
    /// Compatible difference (over-compliance, scope variance)
    Soft,
    /// Contradiction
    Hard,
}

impl TensionLevel {
    /// Get the level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TensionLevel::None => "none",
            TensionLevel::Soft => "soft",
            TensionLevel::Hard => "hard",
        }
    }
}

/// Kind of disagreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensionNature {
    /// Values differ under matching operators
    ValueConflict,
    /// Candidate meets or exceeds a stated minimum
    ExceedsMinimum,
    /// Candidate is at or below a stated maximum
    BelowMaximum,
    /// Values differ, but the contexts never overlap
    ScopeConflict,
}

/// Result of comparing two typed values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValueComparison {
    /// Kinds, units or comparability rule out a comparison
    NotComparable {
        /// Why no comparison was made
        reason: String,
    },
    /// The values were compared
    Compared {
        /// Severity
        level: TensionLevel,
        /// Nature (absent when the values agree)
        nature: Option<TensionNature>,
        /// Human-readable explanation
        explanation: String,
    },
}

impl ValueComparison {
    /// Level if compared
    pub fn level(&self) -> Option<TensionLevel> {
        match self {
            ValueComparison::Compared { level, .. } => Some(*level),
            ValueComparison::NotComparable { .. } => None,
        }
    }

    /// Explanation or reason text
    pub fn explanation(&self) -> &str {
        match self {
            ValueComparison::Compared { explanation, .. } => explanation,
            ValueComparison::NotComparable { reason } => reason,
        }
    }
}

/// Classified disagreement between two facts sharing a claim key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tension {
    /// Kind of disagreement (absent when level is none)
    pub nature: Option<TensionNature>,
    /// Severity
    pub level: TensionLevel,
    /// Human-readable explanation
    pub explanation: String,
    /// Reference fact
    pub reference: FactId,
    /// Candidate fact
    pub candidate: FactId,
}

/// Compare a candidate value against a reference value
///
/// The reference operator decides the soft tier: a `>=`/`>` reference is
/// satisfied by any candidate at or above it, a `<=`/`<` reference by any
/// candidate at or below it.
///
/// # Examples
///
/// ```
/// use attest_domain::{compare_values, Comparability, NormalizedValue, Operator, TensionLevel, TypedValue, ValueKind};
///
/// let min = TypedValue::new(ValueKind::Version, "minimum version 1.2", NormalizedValue::Version(vec![1, 2]),
///     None, Operator::Ge, Comparability::Strict).unwrap();
/// let used = TypedValue::new(ValueKind::Version, "1.3", NormalizedValue::Version(vec![1, 3]),
///     None, Operator::Eq, Comparability::Strict).unwrap();
///
/// assert_eq!(compare_values(&min, &used).level(), Some(TensionLevel::Soft));
/// ```
pub fn compare_values(reference: &TypedValue, candidate: &TypedValue) -> ValueComparison {
    if reference.kind() != candidate.kind() {
        return ValueComparison::NotComparable {
            reason: format!(
                "value kinds differ ({} vs {})",
                reference.kind(),
                candidate.kind()
            ),
        };
    }
    if reference.comparability() == Comparability::None
        || candidate.comparability() == Comparability::None
    {
        return ValueComparison::NotComparable {
            reason: "value is a range or partial expression".to_string(),
        };
    }
    if let (Some(a), Some(b)) = (reference.unit(), candidate.unit()) {
        if a != b {
            return ValueComparison::NotComparable {
                reason: format!("units differ ({} vs {})", a, b),
            };
        }
    }

    match reference.kind() {
        ValueKind::Number | ValueKind::Percent | ValueKind::Version => {
            compare_ordered(reference, candidate)
        }
        ValueKind::Boolean | ValueKind::Token => compare_equality(reference, candidate),
    }
}

fn compare_ordered(reference: &TypedValue, candidate: &TypedValue) -> ValueComparison {
    let ordering = match (reference.normalized(), candidate.normalized()) {
        (NormalizedValue::Float(r), NormalizedValue::Float(c)) => {
            float_ordering(*r, *c, tolerance(reference, candidate))
        }
        (NormalizedValue::Version(r), NormalizedValue::Version(c)) => {
            pad_version(c).cmp(&pad_version(r))
        }
        _ => {
            return ValueComparison::NotComparable {
                reason: "normalized forms differ".to_string(),
            }
        }
    };

    let op = reference.operator();
    let (level, nature, explanation) = match ordering {
        Ordering::Equal if matches!(op, Operator::Gt | Operator::Lt) => (
            TensionLevel::Hard,
            Some(TensionNature::ValueConflict),
            format!("{} does not satisfy the strict bound {}", candidate, reference),
        ),
        Ordering::Equal => (
            TensionLevel::None,
            None,
            format!("{} matches {}", candidate, reference),
        ),
        Ordering::Greater if op.is_minimum() => (
            TensionLevel::Soft,
            Some(TensionNature::ExceedsMinimum),
            format!("{} exceeds the required minimum {}", candidate, reference),
        ),
        Ordering::Less if op.is_maximum() => (
            TensionLevel::Soft,
            Some(TensionNature::BelowMaximum),
            format!("{} stays within the maximum {}", candidate, reference),
        ),
        _ => (
            TensionLevel::Hard,
            Some(TensionNature::ValueConflict),
            format!("{} conflicts with {}", candidate, reference),
        ),
    };

    ValueComparison::Compared {
        level,
        nature,
        explanation,
    }
}

fn compare_equality(reference: &TypedValue, candidate: &TypedValue) -> ValueComparison {
    if reference.normalized() == candidate.normalized() {
        ValueComparison::Compared {
            level: TensionLevel::None,
            nature: None,
            explanation: format!("{} matches {}", candidate, reference),
        }
    } else {
        ValueComparison::Compared {
            level: TensionLevel::Hard,
            nature: Some(TensionNature::ValueConflict),
            explanation: format!("{} conflicts with {}", candidate, reference),
        }
    }
}

/// Numeric tolerance for a comparison
///
/// A stated bound is exact: loose tolerance only applies when the reference
/// asserts a value, never when it asserts a minimum or maximum.
fn tolerance(reference: &TypedValue, candidate: &TypedValue) -> f64 {
    let loose = reference.comparability() == Comparability::Loose
        || candidate.comparability() == Comparability::Loose;
    if loose && matches!(reference.operator(), Operator::Eq | Operator::Approx) {
        LOOSE_TOLERANCE
    } else {
        STRICT_TOLERANCE
    }
}

/// Ordering of `candidate` relative to `reference` within a relative tolerance
fn float_ordering(reference: f64, candidate: f64, tolerance: f64) -> Ordering {
    let scale = reference.abs().max(candidate.abs()).max(f64::MIN_POSITIVE);
    if (candidate - reference).abs() <= tolerance * scale {
        Ordering::Equal
    } else if candidate > reference {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

/// Compare two facts sharing a claim key
///
/// Returns `None` when either fact has no value or the values are not
/// comparable. Differing values from non-overlapping contexts are scope
/// variance: soft, never hard.
pub fn compare_facts(reference: &Fact, candidate: &Fact) -> Option<Tension> {
    let (ref_value, cand_value) = match (&reference.value, &candidate.value) {
        (Some(r), Some(c)) => (r, c),
        _ => return None,
    };

    match compare_values(ref_value, cand_value) {
        ValueComparison::NotComparable { .. } => None,
        ValueComparison::Compared {
            level,
            nature,
            explanation,
        } => {
            let (level, nature, explanation) = if level != TensionLevel::None
                && !reference.context.overlaps(&candidate.context)
            {
                (
                    TensionLevel::Soft,
                    Some(TensionNature::ScopeConflict),
                    format!(
                        "{} and {} apply to different scopes ({} / {})",
                        cand_value,
                        ref_value,
                        candidate.context.context_key(),
                        reference.context.context_key()
                    ),
                )
            } else {
                (level, nature, explanation)
            };

            Some(Tension {
                nature,
                level,
                explanation,
                reference: reference.id,
                candidate: candidate.id,
            })
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::Operator;
    use proptest::prelude::*;

    fn any_value() -> impl Strategy<Value = TypedValue> {
        prop_oneof![
            (0.0f64..1e6).prop_map(|v| TypedValue::new(ValueKind::Number, "n", NormalizedValue::Float(v),
                None, Operator::Eq, Comparability::Strict).unwrap()),
            (0.0f64..1.0).prop_map(|v| TypedValue::new(ValueKind::Percent, "p", NormalizedValue::Float(v),
                Some("%".to_string()), Operator::Eq, Comparability::Strict).unwrap()),
            (0u32..5, 0u32..10).prop_map(|(a, b)| TypedValue::new(ValueKind::Version, "v",
                NormalizedValue::Version(vec![a, b]), None, Operator::Ge, Comparability::Strict).unwrap()),
            any::<bool>().prop_map(|b| TypedValue::new(ValueKind::Boolean, "b", NormalizedValue::Bool(b),
                None, Operator::Eq, Comparability::Strict).unwrap()),
        ]
    }

    proptest! {
        /// Values of differing kind are never reported as a conflict
        #[test]
        fn test_kind_mismatch_never_conflicts(a in any_value(), b in any_value()) {
            prop_assume!(a.kind() != b.kind());
            let is_not_comparable = matches!(compare_values(&a, &b), ValueComparison::NotComparable { .. });
            prop_assert!(is_not_comparable);
        }

        /// A candidate at or above a `>=` reference is never hard
        #[test]
        fn test_meeting_minimum_is_never_hard(reference in 0.0f64..1e6, extra in 0.0f64..1e6) {
            let r = TypedValue::new(ValueKind::Number, "r", NormalizedValue::Float(reference),
                Some("d".to_string()), Operator::Ge, Comparability::Strict).unwrap();
            let c = TypedValue::new(ValueKind::Number, "c", NormalizedValue::Float(reference + extra),
                Some("d".to_string()), Operator::Eq, Comparability::Strict).unwrap();
            let level = compare_values(&r, &c).level();
            prop_assert!(matches!(level, Some(TensionLevel::None) | Some(TensionLevel::Soft)));
        }
    }
}
