//! Typed values extracted from short text spans

use serde::{Deserialize, Serialize};
use std::fmt;

/// The bounded set of value kinds the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Plain or unit-bearing number, normalized to a base unit
    Number,
    /// Percentage, normalized to a 0..1 fraction
    Percent,
    /// Dotted version with at most three components
    Version,
    /// Affirmative / negative marker
    Boolean,
    /// Token from a fixed vocabulary (`class:token`)
    Token,
}

impl ValueKind {
    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Percent => "percent",
            ValueKind::Version => "version",
            ValueKind::Boolean => "boolean",
            ValueKind::Token => "token",
        }
    }

    /// Parse a kind from its string name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "number" => Some(ValueKind::Number),
            "percent" => Some(ValueKind::Percent),
            "version" => Some(ValueKind::Version),
            "boolean" | "bool" => Some(ValueKind::Boolean),
            "token" | "enum" => Some(ValueKind::Token),
            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison operator inferred from qualifiers around a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// Exact value (default)
    Eq,
    /// "at least", "minimum"
    Ge,
    /// "at most", "maximum", "up to"
    Le,
    /// "above", "over", "more than"
    Gt,
    /// "below", "under", "less than"
    Lt,
    /// "approximately", "about"
    Approx,
}

impl Operator {
    /// Symbolic form used in canonical strings and explanations
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Approx => "~",
        }
    }

    /// Parse from the symbolic form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "=" => Some(Operator::Eq),
            ">=" => Some(Operator::Ge),
            "<=" => Some(Operator::Le),
            ">" => Some(Operator::Gt),
            "<" => Some(Operator::Lt),
            "~" => Some(Operator::Approx),
            _ => None,
        }
    }

    /// Whether the operator states a lower bound
    pub fn is_minimum(&self) -> bool {
        matches!(self, Operator::Ge | Operator::Gt)
    }

    /// Whether the operator states an upper bound
    pub fn is_maximum(&self) -> bool {
        matches!(self, Operator::Le | Operator::Lt)
    }
}

/// How far a value may be trusted in comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparability {
    /// Exact comparison
    Strict,
    /// Comparison with a widened tolerance (approximate or unit-less)
    Loose,
    /// Never compared (ranges, partial expressions)
    None,
}

impl Comparability {
    /// Get the name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparability::Strict => "strict",
            Comparability::Loose => "loose",
            Comparability::None => "none",
        }
    }

    /// Parse from the string name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Comparability::Strict),
            "loose" => Some(Comparability::Loose),
            "none" => Some(Comparability::None),
            _ => None,
        }
    }
}

/// Normalized representation of a value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum NormalizedValue {
    /// Numbers (base unit) and percents (fraction)
    Float(f64),
    /// Version components, at most three
    Version(Vec<u32>),
    /// Boolean markers
    Bool(bool),
    /// Canonical `class:token`
    Token(String),
}

impl NormalizedValue {
    /// Canonical string form, stable across runs
    ///
    /// Versions are padded to three components so `1.2` and `1.2.0`
    /// fingerprint identically.
    pub fn canonical(&self) -> String {
        match self {
            NormalizedValue::Float(f) => format!("{}", f),
            NormalizedValue::Version(parts) => pad_version(parts)
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join("."),
            NormalizedValue::Bool(b) => b.to_string(),
            NormalizedValue::Token(t) => t.clone(),
        }
    }

    /// Rebuild a normalized value from its canonical string
    pub fn parse(kind: ValueKind, s: &str) -> Option<Self> {
        match kind {
            ValueKind::Number | ValueKind::Percent => s.parse::<f64>().ok().map(NormalizedValue::Float),
            ValueKind::Version => s
                .split('.')
                .map(|p| p.parse::<u32>().ok())
                .collect::<Option<Vec<_>>>()
                .filter(|parts| !parts.is_empty() && parts.len() <= 3)
                .map(NormalizedValue::Version),
            ValueKind::Boolean => s.parse::<bool>().ok().map(NormalizedValue::Bool),
            ValueKind::Token => (!s.is_empty()).then(|| NormalizedValue::Token(s.to_string())),
        }
    }

    fn fits(&self, kind: ValueKind) -> bool {
        matches!(
            (kind, self),
            (ValueKind::Number, NormalizedValue::Float(_))
                | (ValueKind::Percent, NormalizedValue::Float(_))
                | (ValueKind::Version, NormalizedValue::Version(_))
                | (ValueKind::Boolean, NormalizedValue::Bool(_))
                | (ValueKind::Token, NormalizedValue::Token(_))
        )
    }
}

/// Pad version components to three for comparison and canonical form
pub fn pad_version(parts: &[u32]) -> [u32; 3] {
    let mut padded = [0u32; 3];
    for (slot, part) in padded.iter_mut().zip(parts.iter()) {
        *slot = *part;
    }
    padded
}

/// A typed value extracted from text
///
/// Immutable once computed: fields are private and only readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    kind: ValueKind,
    raw: String,
    normalized: NormalizedValue,
    unit: Option<String>,
    operator: Operator,
    comparability: Comparability,
}

impl TypedValue {
    /// Build a typed value, checking that the normalized form fits the kind
    ///
    /// A kind without a matching normalized form is an internal defect, so
    /// this returns an error rather than a degraded value.
    pub fn new(
        kind: ValueKind,
        raw: impl Into<String>,
        normalized: NormalizedValue,
        unit: Option<String>,
        operator: Operator,
        comparability: Comparability,
    ) -> Result<Self, String> {
        if !normalized.fits(kind) {
            return Err(format!(
                "normalized form {:?} does not fit value kind {}",
                normalized, kind
            ));
        }
        if let NormalizedValue::Version(parts) = &normalized {
            if parts.is_empty() || parts.len() > 3 {
                return Err(format!("version must have 1-3 components, got {}", parts.len()));
            }
        }
        if let NormalizedValue::Float(f) = &normalized {
            if !f.is_finite() {
                return Err(format!("non-finite number {}", f));
            }
        }

        Ok(Self {
            kind,
            raw: raw.into(),
            normalized,
            unit,
            operator,
            comparability,
        })
    }

    /// Value kind
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Raw matched text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Normalized representation
    pub fn normalized(&self) -> &NormalizedValue {
        &self.normalized
    }

    /// Base unit, if any
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Comparison operator
    pub fn operator(&self) -> Operator {
        self.operator
    }

    /// Comparability tier
    pub fn comparability(&self) -> Comparability {
        self.comparability
    }

    /// Numeric magnitude for number and percent kinds
    pub fn as_f64(&self) -> Option<f64> {
        match self.normalized {
            NormalizedValue::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Canonical string used in fingerprints: `kind:op:value[@unit]`
    pub fn canonical(&self) -> String {
        let mut s = format!(
            "{}:{}:{}",
            self.kind.as_str(),
            self.operator.symbol(),
            self.normalized.canonical()
        );
        if let Some(unit) = &self.unit {
            s.push('@');
            s.push_str(unit);
        }
        s
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Eq => write!(f, "{}", self.normalized.canonical())?,
            op => write!(f, "{} {}", op.symbol(), self.normalized.canonical())?,
        }
        if let Some(unit) = &self.unit {
            write!(f, " {}", unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let result = TypedValue::new(
            ValueKind::Version,
            "1.2",
            NormalizedValue::Float(1.2),
            None,
            Operator::Eq,
            Comparability::Strict,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_version_component_limit() {
        let result = TypedValue::new(
            ValueKind::Version,
            "1.2.3.4",
            NormalizedValue::Version(vec![1, 2, 3, 4]),
            None,
            Operator::Eq,
            Comparability::Strict,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_version_canonical_is_padded() {
        let short = NormalizedValue::Version(vec![1, 2]);
        let long = NormalizedValue::Version(vec![1, 2, 0]);
        assert_eq!(short.canonical(), "1.2.0");
        assert_eq!(short.canonical(), long.canonical());
    }

    #[test]
    fn test_canonical_includes_operator_and_unit() {
        let value = TypedValue::new(
            ValueKind::Number,
            "at least 30 days",
            NormalizedValue::Float(30.0),
            Some("d".to_string()),
            Operator::Ge,
            Comparability::Strict,
        )
        .unwrap();
        assert_eq!(value.canonical(), "number:>=:30@d");
        assert_eq!(value.to_string(), ">= 30 d");
    }

    #[test]
    fn test_normalized_parse_round_trip() {
        let cases = [
            (ValueKind::Percent, NormalizedValue::Float(0.999)),
            (ValueKind::Version, NormalizedValue::Version(vec![1, 2, 0])),
            (ValueKind::Boolean, NormalizedValue::Bool(false)),
            (ValueKind::Token, NormalizedValue::Token("frequency:daily".to_string())),
        ];
        for (kind, value) in cases {
            assert_eq!(NormalizedValue::parse(kind, &value.canonical()), Some(value));
        }
    }

    #[test]
    fn test_operator_bounds() {
        assert!(Operator::Ge.is_minimum());
        assert!(Operator::Gt.is_minimum());
        assert!(Operator::Le.is_maximum());
        assert!(!Operator::Eq.is_minimum());
        assert!(!Operator::Approx.is_maximum());
    }
}
