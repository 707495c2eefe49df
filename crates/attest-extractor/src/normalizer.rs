//! Value normalization: typed values from short text spans
//!
//! Extractors run in a fixed priority (percent, version, number with unit,
//! boolean, enumerated token, bare number) and the first success wins.
//! [`ValueNormalizer::normalize_as`] runs the extractor of an expected kind
//! first, for text whose claim key already says what to look for.

use crate::ExtractorError;
use attest_domain::{Comparability, NormalizedValue, Operator, TypedValue, ValueKind};
use regex::{Regex, RegexBuilder};

const PERCENT: &str = r"(\d+(?:\.\d+)?)\s*(?:%|percent\b|per\s*cent\b)";

const VERSION: &str =
    r"(?:\b(?:tls|ssl|version|release)\s*v?|\bv)\s*(\d+(?:\.\d+){0,2})\b|\b(\d+\.\d+\.\d+)\b";

const QUANTITY: &str = r"(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\s*-?\s*(tib|tb|gib|gb|mib|mb|minutes?|mins?|hours?|hrs?|h|days?|weeks?|months?|years?|yrs?)\b";

const BARE_NUMBER: &str = r"\b(\d{1,3}(?:,\d{3})+|\d+(?:\.\d+)?)\b";

const RANGE: &str = r"\bbetween\s+\d+(?:\.\d+)?\s*%?\s*\w*\s+and\s+\d|\d\s*%?\s*(?:-|–|\bto\b)\s*\d";

const NEGATIVE: &str = r"\b(not required|must not|shall not|not supported|not enabled|not enforced|not encrypted|not available|disabled|optional|never|unsupported|unencrypted|unavailable)\b";

const AFFIRMATIVE: &str =
    r"\b(enabled|required|must|shall|supported|enforced|mandatory|encrypted|available)\b";

/// Qualifiers recognised anywhere in the span
const GE_ANYWHERE: &str = r"\b(?:at least|minimum|no less than|not less than|no fewer than|or (?:higher|later|above|greater|more)|and (?:higher|later|above))\b";
const LE_ANYWHERE: &str = r"\b(?:at most|maximum|up to|no more than|not more than|not exceed(?:ing)?|or (?:lower|less|fewer|below))\b";
const APPROX_ANYWHERE: &str = r"\b(?:approximately|approx|about|around|roughly|nearly)\b|~";

/// Qualifiers that only count right before the value ("over TLS" is not "> TLS")
const LE_ADJACENT: &str = r"\bwithin\s*$";
const GT_ADJACENT: &str = r"\b(?:above|over|more than|greater than|exceeding|exceeds?)\s*$";
const LT_ADJACENT: &str = r"\b(?:below|under|less than|fewer than)\s*$";

/// Fixed token vocabulary: (class, token, pattern)
const TOKEN_VOCABULARY: &[(&str, &str, &str)] = &[
    ("frequency", "continuous", r"continuous(?:ly)?|real[- ]time"),
    ("frequency", "hourly", r"hourly|every hour"),
    ("frequency", "daily", r"daily|nightly|every day|once a day"),
    ("frequency", "weekly", r"weekly|every week|once a week"),
    ("frequency", "monthly", r"monthly|every month|once a month"),
    ("frequency", "quarterly", r"quarterly|every quarter"),
    ("frequency", "annually", r"annually|yearly|every year|once a year"),
    (
        "responsibility",
        "customer",
        r"customer[- ]managed|customer responsibility|responsibility of the customer|customers? (?:is|are) responsible",
    ),
    (
        "responsibility",
        "provider",
        r"(?:provider|vendor)[- ]managed|responsibility of the (?:provider|vendor)|(?:provider|vendor) is responsible",
    ),
    ("responsibility", "shared", r"shared responsibility|jointly responsible"),
    (
        "severity",
        "critical",
        r"critical[- ](?:severity|priority|incidents?)|(?:severity|priority)\s*:?\s*critical|sev[- ]?1|p1",
    ),
    (
        "severity",
        "high",
        r"high[- ](?:severity|priority)|(?:severity|priority)\s*:?\s*high|sev[- ]?2|p2",
    ),
    (
        "severity",
        "medium",
        r"medium[- ](?:severity|priority)|(?:severity|priority)\s*:?\s*medium|sev[- ]?3|p3",
    ),
    (
        "severity",
        "low",
        r"low[- ](?:severity|priority)|(?:severity|priority)\s*:?\s*low|sev[- ]?4|p4",
    ),
    ("edition", "community", r"(?:free|community)\s+(?:edition|plan|tier)"),
    ("edition", "standard", r"standard\s+(?:edition|plan|tier)"),
    ("edition", "professional", r"(?:professional|pro)\s+(?:edition|plan|tier)"),
    ("edition", "business", r"business\s+(?:edition|plan|tier)"),
    ("edition", "enterprise", r"enterprise\s+(?:edition|plan|tier)"),
];

struct VocabularyEntry {
    class: &'static str,
    token: &'static str,
    pattern: Regex,
}

/// A value found by one extractor, before operator detection
struct Candidate {
    kind: ValueKind,
    raw: String,
    normalized: NormalizedValue,
    unit: Option<String>,
    start: usize,
}

/// Turns short text spans into [`TypedValue`]s
///
/// Pure and `Send + Sync`; all patterns are compiled once at construction.
///
/// # Examples
///
/// ```
/// use attest_extractor::ValueNormalizer;
/// use attest_domain::{Operator, ValueKind};
///
/// let normalizer = ValueNormalizer::new().unwrap();
/// let value = normalizer.normalize("TLS minimum version 1.2").unwrap().unwrap();
/// assert_eq!(value.kind(), ValueKind::Version);
/// assert_eq!(value.operator(), Operator::Ge);
/// ```
pub struct ValueNormalizer {
    percent: Regex,
    version: Regex,
    quantity: Regex,
    bare_number: Regex,
    range: Regex,
    negative: Regex,
    affirmative: Regex,
    ge_anywhere: Regex,
    le_anywhere: Regex,
    approx_anywhere: Regex,
    le_adjacent: Regex,
    gt_adjacent: Regex,
    lt_adjacent: Regex,
    vocabulary: Vec<VocabularyEntry>,
}

fn compile(pattern: &str) -> Result<Regex, ExtractorError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ExtractorError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

impl ValueNormalizer {
    /// Compile the normalizer
    pub fn new() -> Result<Self, ExtractorError> {
        let vocabulary = TOKEN_VOCABULARY
            .iter()
            .map(|&(class, token, pattern)| {
                Ok(VocabularyEntry {
                    class,
                    token,
                    pattern: compile(&format!(r"\b(?:{})\b", pattern))?,
                })
            })
            .collect::<Result<Vec<_>, ExtractorError>>()?;

        Ok(Self {
            percent: compile(PERCENT)?,
            version: compile(VERSION)?,
            quantity: compile(QUANTITY)?,
            bare_number: compile(BARE_NUMBER)?,
            range: compile(RANGE)?,
            negative: compile(NEGATIVE)?,
            affirmative: compile(AFFIRMATIVE)?,
            ge_anywhere: compile(GE_ANYWHERE)?,
            le_anywhere: compile(LE_ANYWHERE)?,
            approx_anywhere: compile(APPROX_ANYWHERE)?,
            le_adjacent: compile(LE_ADJACENT)?,
            gt_adjacent: compile(GT_ADJACENT)?,
            lt_adjacent: compile(LT_ADJACENT)?,
            vocabulary,
        })
    }

    /// Extract a value using the fixed priority order
    ///
    /// `Ok(None)` means no extractor matched. An error means a value was
    /// found but could not be represented, which is a defect.
    pub fn normalize(&self, text: &str) -> Result<Option<TypedValue>, ExtractorError> {
        let candidate = self
            .percent(text)
            .or_else(|| self.version(text))
            .or_else(|| self.quantity(text))
            .or_else(|| self.boolean(text))
            .or_else(|| self.token(text))
            .or_else(|| self.bare_number(text));

        candidate.map(|c| self.finish(text, c)).transpose()
    }

    /// Extract a value of an expected kind, falling back to [`normalize`](Self::normalize)
    pub fn normalize_as(&self, text: &str, kind: ValueKind) -> Result<Option<TypedValue>, ExtractorError> {
        let candidate = match kind {
            ValueKind::Percent => self.percent(text),
            ValueKind::Version => self.version(text),
            ValueKind::Number => self.quantity(text).or_else(|| self.bare_number(text)),
            ValueKind::Boolean => self.boolean(text),
            ValueKind::Token => self.token(text),
        };

        match candidate {
            Some(candidate) => self.finish(text, candidate).map(Some),
            None => self.normalize(text),
        }
    }

    fn finish(&self, text: &str, candidate: Candidate) -> Result<TypedValue, ExtractorError> {
        let ordered = matches!(
            candidate.kind,
            ValueKind::Number | ValueKind::Percent | ValueKind::Version
        );
        let operator = if ordered {
            self.operator(text, candidate.start)
        } else {
            Operator::Eq
        };

        let numeric = matches!(candidate.kind, ValueKind::Number | ValueKind::Percent);
        let comparability = if numeric && self.range.is_match(text) {
            Comparability::None
        } else if operator == Operator::Approx
            || (candidate.kind == ValueKind::Number && candidate.unit.is_none())
        {
            Comparability::Loose
        } else {
            Comparability::Strict
        };

        TypedValue::new(
            candidate.kind,
            candidate.raw,
            candidate.normalized,
            candidate.unit,
            operator,
            comparability,
        )
        .map_err(ExtractorError::Invariant)
    }

    fn operator(&self, text: &str, value_start: usize) -> Operator {
        let prefix = &text[..value_start];
        if self.ge_anywhere.is_match(text) {
            Operator::Ge
        } else if self.le_anywhere.is_match(text) || self.le_adjacent.is_match(prefix) {
            Operator::Le
        } else if self.gt_adjacent.is_match(prefix) {
            Operator::Gt
        } else if self.lt_adjacent.is_match(prefix) {
            Operator::Lt
        } else if self.approx_anywhere.is_match(text) {
            Operator::Approx
        } else {
            Operator::Eq
        }
    }

    fn percent(&self, text: &str) -> Option<Candidate> {
        let caps = self.percent.captures(text)?;
        let whole = caps.get(0)?;
        let number: f64 = caps.get(1)?.as_str().parse().ok()?;
        Some(Candidate {
            kind: ValueKind::Percent,
            raw: whole.as_str().to_string(),
            normalized: NormalizedValue::Float(number / 100.0),
            unit: None,
            start: whole.start(),
        })
    }

    fn version(&self, text: &str) -> Option<Candidate> {
        let caps = self.version.captures(text)?;
        let whole = caps.get(0)?;
        let digits = caps.get(1).or_else(|| caps.get(2))?;
        let parts = digits
            .as_str()
            .split('.')
            .map(|p| p.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()?;
        Some(Candidate {
            kind: ValueKind::Version,
            raw: whole.as_str().trim().to_string(),
            normalized: NormalizedValue::Version(parts),
            unit: None,
            start: digits.start(),
        })
    }

    fn quantity(&self, text: &str) -> Option<Candidate> {
        let caps = self.quantity.captures(text)?;
        let whole = caps.get(0)?;
        let number = parse_number(caps.get(1)?.as_str())?;
        let (unit, factor, divisor) = base_unit(caps.get(2)?.as_str())?;
        Some(Candidate {
            kind: ValueKind::Number,
            raw: whole.as_str().to_string(),
            normalized: NormalizedValue::Float(number * factor / divisor),
            unit: Some(unit.to_string()),
            start: whole.start(),
        })
    }

    fn bare_number(&self, text: &str) -> Option<Candidate> {
        let caps = self.bare_number.captures(text)?;
        let whole = caps.get(0)?;
        let number = parse_number(whole.as_str())?;
        Some(Candidate {
            kind: ValueKind::Number,
            raw: whole.as_str().to_string(),
            normalized: NormalizedValue::Float(number),
            unit: None,
            start: whole.start(),
        })
    }

    fn boolean(&self, text: &str) -> Option<Candidate> {
        let (found, value) = match self.negative.find(text) {
            Some(m) => (m, false),
            None => (self.affirmative.find(text)?, true),
        };
        Some(Candidate {
            kind: ValueKind::Boolean,
            raw: found.as_str().to_string(),
            normalized: NormalizedValue::Bool(value),
            unit: None,
            start: found.start(),
        })
    }

    fn token(&self, text: &str) -> Option<Candidate> {
        let (found, entry) = self
            .vocabulary
            .iter()
            .filter_map(|entry| entry.pattern.find(text).map(|m| (m, entry)))
            .min_by_key(|(m, _)| m.start())?;
        Some(Candidate {
            kind: ValueKind::Token,
            raw: found.as_str().to_string(),
            normalized: NormalizedValue::Token(format!("{}:{}", entry.class, entry.token)),
            unit: None,
            start: found.start(),
        })
    }
}

fn parse_number(s: &str) -> Option<f64> {
    s.replace(',', "").parse::<f64>().ok()
}

/// Base unit, factor and divisor for a unit spelling
fn base_unit(unit: &str) -> Option<(&'static str, f64, f64)> {
    const KIB: f64 = 1024.0;
    let conversion = match unit.to_lowercase().as_str() {
        "tib" => ("B", KIB * KIB * KIB * KIB, 1.0),
        "tb" => ("B", 1e12, 1.0),
        "gib" => ("B", KIB * KIB * KIB, 1.0),
        "gb" => ("B", 1e9, 1.0),
        "mib" => ("B", KIB * KIB, 1.0),
        "mb" => ("B", 1e6, 1.0),
        "minute" | "minutes" | "min" | "mins" => ("d", 1.0, 1440.0),
        "hour" | "hours" | "hr" | "hrs" | "h" => ("d", 1.0, 24.0),
        "day" | "days" => ("d", 1.0, 1.0),
        "week" | "weeks" => ("d", 7.0, 1.0),
        "month" | "months" => ("d", 30.0, 1.0),
        "year" | "years" | "yr" | "yrs" => ("d", 365.0, 1.0),
        _ => return None,
    };
    Some(conversion)
}
