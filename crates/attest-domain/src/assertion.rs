//! Inputs from the extraction collaborator: text units and raw assertions

use crate::context::{ContextFrame, ContextOverrides};
use serde::{Deserialize, Serialize};

/// Page/paragraph position of a unit inside its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// 1-based page number
    pub page: u32,
    /// Paragraph index within the page
    pub paragraph: u32,
}

impl Position {
    /// Create a position
    pub fn new(page: u32, paragraph: u32) -> Self {
        Self { page, paragraph }
    }
}

/// A segmented text unit, as delivered by document parsing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Source document identifier
    pub document_id: String,
    /// Unit identifier, unique within the document
    pub unit_id: String,
    /// Literal text of the unit
    pub text: String,
    /// Position in the document
    pub position: Position,
    /// Context inherited from the document
    #[serde(default)]
    pub context: ContextFrame,
    /// Section theme (heading), used by key templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Semantic type of an assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionType {
    /// States what must or must not happen
    Prescriptive,
    /// Defines a term or a property
    Definitional,
    /// States a cause/effect relation
    Causal,
    /// Compares two things
    Comparative,
}

impl AssertionType {
    /// Get the type name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            AssertionType::Prescriptive => "prescriptive",
            AssertionType::Definitional => "definitional",
            AssertionType::Causal => "causal",
            AssertionType::Comparative => "comparative",
        }
    }

    /// Parse a type from its string name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "prescriptive" => Some(AssertionType::Prescriptive),
            "definitional" => Some(AssertionType::Definitional),
            "causal" => Some(AssertionType::Causal),
            "comparative" => Some(AssertionType::Comparative),
            _ => None,
        }
    }
}

/// Rhetorical role of an assertion in its document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RhetoricalRole {
    /// Statement of fact
    Fact,
    /// Illustration, not a commitment
    Example,
    /// Definition of a term
    Definition,
    /// Operational instruction
    Instruction,
    /// Marketing or unqualified claim
    Claim,
    /// Warning or caveat
    Caution,
}

impl RhetoricalRole {
    /// Get the role name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RhetoricalRole::Fact => "fact",
            RhetoricalRole::Example => "example",
            RhetoricalRole::Definition => "definition",
            RhetoricalRole::Instruction => "instruction",
            RhetoricalRole::Claim => "claim",
            RhetoricalRole::Caution => "caution",
        }
    }

    /// Parse a role from its string name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fact" => Some(RhetoricalRole::Fact),
            "example" => Some(RhetoricalRole::Example),
            "definition" => Some(RhetoricalRole::Definition),
            "instruction" => Some(RhetoricalRole::Instruction),
            "claim" => Some(RhetoricalRole::Claim),
            "caution" => Some(RhetoricalRole::Caution),
            _ => None,
        }
    }
}

/// An assertion produced by the (external) extraction stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAssertion {
    /// Assertion text as produced by extraction
    pub text: String,
    /// Exact quote; must be a literal substring of the source unit
    pub quote: String,
    /// Semantic type
    pub assertion_type: AssertionType,
    /// Rhetorical role
    pub role: RhetoricalRole,
    /// Position in the document
    pub position: Position,
    /// Extraction confidence in [0, 1]
    pub confidence: f64,
    /// Local context overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ContextOverrides>,
}

impl ExtractedAssertion {
    /// Whether the quote appears verbatim in the unit text
    ///
    /// # Examples
    ///
    /// ```
    /// use attest_domain::{ExtractedAssertion, AssertionType, RhetoricalRole, Position, TextUnit, ContextFrame};
    ///
    /// let unit = TextUnit {
    ///     document_id: "doc".into(),
    ///     unit_id: "u1".into(),
    ///     text: "TLS minimum version 1.2 is enforced.".into(),
    ///     position: Position::new(1, 0),
    ///     context: ContextFrame::new(),
    ///     theme: None,
    /// };
    /// let assertion = ExtractedAssertion {
    ///     text: "TLS 1.2 minimum".into(),
    ///     quote: "TLS minimum version 1.2".into(),
    ///     assertion_type: AssertionType::Prescriptive,
    ///     role: RhetoricalRole::Fact,
    ///     position: Position::new(1, 0),
    ///     confidence: 0.9,
    ///     overrides: None,
    /// };
    /// assert!(assertion.quote_is_literal(&unit));
    /// ```
    pub fn quote_is_literal(&self, unit: &TextUnit) -> bool {
        !self.quote.trim().is_empty() && unit.text.contains(&self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(text: &str) -> TextUnit {
        TextUnit {
            document_id: "doc-1".to_string(),
            unit_id: "u-1".to_string(),
            text: text.to_string(),
            position: Position::new(3, 1),
            context: ContextFrame::new(),
            theme: None,
        }
    }

    fn assertion(quote: &str) -> ExtractedAssertion {
        ExtractedAssertion {
            text: quote.to_string(),
            quote: quote.to_string(),
            assertion_type: AssertionType::Definitional,
            role: RhetoricalRole::Fact,
            position: Position::new(3, 1),
            confidence: 0.8,
            overrides: None,
        }
    }

    #[test]
    fn test_paraphrased_quote_is_not_literal() {
        let unit = unit("Backups are retained for 30 days.");
        assert!(assertion("retained for 30 days").quote_is_literal(&unit));
        assert!(!assertion("Backups are kept for a month").quote_is_literal(&unit));
        assert!(!assertion("   ").quote_is_literal(&unit));
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            RhetoricalRole::Fact,
            RhetoricalRole::Example,
            RhetoricalRole::Definition,
            RhetoricalRole::Instruction,
            RhetoricalRole::Claim,
            RhetoricalRole::Caution,
        ] {
            assert_eq!(RhetoricalRole::parse(role.as_str()), Some(role));
        }
    }
}
