//! Promotion policy: every extracted assertion is linked, unlinked or rejected

use crate::{PromotionConfig, PromotionError};
use attest_domain::{AssertionType, ExtractedAssertion, PromotionStatus, RhetoricalRole, TextUnit};
use regex::{Regex, RegexBuilder};
use std::fmt;
use tracing::debug;

/// Why the policy reached its decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionReason {
    /// The quote is not a literal substring of its unit
    QuoteNotInSource,
    /// Navigation, legal or layout text
    Boilerplate,
    /// Shorter than the configured minimum
    TooShort,
    /// Linked by assertion type
    AssertionType(AssertionType),
    /// Linked or unlinked by rhetorical role
    Role(RhetoricalRole),
    /// Linked because a typed value was extracted
    TypedValue,
    /// Nothing decided the case
    Uncategorized,
    /// Would be linked, but no claim key pattern matched
    NoPatternMatch,
}

impl PromotionReason {
    /// Stable reason code written to the audit log
    pub fn code(&self) -> &'static str {
        match self {
            PromotionReason::QuoteNotInSource => "quote_not_in_source",
            PromotionReason::Boilerplate => "boilerplate",
            PromotionReason::TooShort => "too_short",
            PromotionReason::AssertionType(AssertionType::Prescriptive) => "type_prescriptive",
            PromotionReason::AssertionType(AssertionType::Definitional) => "type_definitional",
            PromotionReason::AssertionType(AssertionType::Causal) => "type_causal",
            PromotionReason::AssertionType(AssertionType::Comparative) => "type_comparative",
            PromotionReason::Role(RhetoricalRole::Fact) => "role_fact",
            PromotionReason::Role(RhetoricalRole::Definition) => "role_definition",
            PromotionReason::Role(RhetoricalRole::Instruction) => "role_instruction",
            PromotionReason::Role(RhetoricalRole::Example) => "role_example",
            PromotionReason::Role(RhetoricalRole::Caution) => "role_caution",
            PromotionReason::Role(RhetoricalRole::Claim) => "role_claim",
            PromotionReason::TypedValue => "typed_value",
            PromotionReason::Uncategorized => "uncategorized",
            PromotionReason::NoPatternMatch => "no_pattern_match",
        }
    }
}

impl fmt::Display for PromotionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of classifying one assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionDecision {
    /// Linked, unlinked or rejected
    pub status: PromotionStatus,
    /// Reason code
    pub reason: PromotionReason,
}

impl PromotionDecision {
    fn new(status: PromotionStatus, reason: PromotionReason) -> Self {
        Self { status, reason }
    }

    /// Whether the assertion is kept (linked or unlinked)
    pub fn is_accepted(&self) -> bool {
        self.status != PromotionStatus::Rejected
    }
}

/// What the classifier needs to know beyond the assertion itself
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromotionSignals {
    /// A typed value was extracted from the assertion
    pub has_value: bool,
    /// The assertion text resolved to a claim key
    pub key_resolved: bool,
}

/// The promotion classifier
///
/// Pure and `Send + Sync`: one instance can serve any number of workers.
pub struct PromotionClassifier {
    config: PromotionConfig,
    boilerplate: Vec<Regex>,
}

impl PromotionClassifier {
    /// Create a classifier, compiling the boilerplate patterns
    pub fn new(config: PromotionConfig) -> Result<Self, PromotionError> {
        config.validate().map_err(PromotionError::Config)?;

        let boilerplate = config
            .boilerplate_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PromotionError::Pattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { config, boilerplate })
    }

    /// Create a classifier with default configuration
    pub fn default_config() -> Result<Self, PromotionError> {
        Self::new(PromotionConfig::default())
    }

    /// Configuration in use
    pub fn config(&self) -> &PromotionConfig {
        &self.config
    }

    /// Whether a text is boilerplate
    pub fn is_boilerplate(&self, text: &str) -> bool {
        self.boilerplate.iter().any(|re| re.is_match(text))
    }

    /// Classify one assertion
    ///
    /// Rules are evaluated in order and the first match wins. A linked
    /// outcome without a resolved claim key is demoted to unlinked.
    pub fn classify(
        &self,
        assertion: &ExtractedAssertion,
        unit: &TextUnit,
        signals: PromotionSignals,
    ) -> PromotionDecision {
        let decision = self.apply_rules(assertion, unit, signals);

        let decision = if decision.status == PromotionStatus::Linked && !signals.key_resolved {
            PromotionDecision::new(PromotionStatus::Unlinked, PromotionReason::NoPatternMatch)
        } else {
            decision
        };

        debug!(
            "Promotion {} ({}) for '{}'",
            decision.status, decision.reason, assertion.text
        );
        decision
    }

    fn apply_rules(
        &self,
        assertion: &ExtractedAssertion,
        unit: &TextUnit,
        signals: PromotionSignals,
    ) -> PromotionDecision {
        use PromotionStatus::{Linked, Rejected, Unlinked};

        if !assertion.quote_is_literal(unit) {
            return PromotionDecision::new(Rejected, PromotionReason::QuoteNotInSource);
        }

        let text = assertion.text.trim();
        if self.is_boilerplate(text) || self.is_boilerplate(assertion.quote.trim()) {
            return PromotionDecision::new(Rejected, PromotionReason::Boilerplate);
        }
        if text.chars().count() < self.config.min_length {
            return PromotionDecision::new(Rejected, PromotionReason::TooShort);
        }

        match assertion.assertion_type {
            AssertionType::Prescriptive | AssertionType::Definitional => {
                return PromotionDecision::new(Linked, PromotionReason::AssertionType(assertion.assertion_type));
            }
            AssertionType::Causal | AssertionType::Comparative => {}
        }

        match assertion.role {
            RhetoricalRole::Fact | RhetoricalRole::Definition | RhetoricalRole::Instruction => {
                return PromotionDecision::new(Linked, PromotionReason::Role(assertion.role));
            }
            RhetoricalRole::Example | RhetoricalRole::Caution => {
                return PromotionDecision::new(Unlinked, PromotionReason::Role(assertion.role));
            }
            RhetoricalRole::Claim => {}
        }

        if signals.has_value {
            return PromotionDecision::new(Linked, PromotionReason::TypedValue);
        }

        PromotionDecision::new(Unlinked, PromotionReason::Uncategorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::{ContextFrame, Position};

    fn unit(text: &str) -> TextUnit {
        TextUnit {
            document_id: "doc".to_string(),
            unit_id: "u1".to_string(),
            text: text.to_string(),
            position: Position::new(1, 0),
            context: ContextFrame::new(),
            theme: None,
        }
    }

    fn assertion(text: &str, assertion_type: AssertionType, role: RhetoricalRole) -> ExtractedAssertion {
        ExtractedAssertion {
            text: text.to_string(),
            quote: text.to_string(),
            assertion_type,
            role,
            position: Position::new(1, 0),
            confidence: 0.8,
            overrides: None,
        }
    }

    fn resolved() -> PromotionSignals {
        PromotionSignals {
            has_value: false,
            key_resolved: true,
        }
    }

    #[test]
    fn test_paraphrase_is_rejected() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let mut a = assertion("TLS 1.2 is the minimum", AssertionType::Prescriptive, RhetoricalRole::Fact);
        a.quote = "TLS 1.2 is the floor".to_string();

        let decision = classifier.classify(&a, &unit("TLS 1.2 is the minimum version."), resolved());
        assert_eq!(decision.status, PromotionStatus::Rejected);
        assert_eq!(decision.reason.code(), "quote_not_in_source");
    }

    #[test]
    fn test_boilerplate_is_rejected() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "Copyright 2024 Example Corp. All rights reserved.";
        let decision = classifier.classify(
            &assertion(text, AssertionType::Prescriptive, RhetoricalRole::Fact),
            &unit(text),
            resolved(),
        );
        assert_eq!(decision.reason, PromotionReason::Boilerplate);
    }

    #[test]
    fn test_short_text_is_rejected() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let decision = classifier.classify(
            &assertion("Use TLS.", AssertionType::Prescriptive, RhetoricalRole::Fact),
            &unit("Use TLS."),
            resolved(),
        );
        assert_eq!(decision.reason, PromotionReason::TooShort);
    }

    #[test]
    fn test_prescriptive_type_links() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "TLS minimum version 1.2 is enforced";
        let decision = classifier.classify(
            &assertion(text, AssertionType::Prescriptive, RhetoricalRole::Example),
            &unit(text),
            resolved(),
        );
        assert_eq!(decision.status, PromotionStatus::Linked);
        assert_eq!(decision.reason.code(), "type_prescriptive");
    }

    #[test]
    fn test_example_role_is_unlinked() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "For instance, a customer could rotate keys weekly";
        let decision = classifier.classify(
            &assertion(text, AssertionType::Causal, RhetoricalRole::Example),
            &unit(text),
            resolved(),
        );
        assert_eq!(decision.status, PromotionStatus::Unlinked);
        assert_eq!(decision.reason.code(), "role_example");
    }

    #[test]
    fn test_typed_value_links_claims() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "Our platform delivers 99.99% uptime";
        let signals = PromotionSignals {
            has_value: true,
            key_resolved: true,
        };
        let decision = classifier.classify(
            &assertion(text, AssertionType::Comparative, RhetoricalRole::Claim),
            &unit(text),
            signals,
        );
        assert_eq!(decision.reason, PromotionReason::TypedValue);
    }

    #[test]
    fn test_uncategorized_is_unlinked() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "Customers love the new dashboard design";
        let decision = classifier.classify(
            &assertion(text, AssertionType::Comparative, RhetoricalRole::Claim),
            &unit(text),
            resolved(),
        );
        assert_eq!(decision.status, PromotionStatus::Unlinked);
        assert_eq!(decision.reason, PromotionReason::Uncategorized);
    }

    #[test]
    fn test_linked_without_key_becomes_unlinked() {
        let classifier = PromotionClassifier::default_config().unwrap();
        let text = "The sky is blue over the data center";
        let decision = classifier.classify(
            &assertion(text, AssertionType::Definitional, RhetoricalRole::Fact),
            &unit(text),
            PromotionSignals::default(),
        );
        assert_eq!(decision.status, PromotionStatus::Unlinked);
        assert_eq!(decision.reason.code(), "no_pattern_match");
        assert!(decision.is_accepted());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let config = PromotionConfig {
            boilerplate_patterns: vec!["(unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            PromotionClassifier::new(config),
            Err(PromotionError::Pattern { .. })
        ));
    }
}
