//! Gap qualification: documentary proof that a missing key is really missing

use crate::{ChallengeConfig, ChallengeError};
use attest_domain::{
    ContextFrame, DocumentaryEvidence, Fact, FactQuery, FactStore, GapQualification, GapReason, TextUnit,
};
use regex::{Regex, RegexBuilder};
use std::fmt::Display;
use tracing::{debug, warn};

const MECHANISM_MARKERS: &str = r"\b(?:uses?|using|via|through|relies on|handled by|managed by|performed by|implemented|configured|automatic(?:ally)?|mechanisms?|process(?:es)?|tool(?:s|ing)?)\b";

const VERIFICATION_MARKERS: &str = r"\b(?:verif\w*|audit(?:ed|s)?|test(?:ed|s|ing)?|validat\w*|certif\w*|attest\w*|monitor\w*|review(?:ed|s)?|assess\w*)\b";

/// Key segments too generic to search the corpus with
const GENERIC_SEGMENTS: &[&str] = &[
    "required",
    "enabled",
    "min_version",
    "min_length",
    "frequency",
    "edition",
    "capacity",
    "sla",
];

const SCOPE_CONFIDENCE: f64 = 0.8;
const MECHANISM_CONFIDENCE: f64 = 0.6;
const NO_ASSERTION_CONFIDENCE: f64 = 0.5;

/// Explains why a key has no facts in the requested context
///
/// Three outcomes, tried in order: the key is stated for other contexts
/// only; nearby text describes a mechanism but never its verification;
/// nearby text discusses the topic without stating the claim. When nothing
/// nearby exists the qualifier fails loudly with
/// [`ChallengeError::GapDefect`] instead of returning an empty gap.
#[derive(Debug, Clone)]
pub struct GapQualifier {
    mechanism: Regex,
    verification: Regex,
    excerpt_chars: usize,
    adjacent_limit: usize,
}

impl GapQualifier {
    /// Create a qualifier
    pub fn new(config: &ChallengeConfig) -> Result<Self, ChallengeError> {
        Ok(Self {
            mechanism: compile(MECHANISM_MARKERS)?,
            verification: compile(VERIFICATION_MARKERS)?,
            excerpt_chars: config.excerpt_chars,
            adjacent_limit: config.adjacent_limit,
        })
    }

    /// Qualify the absence of `machine_key` in `context`
    pub fn qualify<S>(
        &self,
        store: &S,
        machine_key: &str,
        context: Option<&ContextFrame>,
    ) -> Result<GapReason, ChallengeError>
    where
        S: FactStore,
        S::Error: Display,
    {
        let elsewhere: Vec<Fact> = store
            .query_facts(&FactQuery::for_key(machine_key))
            .map_err(|e| ChallengeError::Store(e.to_string()))?
            .into_iter()
            .filter(|f| context.map_or(true, |c| !f.context.overlaps(c)))
            .take(self.adjacent_limit)
            .collect();

        if !elsewhere.is_empty() {
            let requested = context.map_or_else(|| "any".to_string(), |c| c.context_key());
            let evidence = elsewhere
                .iter()
                .map(|f| DocumentaryEvidence {
                    found: format!("\"{}\"", f.quote),
                    source: source_of(f),
                    rationale: format!(
                        "stated for {}, which does not cover {}",
                        f.context.context_key(),
                        requested
                    ),
                })
                .collect();
            return gap(
                machine_key,
                GapQualification::ScopeUnspecified,
                format!("{} is stated only for other contexts than {}", machine_key, requested),
                evidence,
                SCOPE_CONFIDENCE,
            );
        }

        let terms = search_terms(machine_key);
        let adjacent = store
            .search_units(&terms, context, self.adjacent_limit)
            .map_err(|e| ChallengeError::Store(e.to_string()))?;
        debug!("Gap search for {} with {:?}: {} units", machine_key, terms, adjacent.len());

        if adjacent.is_empty() {
            warn!("No adjacent corpus text for missing key {}", machine_key);
            return Err(ChallengeError::GapDefect(machine_key.to_string()));
        }

        let mechanism_only: Vec<&TextUnit> = adjacent
            .iter()
            .filter(|u| self.mechanism.is_match(&u.text) && !self.verification.is_match(&u.text))
            .collect();

        if !mechanism_only.is_empty() {
            let evidence = mechanism_only
                .iter()
                .map(|u| self.unit_evidence(u, "describes a mechanism without any verification of it"))
                .collect();
            return gap(
                machine_key,
                GapQualification::MechanismOnlyNoVerification,
                format!("the corpus describes how {} is handled but never that it is verified", terms.join(" / ")),
                evidence,
                MECHANISM_CONFIDENCE,
            );
        }

        let rationale = format!("mentions {} without stating {}", terms.join(" / "), machine_key);
        let evidence = adjacent.iter().map(|u| self.unit_evidence(u, &rationale)).collect();
        gap(
            machine_key,
            GapQualification::NoExplicitAssertion,
            format!("the corpus discusses {} but never states it", terms.join(" / ")),
            evidence,
            NO_ASSERTION_CONFIDENCE,
        )
    }

    fn unit_evidence(&self, unit: &TextUnit, rationale: &str) -> DocumentaryEvidence {
        DocumentaryEvidence {
            found: format!("\"{}\"", truncate(&unit.text, self.excerpt_chars)),
            source: format!("{}#{}@p{}", unit.document_id, unit.unit_id, unit.position.page),
            rationale: rationale.to_string(),
        }
    }
}

/// Corpus search terms for a machine key
///
/// The domain segment and generic qualifiers are dropped; underscores become
/// spaces.
pub fn search_terms(machine_key: &str) -> Vec<String> {
    let segments: Vec<&str> = machine_key.split('.').skip(1).collect();

    let specific: Vec<String> = segments
        .iter()
        .filter(|s| !GENERIC_SEGMENTS.contains(*s))
        .map(|s| s.replace('_', " "))
        .filter(|s| s.len() >= 3)
        .collect();

    if specific.is_empty() {
        segments.iter().map(|s| s.replace('_', " ")).collect()
    } else {
        specific
    }
}

fn gap(
    machine_key: &str,
    qualification: GapQualification,
    description: String,
    evidence: Vec<DocumentaryEvidence>,
    confidence: f64,
) -> Result<GapReason, ChallengeError> {
    GapReason::new(machine_key, qualification, description, evidence, confidence).map_err(ChallengeError::InvalidGap)
}

fn source_of(fact: &Fact) -> String {
    fact.sources
        .first()
        .map_or_else(|| fact.document_id.clone(), |s| s.label())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

fn compile(pattern: &str) -> Result<Regex, ChallengeError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ChallengeError::Config(format!("Invalid marker pattern: {}", e)))
}
