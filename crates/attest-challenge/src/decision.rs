//! Decision packages: structured proof for one business question

use crate::gap::GapQualifier;
use crate::{ChallengeConfig, ChallengeError};
use attest_domain::{
    compare_facts, ClaimStatus, ClaimSupport, ContextFrame, DecisionClaim, DecisionPackage, DocumentaryEvidence,
    Fact, FactQuery, FactStore, GapQualification, GapReason, Tension, TensionLevel,
};
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tracing::info;

const CONTRADICTION_CONFIDENCE: f64 = 0.9;

/// Builds decision packages from the claim keys a question depends on
///
/// Each key becomes one claim, in the order given: supported keys carry
/// their facts, keys whose facts are in hard tension carry a contradiction
/// gap citing them, and keys without facts carry a qualified gap. The
/// overall status is derived by [`DecisionPackage::new`].
pub struct DecisionBuilder<S> {
    store: Arc<Mutex<S>>,
    gaps: GapQualifier,
}

impl<S> DecisionBuilder<S>
where
    S: FactStore,
    S::Error: Display,
{
    /// Create a builder over a shared store
    pub fn new(store: Arc<Mutex<S>>, config: &ChallengeConfig) -> Result<Self, ChallengeError> {
        config.validate().map_err(ChallengeError::Config)?;
        Ok(Self {
            store,
            gaps: GapQualifier::new(config)?,
        })
    }

    /// Answer `question` from the facts of `claim_keys`
    pub fn decide(
        &self,
        question: &str,
        claim_keys: &[String],
        context: Option<&ContextFrame>,
    ) -> Result<DecisionPackage, ChallengeError> {
        let store = self
            .store
            .lock()
            .map_err(|e| ChallengeError::Store(format!("Store lock error: {}", e)))?;

        let mut claims = Vec::with_capacity(claim_keys.len());
        for key in claim_keys {
            claims.push(self.claim(&*store, key, context)?);
        }

        let package = DecisionPackage::new(question, claims);
        info!(
            "Decision for '{}': {} ({} claims)",
            question,
            package.status().as_str(),
            package.claims().len()
        );
        Ok(package)
    }

    fn claim(&self, store: &S, key: &str, context: Option<&ContextFrame>) -> Result<DecisionClaim, ChallengeError> {
        let text = store
            .get_claim_key(key)
            .map_err(|e| ChallengeError::Store(e.to_string()))?
            .map_or_else(|| key.to_string(), |k| k.question);

        let facts = store
            .query_facts(&FactQuery::for_key(key).in_context(context.cloned()))
            .map_err(|e| ChallengeError::Store(e.to_string()))?;

        if facts.is_empty() {
            let gap = self.gaps.qualify(store, key, context)?;
            return Ok(DecisionClaim {
                text,
                claim_key: key.to_string(),
                status: ClaimStatus::Missing,
                support: ClaimSupport::Gap { gap },
            });
        }

        let conflicts = hard_tensions(&facts);
        if !conflicts.is_empty() {
            let gap = contradiction_gap(key, &facts, &conflicts)?;
            return Ok(DecisionClaim {
                text,
                claim_key: key.to_string(),
                status: ClaimStatus::Contradicted,
                support: ClaimSupport::Gap { gap },
            });
        }

        Ok(DecisionClaim {
            text,
            claim_key: key.to_string(),
            status: ClaimStatus::Supported,
            support: ClaimSupport::Facts { facts },
        })
    }
}

/// Hard tensions between every pair of facts
fn hard_tensions(facts: &[Fact]) -> Vec<Tension> {
    let mut tensions = Vec::new();
    for (i, reference) in facts.iter().enumerate() {
        for candidate in &facts[i + 1..] {
            // The fact stating a bound is the reference.
            let (reference, candidate) = if candidate.states_bound() && !reference.states_bound() {
                (candidate, reference)
            } else {
                (reference, candidate)
            };
            tensions.extend(compare_facts(reference, candidate).filter(|t| t.level == TensionLevel::Hard));
        }
    }
    tensions
}

fn contradiction_gap(key: &str, facts: &[Fact], conflicts: &[Tension]) -> Result<GapReason, ChallengeError> {
    let mut cited = HashSet::new();
    let mut evidence = Vec::new();

    for tension in conflicts {
        for id in [tension.reference, tension.candidate] {
            if !cited.insert(id) {
                continue;
            }
            if let Some(fact) = facts.iter().find(|f| f.id == id) {
                evidence.push(DocumentaryEvidence {
                    found: format!("\"{}\"", fact.quote),
                    source: fact
                        .sources
                        .first()
                        .map_or_else(|| fact.document_id.clone(), |s| s.label()),
                    rationale: tension.explanation.clone(),
                });
            }
        }
    }

    GapReason::new(
        key,
        GapQualification::Contradiction,
        format!("{} conflicting statement(s) for {}", conflicts.len(), key),
        evidence,
        CONTRADICTION_CONFIDENCE,
    )
    .map_err(ChallengeError::InvalidGap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::{
        AssertionType, Comparability, FactId, Fingerprint, NormalizedValue, Operator, Position, PromotionStatus,
        RhetoricalRole, TypedValue, ValueKind,
    };

    fn fact(parts: &[u32], operator: Operator) -> Fact {
        Fact {
            id: FactId::new(),
            document_id: "doc".to_string(),
            quote: "TLS".to_string(),
            assertion_type: AssertionType::Prescriptive,
            role: RhetoricalRole::Fact,
            position: Position::new(1, 0),
            value: Some(
                TypedValue::new(
                    ValueKind::Version,
                    "raw",
                    NormalizedValue::Version(parts.to_vec()),
                    None,
                    operator,
                    Comparability::Strict,
                )
                .unwrap(),
            ),
            context: ContextFrame::new(),
            status: PromotionStatus::Linked,
            reason: "type_prescriptive".to_string(),
            claim_key: Some("security.tls.min_version".to_string()),
            fingerprint: Fingerprint::from_digest("sha256:00"),
            confidence: 0.9,
            sources: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn test_hard_tension_found_in_either_order() {
        let minimum = fact(&[1, 2], Operator::Ge);
        let legacy = fact(&[1, 0], Operator::Eq);

        assert_eq!(hard_tensions(&[minimum.clone(), legacy.clone()]).len(), 1);
        assert_eq!(hard_tensions(&[legacy, minimum]).len(), 1);
    }

    #[test]
    fn test_soft_tension_is_not_a_conflict() {
        let minimum = fact(&[1, 2], Operator::Ge);
        let modern = fact(&[1, 3], Operator::Eq);
        assert!(hard_tensions(&[minimum.clone(), modern.clone()]).is_empty());
        assert!(hard_tensions(&[modern, minimum]).is_empty());
    }

    #[test]
    fn test_contradiction_gap_cites_both_facts() {
        let minimum = fact(&[1, 2], Operator::Ge);
        let legacy = fact(&[1, 0], Operator::Eq);
        let facts = vec![minimum, legacy];
        let conflicts = hard_tensions(&facts);

        let gap = contradiction_gap("security.tls.min_version", &facts, &conflicts).unwrap();
        assert_eq!(gap.qualification(), GapQualification::Contradiction);
        assert_eq!(gap.evidence().len(), 2);
    }
}
