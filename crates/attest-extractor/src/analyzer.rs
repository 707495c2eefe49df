//! Pure per-unit analysis: everything that does not touch the store

use crate::fingerprint::fingerprint;
use crate::normalizer::ValueNormalizer;
use crate::resolver::{KeyResolver, Resolution};
use crate::ExtractorError;
use attest_domain::{
    ContextFrame, ExtractedAssertion, Fact, FactId, Fingerprint, PromotionStatus, SourceRef, TextUnit, TypedValue,
};
use attest_gatekeeper::{PromotionClassifier, PromotionDecision, PromotionSignals};

/// Everything decided about one assertion before persistence
#[derive(Debug, Clone)]
pub(crate) struct Analysis {
    pub assertion: ExtractedAssertion,
    pub decision: PromotionDecision,
    pub value: Option<TypedValue>,
    pub resolution: Option<Resolution>,
    pub context: ContextFrame,
    pub fingerprint: Fingerprint,
}

impl Analysis {
    /// Claim key the fact links to (linked assertions only)
    pub fn linked_key(&self) -> Option<&str> {
        match (&self.decision.status, &self.resolution) {
            (PromotionStatus::Linked, Some(resolution)) => Some(resolution.machine_key()),
            _ => None,
        }
    }

    /// Fact to upsert for an accepted assertion
    pub fn to_fact(&self, unit: &TextUnit, now: u64) -> Fact {
        let position = self.assertion.position;
        Fact {
            id: FactId::new(),
            document_id: unit.document_id.clone(),
            quote: self.assertion.quote.clone(),
            assertion_type: self.assertion.assertion_type,
            role: self.assertion.role,
            position,
            value: self.value.clone(),
            context: self.context.clone(),
            status: self.decision.status,
            reason: self.decision.reason.code().to_string(),
            claim_key: self.linked_key().map(str::to_string),
            fingerprint: self.fingerprint.clone(),
            confidence: self.assertion.confidence,
            sources: vec![SourceRef::new(
                unit.document_id.clone(),
                unit.unit_id.clone(),
                position,
                now,
            )],
            created_at: now,
        }
    }
}

/// Normalizer, resolver and classifier bundled for blocking tasks
pub(crate) struct Analyzer {
    pub normalizer: ValueNormalizer,
    pub resolver: KeyResolver,
    pub classifier: PromotionClassifier,
    pub page_bucket_size: u32,
}

impl Analyzer {
    /// Analyze every assertion of a unit, in order
    ///
    /// An error is an invariant violation and halts the whole unit.
    pub fn analyze_unit(
        &self,
        unit: &TextUnit,
        assertions: &[ExtractedAssertion],
    ) -> Result<Vec<Analysis>, ExtractorError> {
        assertions.iter().map(|a| self.analyze(unit, a)).collect()
    }

    fn analyze(&self, unit: &TextUnit, assertion: &ExtractedAssertion) -> Result<Analysis, ExtractorError> {
        let context = match &assertion.overrides {
            Some(overrides) => unit.context.with_overrides(overrides),
            None => unit.context.clone(),
        };

        // A paraphrased quote is never evidence: nothing is read from it.
        let (resolution, value) = if assertion.quote_is_literal(unit) {
            let resolution = self
                .resolver
                .resolve(&assertion.text, &context, unit.theme.as_deref());
            let value = match resolution.as_ref().and_then(|r| r.draft.expected_kind) {
                Some(kind) => self.normalizer.normalize_as(&assertion.quote, kind)?,
                None => self.normalizer.normalize(&assertion.quote)?,
            };
            (resolution, value)
        } else {
            (None, None)
        };

        let decision = self.classifier.classify(
            assertion,
            unit,
            PromotionSignals {
                has_value: value.is_some(),
                key_resolved: resolution.is_some(),
            },
        );

        let key = match decision.status {
            PromotionStatus::Linked => resolution.as_ref().map(|r| r.machine_key()),
            _ => None,
        };
        let fingerprint = fingerprint(
            key,
            &assertion.quote,
            value.as_ref(),
            &context,
            assertion.position.page,
            self.page_bucket_size,
        );

        Ok(Analysis {
            assertion: assertion.clone(),
            decision,
            value,
            resolution,
            context,
            fingerprint,
        })
    }
}
