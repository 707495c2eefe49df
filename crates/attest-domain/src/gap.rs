//! Qualified gaps: why a claim found no support in the corpus

use serde::Serialize;

/// Qualification of a missing claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapQualification {
    /// The corpus discusses the topic without stating the claim
    NoExplicitAssertion,
    /// The corpus describes a mechanism but no verification of it
    MechanismOnlyNoVerification,
    /// The claim is stated for other contexts only
    ScopeUnspecified,
    /// The corpus states the opposite
    Contradiction,
}

impl GapQualification {
    /// Get the qualification name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            GapQualification::NoExplicitAssertion => "no_explicit_assertion",
            GapQualification::MechanismOnlyNoVerification => "mechanism_only_no_verification",
            GapQualification::ScopeUnspecified => "scope_unspecified",
            GapQualification::Contradiction => "contradiction",
        }
    }
}

/// Corpus evidence backing a gap qualification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentaryEvidence {
    /// What was found (quoted excerpt)
    pub found: String,
    /// Where it was found (`document#unit@page`)
    pub source: String,
    /// Why it does not support the claim
    pub rationale: String,
}

/// Reason a claim is missing, always backed by evidence
///
/// There is no way to build a `GapReason` without at least one evidence
/// item: a gap without documentary proof is a defect, not a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReason {
    claim_key: String,
    qualification: GapQualification,
    description: String,
    evidence: Vec<DocumentaryEvidence>,
    confidence: f64,
}

impl GapReason {
    /// Build a gap reason
    ///
    /// # Errors
    ///
    /// Fails when `evidence` is empty or `confidence` is outside [0, 1].
    pub fn new(
        claim_key: impl Into<String>,
        qualification: GapQualification,
        description: impl Into<String>,
        evidence: Vec<DocumentaryEvidence>,
        confidence: f64,
    ) -> Result<Self, String> {
        let claim_key = claim_key.into();
        if evidence.is_empty() {
            return Err(format!(
                "{} gap for {} has no documentary evidence",
                qualification.as_str(),
                claim_key
            ));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!("gap confidence {} outside [0, 1]", confidence));
        }
        Ok(Self {
            claim_key,
            qualification,
            description: description.into(),
            evidence,
            confidence,
        })
    }

    /// Claim key the gap is about
    pub fn claim_key(&self) -> &str {
        &self.claim_key
    }

    /// Human-readable description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Qualification
    pub fn qualification(&self) -> GapQualification {
        self.qualification
    }

    /// Evidence (never empty)
    pub fn evidence(&self) -> &[DocumentaryEvidence] {
        &self.evidence
    }

    /// Confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gap_without_evidence_is_rejected() {
        let result = GapReason::new("security.mfa.required", GapQualification::NoExplicitAssertion, "no statement", vec![], 0.5);
        assert!(result.is_err());
    }

    #[test]
    fn test_gap_with_evidence() {
        let evidence = DocumentaryEvidence {
            found: "\"Keys are rotated by the KMS\"".to_string(),
            source: "doc#u1@p2".to_string(),
            rationale: "mechanism described, no verification stated".to_string(),
        };
        let gap = GapReason::new(
            "security.key_rotation",
            GapQualification::MechanismOnlyNoVerification,
            "rotation mechanism described without verification",
            vec![evidence],
            0.6,
        )
        .unwrap();
        assert_eq!(gap.claim_key(), "security.key_rotation");
        assert_eq!(gap.qualification(), GapQualification::MechanismOnlyNoVerification);
        assert_eq!(gap.evidence().len(), 1);
    }

    #[test]
    fn test_gap_confidence_bounds() {
        let evidence = DocumentaryEvidence {
            found: "x".to_string(),
            source: "d#u@p1".to_string(),
            rationale: "r".to_string(),
        };
        assert!(GapReason::new("k", GapQualification::ScopeUnspecified, "d", vec![evidence], 1.5).is_err());
    }
}
