//! End-to-end challenges and decisions over an ingested corpus

use attest_audit::{AuditConfig, AuditLog};
use attest_challenge::{ChallengeConfig, ChallengeError, ChallengeStatus, Challenger, DecisionBuilder};
use attest_domain::{
    AssertionType, ClaimStatus, ClaimSupport, ContextFrame, DecisionStatus, ExtractedAssertion, GapQualification,
    Position, RhetoricalRole, TensionLevel, TextUnit,
};
use attest_extractor::{default_registry, ExtractorConfig, IngestRequest, Ingestor};
use attest_gatekeeper::PromotionClassifier;
use attest_janitor::LifecycleManager;
use attest_store::SqliteStore;
use std::sync::Arc;

const TLS_KEY: &str = "security.tls.min_version";
const MFA_KEY: &str = "security.mfa.required";

fn unit(document_id: &str, text: &str, context: ContextFrame) -> TextUnit {
    TextUnit {
        document_id: document_id.to_string(),
        unit_id: "u1".to_string(),
        text: text.to_string(),
        position: Position::new(1, 0),
        context,
        theme: None,
    }
}

/// A unit whose single assertion quotes `quote` verbatim
fn stated(document_id: &str, text: &str, quote: &str, context: ContextFrame) -> IngestRequest {
    IngestRequest {
        unit: unit(document_id, text, context),
        assertions: vec![ExtractedAssertion {
            text: quote.to_string(),
            quote: quote.to_string(),
            assertion_type: AssertionType::Prescriptive,
            role: RhetoricalRole::Fact,
            position: Position::new(1, 0),
            confidence: 0.9,
            overrides: None,
        }],
    }
}

/// A unit stored without any assertion
fn mentioned(document_id: &str, text: &str) -> IngestRequest {
    IngestRequest {
        unit: unit(document_id, text, ContextFrame::new()),
        assertions: vec![],
    }
}

async fn corpus(requests: Vec<IngestRequest>) -> Ingestor<SqliteStore> {
    let ingestor = Ingestor::new(
        SqliteStore::new(":memory:").unwrap(),
        PromotionClassifier::default_config().unwrap(),
        LifecycleManager::default_config(),
        Arc::new(AuditLog::in_memory("acme", AuditConfig::default()).unwrap()),
        ExtractorConfig::default(),
    )
    .unwrap();
    ingestor.ingest(requests).await.unwrap();
    ingestor
}

fn tls_minimum() -> IngestRequest {
    stated(
        "whitepaper",
        "All endpoints enforce TLS minimum version 1.2.",
        "TLS minimum version 1.2",
        ContextFrame::new(),
    )
}

fn challenger(ingestor: &Ingestor<SqliteStore>) -> Challenger<SqliteStore> {
    Challenger::new(ingestor.store(), default_registry(), ChallengeConfig::default()).unwrap()
}

#[tokio::test]
async fn test_exceeding_minimum_is_confirmed_with_soft_tension() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let response = challenger(&ingestor).challenge("TLS 1.3 is used", None, true).await.unwrap();

    assert_eq!(response.matches.len(), 1);
    let m = &response.matches[0];
    assert_eq!(m.claim_key.as_deref(), Some(TLS_KEY));
    assert_eq!(m.status, ChallengeStatus::Confirmed);
    assert_eq!(m.tension, Some(TensionLevel::Soft));
    assert_eq!(m.excerpts.len(), 1);
    assert!(m.excerpts[0].contains("TLS minimum version 1.2"));
}

#[tokio::test]
async fn test_below_minimum_is_contradicted_with_hard_tension() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let response = challenger(&ingestor)
        .challenge("TLS 1.0 is sufficient", None, true)
        .await
        .unwrap();

    let m = &response.matches[0];
    assert_eq!(m.status, ChallengeStatus::Contradicted);
    assert_eq!(m.tension, Some(TensionLevel::Hard));
    assert_eq!(response.summary.contradicted, 1);
}

#[tokio::test]
async fn test_unitless_value_below_minimum_is_contradicted() {
    let ingestor = corpus(vec![stated(
        "policy",
        "Passwords must be at least 20 characters long.",
        "Passwords must be at least 20 characters long",
        ContextFrame::new(),
    )])
    .await;
    let response = challenger(&ingestor)
        .challenge("Passwords of 19 characters length are accepted", None, true)
        .await
        .unwrap();

    let m = &response.matches[0];
    assert_eq!(m.claim_key.as_deref(), Some("security.password.min_length"));
    assert_eq!(m.status, ChallengeStatus::Contradicted);
    assert_eq!(m.tension, Some(TensionLevel::Hard));
}

#[tokio::test]
async fn test_unrecognised_claim_is_unmapped() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let response = challenger(&ingestor).challenge("the sky is blue", None, true).await.unwrap();

    let m = &response.matches[0];
    assert_eq!(m.status, ChallengeStatus::Unmapped);
    assert_eq!(m.tension, None);
    assert_eq!(response.summary.unmapped, 1);
    assert!(response.summary.high_unmapped_rate);
}

#[tokio::test]
async fn test_missing_key_without_adjacent_text_is_a_defect() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let result = challenger(&ingestor).challenge("MFA is enforced", None, true).await;

    match result {
        Err(ChallengeError::GapDefect(key)) => assert_eq!(key, MFA_KEY),
        other => panic!("expected a gap defect, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_key_without_qualification_requested() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let response = challenger(&ingestor).challenge("MFA is enforced", None, false).await.unwrap();

    let m = &response.matches[0];
    assert_eq!(m.status, ChallengeStatus::Missing);
    assert!(m.gap.is_none());
}

#[tokio::test]
async fn test_mechanism_without_verification_qualifies_gap() {
    let ingestor = corpus(vec![
        tls_minimum(),
        mentioned("identity", "MFA is handled by the corporate identity provider."),
    ])
    .await;
    let response = challenger(&ingestor).challenge("MFA is enforced", None, true).await.unwrap();

    let m = &response.matches[0];
    assert_eq!(m.status, ChallengeStatus::Missing);
    let gap = m.gap.as_ref().expect("gap should be qualified");
    assert_eq!(gap.qualification(), GapQualification::MechanismOnlyNoVerification);
    assert!(gap.evidence()[0].source.starts_with("identity#u1"));
}

#[tokio::test]
async fn test_topic_without_statement_qualifies_gap() {
    let ingestor = corpus(vec![
        tls_minimum(),
        mentioned("roadmap", "Our MFA roadmap is published every quarter."),
    ])
    .await;
    let response = challenger(&ingestor).challenge("MFA is enforced", None, true).await.unwrap();

    let gap = response.matches[0].gap.as_ref().expect("gap should be qualified");
    assert_eq!(gap.qualification(), GapQualification::NoExplicitAssertion);
    assert!(!gap.evidence().is_empty());
}

#[tokio::test]
async fn test_fact_in_other_region_is_scope_unspecified() {
    let ingestor = corpus(vec![stated(
        "eu-annex",
        "EU endpoints enforce TLS minimum version 1.2.",
        "TLS minimum version 1.2",
        ContextFrame::new().with_region("EU"),
    )])
    .await;

    let us = ContextFrame::new().with_region("US");
    let response = challenger(&ingestor)
        .challenge("TLS 1.3 is used", Some(us), true)
        .await
        .unwrap();

    let m = &response.matches[0];
    assert_eq!(m.status, ChallengeStatus::Missing);
    let gap = m.gap.as_ref().expect("gap should be qualified");
    assert_eq!(gap.qualification(), GapQualification::ScopeUnspecified);
}

#[tokio::test]
async fn test_every_claim_gets_exactly_one_match() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let text = "TLS 1.3 is used. The sky is blue. MFA is enforced but backups are taken daily.";
    let response = challenger(&ingestor).challenge(text, None, false).await.unwrap();

    assert_eq!(response.claims.len(), response.matches.len());
    assert_eq!(response.summary.total, response.claims.len());
    for (claim, m) in response.claims.iter().zip(&response.matches) {
        assert_eq!(claim, &m.claim);
    }
    assert_eq!(response.matches[0].status, ChallengeStatus::Confirmed);
    assert_eq!(response.matches[1].status, ChallengeStatus::Unmapped);
}

#[tokio::test]
async fn test_decision_is_partially_supported() {
    let ingestor = corpus(vec![
        tls_minimum(),
        mentioned("identity", "MFA is handled by the corporate identity provider."),
    ])
    .await;
    let builder = DecisionBuilder::new(ingestor.store(), &ChallengeConfig::default()).unwrap();

    let package = builder
        .decide(
            "Can we meet the customer's security baseline?",
            &[TLS_KEY.to_string(), MFA_KEY.to_string()],
            None,
        )
        .unwrap();

    assert_eq!(package.status(), DecisionStatus::PartiallySupported);
    let claims = package.claims();
    assert_eq!(claims.len(), 2);
    assert_eq!(claims[0].status, ClaimStatus::Supported);
    assert_eq!(claims[0].text, "What is the minimum TLS version?");
    assert!(matches!(&claims[0].support, ClaimSupport::Facts { facts } if facts.len() == 1));
    assert_eq!(claims[1].status, ClaimStatus::Missing);
    assert!(matches!(&claims[1].support, ClaimSupport::Gap { .. }));
}

#[tokio::test]
async fn test_decision_cites_contradicting_facts() {
    let ingestor = corpus(vec![
        tls_minimum(),
        stated(
            "legacy",
            "Legacy clients: TLS 1.0 is supported.",
            "TLS 1.0 is supported",
            ContextFrame::new(),
        ),
    ])
    .await;
    let builder = DecisionBuilder::new(ingestor.store(), &ChallengeConfig::default()).unwrap();

    let package = builder
        .decide("Is transport security consistent?", &[TLS_KEY.to_string()], None)
        .unwrap();

    assert_eq!(package.status(), DecisionStatus::NotSupported);
    let claim = &package.claims()[0];
    assert_eq!(claim.status, ClaimStatus::Contradicted);
    match &claim.support {
        ClaimSupport::Gap { gap } => {
            assert_eq!(gap.qualification(), GapQualification::Contradiction);
            assert_eq!(gap.evidence().len(), 2);
        }
        other => panic!("expected a contradiction gap, got {:?}", other),
    }
}

#[tokio::test]
async fn test_decision_with_no_keys_is_not_supported() {
    let ingestor = corpus(vec![tls_minimum()]).await;
    let builder = DecisionBuilder::new(ingestor.store(), &ChallengeConfig::default()).unwrap();

    let package = builder.decide("Anything?", &[], None).unwrap();
    assert_eq!(package.status(), DecisionStatus::NotSupported);
    assert!(package.claims().is_empty());
}
