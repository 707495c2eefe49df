//! Engine composition over an on-disk database and audit directory

use attest_challenge::ChallengeStatus;
use attest_cli::commands::ingest::parse_requests;
use attest_cli::{CliError, Config, Engine};
use attest_domain::{DecisionStatus, FactStore, Maturity, PromotionStatus};
use std::fs;
use tempfile::TempDir;

const CORPUS: &str = r#"[
    {
        "unit": {
            "document_id": "whitepaper",
            "unit_id": "p3-2",
            "text": "All endpoints enforce TLS minimum version 1.2. Marketing says we are the best.",
            "position": { "page": 3, "paragraph": 2 }
        },
        "assertions": [
            {
                "text": "TLS minimum version 1.2",
                "quote": "TLS minimum version 1.2",
                "assertion_type": "prescriptive",
                "role": "fact",
                "position": { "page": 3, "paragraph": 2 },
                "confidence": 0.9
            },
            {
                "text": "Marketing says we are the best",
                "quote": "Marketing says we are the best",
                "assertion_type": "comparative",
                "role": "fact",
                "position": { "page": 3, "paragraph": 2 },
                "confidence": 0.9
            }
        ]
    }
]"#;

fn open(dir: &TempDir, tenant: &str) -> Engine {
    Engine::open(Config::default(), &dir.path().join("data").join("attest.db"), tenant).unwrap()
}

#[tokio::test]
async fn test_ingest_then_challenge() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir, "acme");

    let report = engine
        .ingestor()
        .unwrap()
        .ingest(parse_requests(CORPUS).unwrap())
        .await
        .unwrap();
    assert_eq!(report.count(PromotionStatus::Linked), 1);
    assert!(report.failures.is_empty());

    let response = engine
        .challenger()
        .unwrap()
        .challenge("TLS 1.3 is used", None, true)
        .await
        .unwrap();
    assert_eq!(response.matches[0].status, ChallengeStatus::Confirmed);
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let engine = open(&dir, "acme");
        engine
            .ingestor()
            .unwrap()
            .ingest(parse_requests(CORPUS).unwrap())
            .await
            .unwrap();
    }

    assert!(dir.path().join("data").join("audit").join("acme.jsonl").exists());

    let engine = open(&dir, "acme");
    let stats = engine.audit().stats().unwrap();
    assert_eq!(stats.linked, 1);
    assert_eq!(stats.total, 2);

    let store = engine.store();
    let keys = store.lock().unwrap().find_claim_keys("tls").unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0].supporting_facts, 1);
}

#[tokio::test]
async fn test_tenants_have_separate_audit_logs() {
    let dir = TempDir::new().unwrap();
    let acme = open(&dir, "acme");
    acme.ingestor()
        .unwrap()
        .ingest(parse_requests(CORPUS).unwrap())
        .await
        .unwrap();

    let globex = open(&dir, "globex");
    assert_eq!(globex.audit().stats().unwrap().total, 0);
    assert_eq!(acme.audit().stats().unwrap().total, 2);
}

#[test]
fn test_invalid_tenant_is_rejected() {
    let dir = TempDir::new().unwrap();
    let result = Engine::open(Config::default(), &dir.path().join("attest.db"), "../etc");
    assert!(matches!(result, Err(CliError::Audit(_))));
}

#[tokio::test]
async fn test_decide_and_deprecate() {
    let dir = TempDir::new().unwrap();
    let engine = open(&dir, "acme");
    engine
        .ingestor()
        .unwrap()
        .ingest(parse_requests(CORPUS).unwrap())
        .await
        .unwrap();

    let package = engine
        .decisions()
        .unwrap()
        .decide("Is transport encrypted?", &["security.tls.min_version".to_string()], None)
        .unwrap();
    assert_eq!(package.status(), DecisionStatus::Supported);

    let store = engine.store();
    let mut lifecycle = engine.lifecycle().unwrap();
    let key = lifecycle
        .deprecate(&mut *store.lock().unwrap(), "security.tls.min_version", Some("security.tls.policy"))
        .unwrap();
    assert_eq!(key.maturity, Maturity::Deprecated);

    let report = lifecycle.sweep(&mut *store.lock().unwrap()).unwrap();
    assert_eq!(report.keys_checked, 1);
    assert!(report.transitions.is_empty());
}

#[test]
fn test_config_file_drives_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("attest.toml");
    fs::write(
        &path,
        format!(
            r#"
[settings]
tenant = "acme"
database = "{}"

[challenge]
max_excerpts = 1
"#,
            dir.path().join("facts.db").display()
        ),
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert_eq!(config.settings.tenant, "acme");
    assert_eq!(config.challenge.max_excerpts, 1);

    let database = config.database_path(None).unwrap();
    let engine = Engine::open(config, &database, "acme").unwrap();
    assert_eq!(engine.database(), dir.path().join("facts.db"));
    assert!(engine.audit().path().is_some());
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = Config::load(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(CliError::Config(_))));
}
