//! Integration tests for the Ingestor

#[cfg(test)]
mod tests {
    use crate::{ExtractorConfig, IngestRequest, Ingestor};
    use attest_audit::{AuditAction, AuditConfig, AuditLog};
    use attest_domain::{
        AssertionType, ContextFrame, ExtractedAssertion, FactStore, Maturity, Position, PromotionStatus,
        RhetoricalRole, TensionLevel, TextUnit,
    };
    use attest_gatekeeper::PromotionClassifier;
    use attest_janitor::LifecycleManager;
    use attest_store::SqliteStore;
    use std::sync::Arc;

    const TLS_KEY: &str = "security.tls.min_version";

    fn ingestor_with(config: ExtractorConfig) -> Ingestor<SqliteStore> {
        Ingestor::new(
            SqliteStore::new(":memory:").unwrap(),
            PromotionClassifier::default_config().unwrap(),
            LifecycleManager::default_config(),
            Arc::new(AuditLog::in_memory("acme", AuditConfig::default()).unwrap()),
            config,
        )
        .unwrap()
    }

    fn ingestor() -> Ingestor<SqliteStore> {
        ingestor_with(ExtractorConfig::default())
    }

    /// One unit whose assertions quote it verbatim
    fn request(document_id: &str, unit_text: &str, quotes: &[&str]) -> IngestRequest {
        let position = Position::new(1, 0);
        IngestRequest {
            unit: TextUnit {
                document_id: document_id.to_string(),
                unit_id: "u1".to_string(),
                text: unit_text.to_string(),
                position,
                context: ContextFrame::new(),
                theme: None,
            },
            assertions: quotes
                .iter()
                .map(|q| ExtractedAssertion {
                    text: q.to_string(),
                    quote: q.to_string(),
                    assertion_type: AssertionType::Prescriptive,
                    role: RhetoricalRole::Fact,
                    position,
                    confidence: 0.8,
                    overrides: None,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_full_ingestion_flow() {
        let ingestor = ingestor();
        let report = ingestor
            .ingest(vec![request(
                "whitepaper",
                "All endpoints enforce TLS minimum version 1.2.",
                &["TLS minimum version 1.2"],
            )])
            .await
            .unwrap();

        assert_eq!(report.count(PromotionStatus::Linked), 1);
        assert_eq!(report.created(), 1);
        assert!(report.failures.is_empty());

        let outcome = &report.units[0].outcomes[0];
        assert_eq!(outcome.claim_key.as_deref(), Some(TLS_KEY));
        assert_eq!(outcome.value.as_deref(), Some(">= 1.2.0"));

        let store = ingestor.store();
        let store = store.lock().unwrap();
        let key = store.get_claim_key(TLS_KEY).unwrap().unwrap();
        assert_eq!(key.maturity, Maturity::Emergent);
        assert_eq!(key.supporting_facts, 1);

        let records = ingestor.audit().records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, AuditAction::Accept);
        assert_eq!(records[0].claim_key.as_deref(), Some(TLS_KEY));
    }

    #[tokio::test]
    async fn test_reingestion_is_idempotent() {
        let ingestor = ingestor();
        let req = request(
            "whitepaper",
            "All endpoints enforce TLS minimum version 1.2.",
            &["TLS minimum version 1.2"],
        );

        ingestor.ingest(vec![req.clone()]).await.unwrap();
        let second = ingestor.ingest(vec![req]).await.unwrap();

        assert_eq!(second.created(), 0);
        assert_eq!(second.merged(), 1);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        assert_eq!(store.count_facts(None).unwrap(), 1);

        let fact_id = second.units[0].outcomes[0].fact_id.unwrap();
        let fact = store.get_fact(fact_id).unwrap().unwrap();
        assert_eq!(fact.sources.len(), 1);
    }

    #[tokio::test]
    async fn test_second_document_makes_key_comparable() {
        let ingestor = ingestor();
        ingestor
            .ingest(vec![request("doc-a", "TLS minimum version 1.2 applies.", &["TLS minimum version 1.2"])])
            .await
            .unwrap();
        let report = ingestor
            .ingest(vec![request("doc-b", "We require TLS minimum version 1.2 too.", &["TLS minimum version 1.2"])])
            .await
            .unwrap();

        assert_eq!(report.merged(), 1);
        let transition = &report.units[0].transitions[0];
        assert_eq!(transition.from, Maturity::Emergent);
        assert_eq!(transition.to, Maturity::Comparable);
    }

    #[tokio::test]
    async fn test_hard_tension_flags_contradiction() {
        let ingestor = ingestor();
        ingestor
            .ingest(vec![request("doc-a", "TLS minimum version 1.2 applies.", &["TLS minimum version 1.2"])])
            .await
            .unwrap();
        let report = ingestor
            .ingest(vec![request("doc-b", "Legacy clients: TLS 1.0 is supported.", &["TLS 1.0 is supported"])])
            .await
            .unwrap();

        let tensions: Vec<_> = report.tensions().collect();
        assert_eq!(tensions.len(), 1);
        assert_eq!(tensions[0].level, TensionLevel::Hard);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        assert!(store.get_claim_key(TLS_KEY).unwrap().unwrap().contradiction);
    }

    #[tokio::test]
    async fn test_soft_tension_does_not_flag() {
        let ingestor = ingestor();
        ingestor
            .ingest(vec![request("doc-a", "TLS minimum version 1.2 applies.", &["TLS minimum version 1.2"])])
            .await
            .unwrap();
        let report = ingestor
            .ingest(vec![request("doc-b", "Our edge uses TLS 1.3 for all traffic.", &["uses TLS 1.3 for all traffic"])])
            .await
            .unwrap();

        let tensions: Vec<_> = report.tensions().collect();
        assert_eq!(tensions.len(), 1);
        assert_eq!(tensions[0].level, TensionLevel::Soft);

        let store = ingestor.store();
        let store = store.lock().unwrap();
        assert!(!store.get_claim_key(TLS_KEY).unwrap().unwrap().contradiction);
    }

    #[tokio::test]
    async fn test_paraphrased_quote_is_rejected_and_audited() {
        let ingestor = ingestor();
        let mut req = request("whitepaper", "All endpoints enforce TLS minimum version 1.2.", &[]);
        req.assertions.push(ExtractedAssertion {
            text: "TLS 1.2 at least".to_string(),
            quote: "TLS must be at least 1.2".to_string(),
            assertion_type: AssertionType::Prescriptive,
            role: RhetoricalRole::Fact,
            position: Position::new(1, 0),
            confidence: 0.9,
            overrides: None,
        });

        let report = ingestor.ingest(vec![req]).await.unwrap();
        assert_eq!(report.count(PromotionStatus::Rejected), 1);
        assert_eq!(report.units[0].outcomes[0].reason, "quote_not_in_source");

        let store = ingestor.store();
        assert_eq!(store.lock().unwrap().count_facts(None).unwrap(), 0);

        let records = ingestor.audit().records().unwrap();
        assert_eq!(records[0].action, AuditAction::Reject);
        assert_eq!(records[0].reason, "quote_not_in_source");
    }

    #[tokio::test]
    async fn test_unmatched_assertion_is_kept_unlinked() {
        let ingestor = ingestor();
        let report = ingestor
            .ingest(vec![request(
                "whitepaper",
                "Escrow agreements are available on request.",
                &["Escrow agreements are available on request"],
            )])
            .await
            .unwrap();

        assert_eq!(report.count(PromotionStatus::Unlinked), 1);
        assert_eq!(report.units[0].outcomes[0].reason, "no_pattern_match");

        let store = ingestor.store();
        let store = store.lock().unwrap();
        assert_eq!(store.count_facts(Some(PromotionStatus::Unlinked)).unwrap(), 1);
        assert!(store.find_claim_keys("").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_too_many_assertions_halts_only_that_unit() {
        let config = ExtractorConfig {
            max_assertions_per_unit: 1,
            ..Default::default()
        };
        let ingestor = ingestor_with(config);

        let crowded = request(
            "doc-a",
            "MFA is enforced. TLS minimum version 1.2 applies.",
            &["MFA is enforced", "TLS minimum version 1.2"],
        );
        let fine = request("doc-b", "TLS minimum version 1.2 applies.", &["TLS minimum version 1.2"]);

        let report = ingestor.ingest(vec![crowded, fine]).await.unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].document_id, "doc-a");
        assert_eq!(report.units.len(), 1);
        assert_eq!(report.units[0].document_id, "doc-b");
    }

    #[tokio::test]
    async fn test_units_are_reported_in_input_order() {
        let config = ExtractorConfig {
            concurrency: 3,
            ..Default::default()
        };
        let ingestor = ingestor_with(config);

        let requests: Vec<_> = (0..10)
            .map(|i| {
                request(
                    &format!("doc-{}", i),
                    "TLS minimum version 1.2 applies.",
                    &["TLS minimum version 1.2"],
                )
            })
            .collect();

        let report = ingestor.ingest(requests).await.unwrap();
        let order: Vec<_> = report.units.iter().map(|u| u.document_id.clone()).collect();
        let expected: Vec<_> = (0..10).map(|i| format!("doc-{}", i)).collect();
        assert_eq!(order, expected);
        assert_eq!(report.created(), 1);
        assert_eq!(report.merged(), 9);
    }

    #[tokio::test]
    async fn test_unlinked_rate_alert() {
        let ingestor = ingestor();
        let requests: Vec<_> = (0..20)
            .map(|i| {
                let quote = format!("Escrow agreement {} is available on request", i);
                let text = format!("{}.", quote);
                request(&format!("doc-{}", i), &text, &[quote.as_str()])
            })
            .collect();

        let report = ingestor.ingest(requests).await.unwrap();
        let alert = report.alert.expect("alert should be raised");
        assert_eq!(alert.sample, 20);
        assert_eq!(alert.rate, 1.0);
        assert_eq!(alert.backlog.tenant, "acme");
        assert_eq!(alert.backlog.unlinked_records, 20);
        let escrow = alert.backlog.entries.iter().find(|e| e.keyword == "escrow").unwrap();
        assert_eq!(escrow.count, 20);
    }

    #[test]
    fn test_empty_run_outside_async_context() {
        let ingestor = ingestor();
        let report = tokio_test::block_on(ingestor.ingest(Vec::new())).unwrap();
        assert!(report.units.is_empty());
        assert!(report.alert.is_none());
    }
}
