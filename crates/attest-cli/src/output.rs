//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use attest_audit::{AuditStats, BacklogReport, UnlinkedAlert};
use attest_challenge::{ChallengeResponse, ChallengeStatus};
use attest_domain::{ClaimKey, ClaimStatus, ClaimSupport, DecisionPackage, DecisionStatus, PromotionStatus};
use attest_extractor::IngestReport;
use attest_janitor::SweepReport;
use colored::*;
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self { format, color_enabled }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an ingestion report.
    pub fn format_ingest(&self, report: &IngestReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_ingest_json(report),
            OutputFormat::Table => Ok(self.format_ingest_table(report)),
        }
    }

    fn format_ingest_json(&self, report: &IngestReport) -> Result<String> {
        let units: Vec<serde_json::Value> = report
            .units
            .iter()
            .map(|u| {
                serde_json::json!({
                    "document_id": u.document_id,
                    "unit_id": u.unit_id,
                    "outcomes": u.outcomes.iter().map(|o| serde_json::json!({
                        "text": o.text,
                        "status": o.status,
                        "reason": o.reason,
                        "claim_key": o.claim_key,
                        "value": o.value,
                        "fact_id": o.fact_id.map(|id| id.to_string()),
                        "created": o.created,
                    })).collect::<Vec<_>>(),
                    "tensions": u.tensions,
                    "transitions": u.transitions,
                })
            })
            .collect();

        let failures: Vec<serde_json::Value> = report
            .failures
            .iter()
            .map(|f| {
                serde_json::json!({
                    "document_id": f.document_id,
                    "unit_id": f.unit_id,
                    "error": f.error,
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&serde_json::json!({
            "summary": {
                "linked": report.count(PromotionStatus::Linked),
                "unlinked": report.count(PromotionStatus::Unlinked),
                "rejected": report.count(PromotionStatus::Rejected),
                "created": report.created(),
                "merged": report.merged(),
            },
            "units": units,
            "failures": failures,
            "alert": report.alert,
        }))?)
    }

    fn format_ingest_table(&self, report: &IngestReport) -> String {
        let mut builder = Builder::default();
        builder.push_record(["Unit", "Status", "Reason", "Claim Key", "Value"]);

        for unit in &report.units {
            let label = format!("{}#{}", unit.document_id, unit.unit_id);
            for outcome in &unit.outcomes {
                builder.push_record([
                    label.as_str(),
                    outcome.status.as_str(),
                    outcome.reason,
                    outcome.claim_key.as_deref().unwrap_or("-"),
                    outcome.value.as_deref().unwrap_or("-"),
                ]);
            }
        }

        let mut out = Vec::new();
        if report.units.iter().any(|u| !u.outcomes.is_empty()) {
            out.push(self.table(builder));
        }

        out.push(self.success(&format!(
            "{} linked, {} unlinked, {} rejected ({} new facts, {} merged)",
            report.count(PromotionStatus::Linked),
            report.count(PromotionStatus::Unlinked),
            report.count(PromotionStatus::Rejected),
            report.created(),
            report.merged()
        )));

        for tension in report.tensions() {
            out.push(self.warning(&format!("{} tension: {}", tension.level.as_str(), tension.explanation)));
        }
        for failure in &report.failures {
            out.push(self.error(&format!(
                "{}#{} failed: {}",
                failure.document_id, failure.unit_id, failure.error
            )));
        }
        if let Some(alert) = &report.alert {
            out.push(self.format_alert_table(alert));
        }

        out.join("\n")
    }

    /// Format an unlinked-rate alert together with its backlog.
    pub fn format_alert(&self, alert: &UnlinkedAlert) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(alert),
            OutputFormat::Table => Ok(self.format_alert_table(alert)),
        }
    }

    fn format_alert_table(&self, alert: &UnlinkedAlert) -> String {
        format!(
            "{}\n\n{}",
            self.warning(&format!(
                "Unlinked rate {:.0}% exceeds {:.0}% over {} accepted assertions",
                alert.rate * 100.0,
                alert.threshold * 100.0,
                alert.sample
            )),
            alert.backlog.to_markdown()
        )
    }

    /// Format a challenge response.
    pub fn format_challenge(&self, response: &ChallengeResponse) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(response);
        }

        if response.matches.is_empty() {
            return Ok(self.colorize("No claims found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Claim", "Status", "Claim Key", "Tension", "Explanation"]);
        for m in &response.matches {
            builder.push_record([
                m.claim.clone(),
                self.colorize(m.status.as_str(), challenge_color(m.status)),
                m.claim_key.clone().unwrap_or_else(|| "-".to_string()),
                m.tension.map_or("-", |t| t.as_str()).to_string(),
                m.explanation.clone(),
            ]);
        }

        let summary = &response.summary;
        let mut out = vec![
            self.table(builder),
            self.info(&format!(
                "{} claims: {} confirmed, {} contradicted, {} partial, {} missing, {} unmapped",
                summary.total,
                summary.confirmed,
                summary.contradicted,
                summary.partial,
                summary.missing,
                summary.unmapped
            )),
        ];
        if summary.high_unmapped_rate {
            out.push(self.warning(&format!(
                "{:.0}% of claims matched no claim key",
                summary.unmapped_rate() * 100.0
            )));
        }
        Ok(out.join("\n"))
    }

    /// Format a decision package.
    pub fn format_decision(&self, package: &DecisionPackage) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(package);
        }

        let mut builder = Builder::default();
        builder.push_record(["Claim Key", "Question", "Status", "Support"]);
        for claim in package.claims() {
            let support = match &claim.support {
                ClaimSupport::Facts { facts } => format!("{} fact(s)", facts.len()),
                ClaimSupport::Gap { gap } => format!("{}: {}", gap.qualification().as_str(), gap.description()),
            };
            builder.push_record([
                claim.claim_key.clone(),
                claim.text.clone(),
                self.colorize(claim.status.as_str(), claim_color(claim.status)),
                support,
            ]);
        }

        let verdict = format!("{}: {}", package.question(), package.status().as_str());
        let verdict = match package.status() {
            DecisionStatus::Supported => self.success(&verdict),
            DecisionStatus::PartiallySupported => self.warning(&verdict),
            DecisionStatus::NotSupported => self.error(&verdict),
        };

        if package.claims().is_empty() {
            return Ok(verdict);
        }
        Ok(format!("{}\n{}", self.table(builder), verdict))
    }

    /// Format claim keys.
    pub fn format_keys(&self, keys: &[ClaimKey]) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&keys);
        }

        if keys.is_empty() {
            return Ok(self.colorize("No claim keys found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Key", "Maturity", "Facts", "Documents", "Flags"]);
        for key in keys {
            let mut flags = Vec::new();
            if key.contradiction {
                flags.push("contradiction".to_string());
            }
            if let Some(successor) = &key.superseded_by {
                flags.push(format!("-> {}", successor));
            }
            builder.push_record([
                key.machine_key.clone(),
                key.maturity.as_str().to_string(),
                key.supporting_facts.to_string(),
                key.distinct_documents.to_string(),
                flags.join(", "),
            ]);
        }
        Ok(self.table(builder))
    }

    /// Format a lifecycle sweep.
    pub fn format_sweep(&self, report: &SweepReport) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({
                "keys_checked": report.keys_checked,
                "transitions": report.transitions,
            }));
        }

        let mut out = vec![self.success(&format!(
            "Checked {} key(s), {} changed",
            report.keys_checked,
            report.changed()
        ))];
        for t in &report.transitions {
            out.push(self.info(&format!("{}: {} -> {}", t.machine_key, t.from.as_str(), t.to.as_str())));
        }
        Ok(out.join("\n"))
    }

    /// Format audit statistics.
    pub fn format_stats(&self, tenant: &str, stats: &AuditStats) -> Result<String> {
        if self.format == OutputFormat::Json {
            return self.json(&serde_json::json!({
                "tenant": tenant,
                "stats": stats,
                "unlinked_rate": stats.unlinked_rate(),
                "rejection_rate": stats.rejection_rate(),
            }));
        }

        let mut builder = Builder::default();
        builder.push_record(["Metric", "Value"]);
        let rows = [
            ("Total", stats.total.to_string()),
            ("Accepted", stats.accepted.to_string()),
            ("Rejected", stats.rejected.to_string()),
            ("Linked", stats.linked.to_string()),
            ("Unlinked", stats.unlinked.to_string()),
            ("Pattern misses", stats.pattern_misses.to_string()),
            ("Unlinked rate", format!("{:.1}%", stats.unlinked_rate() * 100.0)),
            ("Rejection rate", format!("{:.1}%", stats.rejection_rate() * 100.0)),
        ];
        for (metric, value) in rows {
            builder.push_record([metric.to_string(), value]);
        }
        for (reason, count) in &stats.reasons {
            builder.push_record([format!("reason: {}", reason), count.to_string()]);
        }

        Ok(format!("{}\n{}", self.info(&format!("Tenant: {}", tenant)), self.table(builder)))
    }

    /// Format the pattern backlog (markdown in table mode).
    pub fn format_backlog(&self, report: &BacklogReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.json(report),
            OutputFormat::Table => Ok(report.to_markdown()),
        }
    }

    /// Serialize any value as pretty JSON.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    fn table(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn challenge_color(status: ChallengeStatus) -> &'static str {
    match status {
        ChallengeStatus::Confirmed => "green",
        ChallengeStatus::Contradicted => "red",
        ChallengeStatus::Partial => "cyan",
        ChallengeStatus::Missing => "yellow",
        ChallengeStatus::Unmapped => "magenta",
    }
}

fn claim_color(status: ClaimStatus) -> &'static str {
    match status {
        ClaimStatus::Supported => "green",
        ClaimStatus::Contradicted => "red",
        ClaimStatus::Missing => "yellow",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_challenge::{ChallengeSummary, ClaimMatch};
    use attest_domain::{ClaimKeyDraft, DecisionClaim, DocumentaryEvidence, GapQualification, GapReason, TensionLevel};

    fn confirmed() -> ClaimMatch {
        ClaimMatch {
            claim: "TLS 1.3 is used".to_string(),
            claim_key: Some("security.tls.min_version".to_string()),
            value: Some("version:1.3".to_string()),
            excerpts: vec!["TLS minimum version 1.2".to_string()],
            status: ChallengeStatus::Confirmed,
            tension: Some(TensionLevel::Soft),
            explanation: "1.3 satisfies >= 1.2".to_string(),
            gap: None,
        }
    }

    fn response(matches: Vec<ClaimMatch>) -> ChallengeResponse {
        let summary = ChallengeSummary::from_matches(&matches, 0.3);
        ChallengeResponse {
            claims: matches.iter().map(|m| m.claim.clone()).collect(),
            matches,
            summary,
        }
    }

    fn missing_claim() -> DecisionClaim {
        let gap = GapReason::new(
            "security.mfa.required",
            GapQualification::NoExplicitAssertion,
            "MFA is mentioned but never stated",
            vec![DocumentaryEvidence {
                found: "\"Our MFA roadmap\"".to_string(),
                source: "roadmap#u1".to_string(),
                rationale: "topic without statement".to_string(),
            }],
            0.5,
        )
        .unwrap();
        DecisionClaim {
            text: "Is MFA required?".to_string(),
            claim_key: "security.mfa.required".to_string(),
            status: ClaimStatus::Missing,
            support: ClaimSupport::Gap { gap },
        }
    }

    #[test]
    fn test_challenge_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_challenge(&response(vec![confirmed()])).unwrap();
        assert!(output.contains("Claim Key"));
        assert!(output.contains("confirmed"));
        assert!(output.contains("1 claims: 1 confirmed"));
    }

    #[test]
    fn test_challenge_json() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_challenge(&response(vec![confirmed()])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["matches"][0]["status"], "confirmed");
        assert_eq!(value["matches"][0]["tension"], "soft");
        assert!(value["matches"][0].get("gap").is_none());
    }

    #[test]
    fn test_empty_challenge() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_challenge(&response(vec![])).unwrap();
        assert!(output.contains("No claims found"));
    }

    #[test]
    fn test_decision_table_shows_gap() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let package = DecisionPackage::new("Is MFA enforced?", vec![missing_claim()]);
        let output = formatter.format_decision(&package).unwrap();
        assert!(output.contains("no_explicit_assertion"));
        assert!(output.contains("not_supported"));
    }

    #[test]
    fn test_decision_json_keeps_support_kind() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let package = DecisionPackage::new("Is MFA enforced?", vec![missing_claim()]);
        let value: serde_json::Value = serde_json::from_str(&formatter.format_decision(&package).unwrap()).unwrap();
        assert_eq!(value["claims"][0]["support"]["kind"], "gap");
    }

    #[test]
    fn test_keys_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut key = ClaimKey::from_draft(
            &ClaimKeyDraft {
                machine_key: "security.tls.min_version".to_string(),
                question: "What is the minimum TLS version?".to_string(),
                domain: "security".to_string(),
                expected_kind: None,
            },
            0,
        );
        key.contradiction = true;

        let output = formatter.format_keys(&[key]).unwrap();
        assert!(output.contains("security.tls.min_version"));
        assert!(output.contains("orphan"));
        assert!(output.contains("contradiction"));
    }

    #[test]
    fn test_empty_keys() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_keys(&[]).unwrap().contains("No claim keys found"));
    }

    #[test]
    fn test_stats_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_stats("acme", &AuditStats::default()).unwrap();
        assert!(output.contains("Tenant: acme"));
        assert!(output.contains("Unlinked rate"));
    }

    fn alert() -> UnlinkedAlert {
        UnlinkedAlert {
            tenant: "acme".to_string(),
            rate: 0.5,
            threshold: 0.25,
            sample: 20,
            backlog: BacklogReport {
                tenant: "acme".to_string(),
                unlinked_records: 10,
                entries: vec![attest_audit::BacklogEntry {
                    keyword: "escrow".to_string(),
                    count: 10,
                    examples: vec!["Escrow agreements are available".to_string()],
                }],
            },
        }
    }

    #[test]
    fn test_ingest_table_shows_alert_backlog() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let report = IngestReport {
            units: vec![],
            failures: vec![],
            alert: Some(alert()),
        };
        let output = formatter.format_ingest(&report).unwrap();
        assert!(output.contains("Unlinked rate 50% exceeds 25% over 20 accepted assertions"));
        assert!(output.contains("# Pattern backlog: acme"));
        assert!(output.contains("| escrow | 10 |"));
    }

    #[test]
    fn test_alert_json_carries_backlog() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let value: serde_json::Value = serde_json::from_str(&formatter.format_alert(&alert()).unwrap()).unwrap();
        assert_eq!(value["backlog"]["entries"][0]["keyword"], "escrow");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
        assert_eq!(formatter.warning("test"), "⚠ test");
    }
}
