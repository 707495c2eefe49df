//! Claim key pattern registry

use attest_domain::ValueKind;
use serde::{Deserialize, Serialize};

/// How a registry entry recognises text
///
/// New matcher kinds are added as variants; the resolver dispatches on the
/// compiled form and never inspects entries otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Matcher {
    /// Case-insensitive regex; named and numbered groups fill placeholders
    Regex {
        /// Regex source
        pattern: String,
    },
    /// Every keyword must start a word somewhere in the text
    Keywords {
        /// Required keywords (case-insensitive)
        all: Vec<String>,
    },
}

impl Matcher {
    /// Regex matcher
    pub fn regex(pattern: impl Into<String>) -> Self {
        Matcher::Regex {
            pattern: pattern.into(),
        }
    }

    /// Keyword-set matcher
    pub fn keywords(all: &[&str]) -> Self {
        Matcher::Keywords {
            all: all.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// One entry of the ordered registry
///
/// Templates may use `{product}`, `{edition}`, `{region}`, `{version}`,
/// `{deployment}` and `{theme}` from the active context, plus any named or
/// numbered capture group of a regex matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Recogniser
    pub matcher: Matcher,
    /// Machine key template, e.g. `data.retention.{subject}`
    pub key: String,
    /// Domain tag
    pub domain: String,
    /// Canonical question template
    pub question: String,
    /// Value kind the key expects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_kind: Option<ValueKind>,
}

impl PatternEntry {
    fn new(
        matcher: Matcher,
        key: &str,
        domain: &str,
        question: &str,
        expected_kind: Option<ValueKind>,
    ) -> Self {
        Self {
            matcher,
            key: key.to_string(),
            domain: domain.to_string(),
            question: question.to_string(),
            expected_kind,
        }
    }
}

const RETENTION_SUBJECTS: &str = r"(?P<subject>audit log|log|backup|customer data|personal data|tenant data)s?";

/// The built-in registry, in priority order
pub fn default_registry() -> Vec<PatternEntry> {
    use ValueKind::*;

    vec![
        PatternEntry::new(
            Matcher::regex(r"\b(?:tls|ssl)"),
            "security.tls.min_version",
            "security",
            "What is the minimum TLS version?",
            Some(Version),
        ),
        PatternEntry::new(
            Matcher::keywords(&["encrypt", "in transit"]),
            "security.encryption.in_transit",
            "security",
            "Is data encrypted in transit?",
            Some(Boolean),
        ),
        PatternEntry::new(
            Matcher::keywords(&["encrypt", "at rest"]),
            "security.encryption.at_rest",
            "security",
            "Is data encrypted at rest?",
            Some(Boolean),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:mfa|2fa|multi[- ]factor|two[- ]factor)\b"),
            "security.mfa.required",
            "security",
            "Is multi-factor authentication required?",
            Some(Boolean),
        ),
        PatternEntry::new(
            Matcher::regex(r"\bpasswords?\b.*\b(?:length|characters?|chars)\b"),
            "security.password.min_length",
            "security",
            "What is the minimum password length?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(format!(
                r"\b{}\b.*\b(?:retain(?:ed)?|retention|kept|deleted after|purged after)\b",
                RETENTION_SUBJECTS
            )),
            "data.retention.{subject}",
            "data",
            "How long are {subject}s retained?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(format!(
                r"\b(?:retain(?:ed)?|retention|kept)\b.*\b{}\b",
                RETENTION_SUBJECTS
            )),
            "data.retention.{subject}",
            "data",
            "How long are {subject}s retained?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:retain(?:ed)?|retention)\b"),
            "data.retention.{theme}",
            "data",
            "How long is {theme} data retained?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:backups?|snapshots?)\b"),
            "data.backup.frequency",
            "data",
            "How often are backups taken?",
            Some(Token),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:availability|uptime|sla)\b"),
            "service.availability.sla",
            "service",
            "What availability does the service level agreement guarantee?",
            Some(Percent),
        ),
        PatternEntry::new(
            Matcher::regex(
                r"\b(?:support|incidents?|tickets?)\b.*\b(?:respon\w*|acknowledg\w*)\b|\brespon\w*\s+(?:time|within)\b",
            ),
            "support.response_time",
            "support",
            "How quickly does support respond?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:storage|capacity|disk space|quota)\b"),
            "{product}.storage.capacity",
            "service",
            "How much storage does {product} include?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:storage|capacity|disk space|quota)\b"),
            "storage.capacity",
            "service",
            "How much storage is included?",
            Some(Number),
        ),
        PatternEntry::new(
            Matcher::regex(r"\baudit (?:logs?|logging|trails?)\b"),
            "security.audit_logging.enabled",
            "security",
            "Is audit logging enabled?",
            Some(Boolean),
        ),
        PatternEntry::new(
            Matcher::regex(r"\b(?:edition|plan|tier)s?\b"),
            "availability.{theme}.edition",
            "commercial",
            "Which edition includes {theme}?",
            Some(Token),
        ),
        PatternEntry::new(
            Matcher::regex(r"\bresponsib\w*"),
            "responsibility.{theme}",
            "governance",
            "Who is responsible for {theme}?",
            Some(Token),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_keys_are_unique_per_matcher() {
        let registry = default_registry();
        assert!(!registry.is_empty());
        for (i, a) in registry.iter().enumerate() {
            for b in registry.iter().skip(i + 1) {
                assert!(
                    a.key != b.key || a.matcher != b.matcher,
                    "duplicate entry for {}",
                    a.key
                );
            }
        }
    }

    #[test]
    fn test_matcher_json_is_tagged() {
        let json = serde_json::to_value(Matcher::keywords(&["encrypt", "at rest"])).unwrap();
        assert_eq!(json["type"], "keywords");
        assert_eq!(json["all"][1], "at rest");
    }
}
