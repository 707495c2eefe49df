//! Missing-pattern backlog derived from unlinked records

use crate::record::AuditRecord;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

const STOPWORDS: &[&str] = &[
    "about", "above", "after", "also", "been", "before", "being", "between", "both", "but", "by",
    "can", "could", "does", "each", "from", "have", "here", "into", "just", "more", "most", "must",
    "only", "other", "over", "same", "shall", "should", "some", "such", "than", "that", "their",
    "them", "then", "there", "these", "they", "this", "those", "through", "under", "very", "were",
    "what", "when", "where", "which", "while", "will", "with", "within", "would", "your",
];

const MAX_EXAMPLES: usize = 3;

/// One keyword of the backlog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacklogEntry {
    /// Lowercased keyword
    pub keyword: String,
    /// Unlinked records containing it
    pub count: usize,
    /// A few assertion texts containing it
    pub examples: Vec<String>,
}

/// Ranked keywords of unlinked assertions, to drive pattern growth
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BacklogReport {
    /// Tenant
    pub tenant: String,
    /// Unlinked records no pattern matched
    pub unlinked_records: usize,
    /// Keywords, most frequent first
    pub entries: Vec<BacklogEntry>,
}

impl BacklogReport {
    /// Build the backlog from audit records
    ///
    /// Each keyword counts once per record. Ties are broken alphabetically
    /// so the report is stable.
    pub fn build(tenant: &str, records: &[AuditRecord], top_n: usize, min_keyword_length: usize) -> Self {
        let mut counts: BTreeMap<String, (usize, Vec<String>)> = BTreeMap::new();
        let mut unlinked_records = 0;

        for record in records.iter().filter(|r| r.is_pattern_miss()) {
            unlinked_records += 1;
            for keyword in keywords(&record.text, min_keyword_length) {
                let entry = counts.entry(keyword).or_insert_with(|| (0, Vec::new()));
                entry.0 += 1;
                if entry.1.len() < MAX_EXAMPLES {
                    entry.1.push(record.text.clone());
                }
            }
        }

        let mut entries: Vec<BacklogEntry> = counts
            .into_iter()
            .map(|(keyword, (count, examples))| BacklogEntry {
                keyword,
                count,
                examples,
            })
            .collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.keyword.cmp(&b.keyword)));
        entries.truncate(top_n);

        Self {
            tenant: tenant.to_string(),
            unlinked_records,
            entries,
        }
    }

    /// Render as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "# Pattern backlog: {}\n\n{} unlinked assertions.\n\n",
            self.tenant, self.unlinked_records
        );
        if self.entries.is_empty() {
            out.push_str("No keywords to report.\n");
            return out;
        }

        out.push_str("| Keyword | Count | Example |\n|---|---|---|\n");
        for entry in &self.entries {
            let example = entry
                .examples
                .first()
                .map(|e| e.replace('|', "\\|"))
                .unwrap_or_default();
            out.push_str(&format!("| {} | {} | {} |\n", entry.keyword, entry.count, example));
        }
        out
    }
}

/// Distinct candidate keywords of a text
fn keywords(text: &str, min_length: usize) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| w.chars().count() >= min_length)
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}
