//! Segmentation of free text into candidate claims

use crate::ExtractorError;
use regex::{Regex, RegexBuilder};

const CONJUNCTION: &str = r"\s*,?\s*\b(but|whereas|while|and|or)\b\s*";

const VERB_MARKER: &str = r"\b(is|are|was|were|be|been|has|have|had|must|shall|should|will|can|may|does|do|uses?|supports?|provides?|requires?|enforces?|offers?|includes?|runs?|stores?|encrypts?|retains?|keeps?|takes?|responds?)\b";

/// Splits text into claims
///
/// Sentences end at `.`, `!`, `?` or `;` followed by whitespace, so version
/// numbers survive. Contrastive conjunctions (but, whereas, while) always
/// split; "and" / "or" split only when both sides carry a verb, so
/// "encryption and MFA are required" stays one claim.
///
/// # Examples
///
/// ```
/// use attest_extractor::ClaimSegmenter;
///
/// let segmenter = ClaimSegmenter::new(8).unwrap();
/// let claims = segmenter.segment("TLS 1.3 is used and MFA is enforced. Ok.");
/// assert_eq!(claims, vec!["TLS 1.3 is used", "MFA is enforced"]);
/// ```
pub struct ClaimSegmenter {
    min_length: usize,
    conjunction: Regex,
    verb: Regex,
}

impl ClaimSegmenter {
    /// Create a segmenter dropping fragments shorter than `min_length` characters
    pub fn new(min_length: usize) -> Result<Self, ExtractorError> {
        let compile = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| ExtractorError::Pattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
        };
        Ok(Self {
            min_length,
            conjunction: compile(CONJUNCTION)?,
            verb: compile(VERB_MARKER)?,
        })
    }

    /// Minimum fragment length
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Segment text into claims, in order
    pub fn segment(&self, text: &str) -> Vec<String> {
        sentences(text)
            .into_iter()
            .flat_map(|sentence| self.split_conjunctions(sentence))
            .map(|fragment| clean(&fragment))
            .filter(|fragment| fragment.chars().count() >= self.min_length)
            .collect()
    }

    fn split_conjunctions(&self, sentence: &str) -> Vec<String> {
        let matches: Vec<_> = self.conjunction.captures_iter(sentence).collect();
        if matches.is_empty() {
            return vec![sentence.to_string()];
        }

        let mut parts = Vec::new();
        let mut current = String::new();
        let mut cursor = 0;

        for (i, caps) in matches.iter().enumerate() {
            let (Some(whole), Some(word)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            current.push_str(&sentence[cursor..whole.start()]);

            let next_start = matches
                .get(i + 1)
                .and_then(|c| c.get(0))
                .map_or(sentence.len(), |m| m.start());
            let right = &sentence[whole.end()..next_start];

            let contrastive = matches!(word.as_str().to_lowercase().as_str(), "but" | "whereas" | "while");
            let split = contrastive || (self.verb.is_match(&current) && self.verb.is_match(right));

            if split {
                parts.push(std::mem::take(&mut current));
            } else {
                current.push_str(whole.as_str());
            }
            cursor = whole.end();
        }

        current.push_str(&sentence[cursor..]);
        parts.push(current);
        parts
    }
}

/// Split on sentence punctuation followed by whitespace, and on line breaks
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' => true,
            '.' | '!' | '?' | ';' => chars.peek().map_or(true, |(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            let end = i + c.len_utf8();
            out.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

fn clean(fragment: &str) -> String {
    fragment
        .trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ';' | ','))
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<String> {
        ClaimSegmenter::new(8).unwrap().segment(text)
    }

    #[test]
    fn test_sentences_keep_version_numbers() {
        assert_eq!(
            segment("TLS 1.3 is used. Backups run daily!"),
            vec!["TLS 1.3 is used", "Backups run daily"]
        );
    }

    #[test]
    fn test_contrastive_conjunctions_always_split() {
        assert_eq!(
            segment("TLS 1.2 is supported, but TLS 1.0 is disabled"),
            vec!["TLS 1.2 is supported", "TLS 1.0 is disabled"]
        );
        assert_eq!(
            segment("Backups run daily while logs are kept for a year"),
            vec!["Backups run daily", "logs are kept for a year"]
        );
    }

    #[test]
    fn test_and_without_verbs_on_both_sides_stays() {
        assert_eq!(
            segment("Encryption and MFA are required"),
            vec!["Encryption and MFA are required"]
        );
    }

    #[test]
    fn test_and_between_clauses_splits() {
        assert_eq!(
            segment("Data is encrypted at rest and backups are taken hourly"),
            vec!["Data is encrypted at rest", "backups are taken hourly"]
        );
    }

    #[test]
    fn test_short_fragments_are_dropped() {
        assert_eq!(segment("Yes. TLS 1.3 is used; ok"), vec!["TLS 1.3 is used"]);
        assert!(segment("").is_empty());
    }

    #[test]
    fn test_semicolons_and_lines() {
        assert_eq!(
            segment("MFA is enforced; SSO is supported\nAudit logs are kept"),
            vec!["MFA is enforced", "SSO is supported", "Audit logs are kept"]
        );
    }
}
