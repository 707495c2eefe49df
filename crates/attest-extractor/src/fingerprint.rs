//! Content addressing of facts

use attest_domain::{ContextFrame, Fingerprint, TypedValue};
use sha2::{Digest, Sha256};

/// Fingerprint of a fact
///
/// SHA-256 over the claim key (or `unlinked:<normalized quote>`), the
/// canonical value (or `_`), the context key and the page bucket. Two
/// mentions of the same value for the same key, scope and page range
/// collapse into one fact.
///
/// # Examples
///
/// ```
/// use attest_extractor::fingerprint;
/// use attest_domain::ContextFrame;
///
/// let ctx = ContextFrame::new();
/// let a = fingerprint(Some("security.tls.min_version"), "TLS 1.2", None, &ctx, 3, 5);
/// let b = fingerprint(Some("security.tls.min_version"), "TLS  1.2 ", None, &ctx, 4, 5);
/// assert_eq!(a, b);
/// assert!(a.as_str().starts_with("sha256:"));
/// ```
pub fn fingerprint(
    claim_key: Option<&str>,
    quote: &str,
    value: Option<&TypedValue>,
    context: &ContextFrame,
    page: u32,
    bucket_size: u32,
) -> Fingerprint {
    let subject = match claim_key {
        Some(key) => key.to_string(),
        None => format!("unlinked:{}", normalize_quote(quote)),
    };
    let value = value.map(TypedValue::canonical).unwrap_or_else(|| "_".to_string());
    let context_key = context.context_key();
    let bucket = (page / bucket_size.max(1)).to_string();

    let mut hasher = Sha256::new();
    for part in [subject.as_str(), value.as_str(), context_key.as_str(), bucket.as_str()] {
        hasher.update(part.as_bytes());
        hasher.update([0x1fu8]);
    }
    Fingerprint::from_digest(format!("sha256:{:x}", hasher.finalize()))
}

/// Lowercase with whitespace runs collapsed
pub fn normalize_quote(quote: &str) -> String {
    quote
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use attest_domain::{Comparability, NormalizedValue, Operator, ValueKind};

    fn version(parts: Vec<u32>) -> TypedValue {
        TypedValue::new(
            ValueKind::Version,
            "1.2",
            NormalizedValue::Version(parts),
            None,
            Operator::Ge,
            Comparability::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_page_bucket() {
        let ctx = ContextFrame::new();
        let key = Some("k");
        assert_eq!(fingerprint(key, "q", None, &ctx, 0, 5), fingerprint(key, "q", None, &ctx, 4, 5));
        assert_ne!(fingerprint(key, "q", None, &ctx, 4, 5), fingerprint(key, "q", None, &ctx, 5, 5));
    }

    #[test]
    fn test_linked_facts_ignore_quote_wording() {
        let ctx = ContextFrame::new();
        let value = version(vec![1, 2]);
        let a = fingerprint(Some("security.tls.min_version"), "TLS minimum version 1.2", Some(&value), &ctx, 1, 5);
        let b = fingerprint(Some("security.tls.min_version"), "at least TLS 1.2", Some(&value), &ctx, 2, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_version_padding_is_stable() {
        let ctx = ContextFrame::new();
        let a = fingerprint(Some("k"), "q", Some(&version(vec![1, 2])), &ctx, 1, 5);
        let b = fingerprint(Some("k"), "q", Some(&version(vec![1, 2, 0])), &ctx, 1, 5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_context_and_key_separate_facts() {
        let eu = ContextFrame::new().with_region("EU");
        let us = ContextFrame::new().with_region("US");
        assert_ne!(fingerprint(Some("k"), "q", None, &eu, 1, 5), fingerprint(Some("k"), "q", None, &us, 1, 5));
        assert_ne!(fingerprint(Some("a"), "q", None, &eu, 1, 5), fingerprint(Some("b"), "q", None, &eu, 1, 5));
    }

    #[test]
    fn test_unlinked_facts_use_the_quote() {
        let ctx = ContextFrame::new();
        let a = fingerprint(None, "Escrow is  available", None, &ctx, 1, 5);
        let b = fingerprint(None, "escrow is available", None, &ctx, 1, 5);
        let c = fingerprint(None, "Escrow is optional", None, &ctx, 1, 5);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
