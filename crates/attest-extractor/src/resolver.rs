//! Pattern-based claim key resolution

use crate::patterns::{default_registry, Matcher, PatternEntry};
use crate::ExtractorError;
use attest_domain::{ClaimKeyDraft, ContextFrame};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use tracing::debug;

const CONTEXT_PLACEHOLDERS: &[&str] = &["product", "edition", "region", "version", "deployment"];

enum CompiledMatcher {
    Regex(Regex),
    Keywords(Vec<String>),
}

impl CompiledMatcher {
    fn compile(matcher: &Matcher) -> Result<Self, ExtractorError> {
        match matcher {
            Matcher::Regex { pattern } => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(CompiledMatcher::Regex)
                .map_err(|e| ExtractorError::Pattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                }),
            Matcher::Keywords { all } => {
                if all.is_empty() || all.iter().any(|k| k.trim().is_empty()) {
                    return Err(ExtractorError::Config(
                        "keyword matchers need at least one non-empty keyword".to_string(),
                    ));
                }
                Ok(CompiledMatcher::Keywords(
                    all.iter().map(|k| k.trim().to_lowercase()).collect(),
                ))
            }
        }
    }

    /// Capture values on a match, `None` when the text does not match
    fn captures(&self, text: &str) -> Option<HashMap<String, String>> {
        match self {
            CompiledMatcher::Regex(re) => {
                let caps = re.captures(text)?;
                let mut values = HashMap::new();
                for (i, name) in re.capture_names().enumerate().skip(1) {
                    if let Some(m) = caps.get(i) {
                        values.insert(i.to_string(), m.as_str().to_string());
                        if let Some(name) = name {
                            values.insert(name.to_string(), m.as_str().to_string());
                        }
                    }
                }
                Some(values)
            }
            CompiledMatcher::Keywords(keywords) => {
                let lower = text.to_lowercase();
                keywords
                    .iter()
                    .all(|k| starts_word(&lower, k))
                    .then(HashMap::new)
            }
        }
    }

    fn can_fill(&self, name: &str) -> bool {
        match self {
            CompiledMatcher::Regex(re) => {
                re.capture_names().flatten().any(|n| n == name)
                    || name
                        .parse::<usize>()
                        .map(|i| i > 0 && i < re.captures_len())
                        .unwrap_or(false)
            }
            CompiledMatcher::Keywords(_) => false,
        }
    }
}

fn starts_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, _)| {
        haystack[..i]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// A resolved claim key
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Draft to create or look up the key
    pub draft: ClaimKeyDraft,
    /// Index of the registry entry that matched
    pub pattern_index: usize,
}

impl Resolution {
    /// Resolved machine key
    pub fn machine_key(&self) -> &str {
        &self.draft.machine_key
    }
}

/// Ordered registry evaluation: the first entry that matches and whose
/// placeholders all resolve wins
///
/// # Examples
///
/// ```
/// use attest_extractor::KeyResolver;
/// use attest_domain::ContextFrame;
///
/// let resolver = KeyResolver::with_defaults().unwrap();
/// let resolution = resolver
///     .resolve("TLS 1.3 is used", &ContextFrame::new(), None)
///     .unwrap();
/// assert_eq!(resolution.machine_key(), "security.tls.min_version");
/// assert!(resolver.resolve("the sky is blue", &ContextFrame::new(), None).is_none());
/// ```
pub struct KeyResolver {
    entries: Vec<(PatternEntry, CompiledMatcher)>,
}

impl KeyResolver {
    /// Compile a registry
    ///
    /// Fails when a matcher does not compile or a template names a
    /// placeholder that nothing could ever fill.
    pub fn new(registry: Vec<PatternEntry>) -> Result<Self, ExtractorError> {
        let mut entries = Vec::with_capacity(registry.len());
        for entry in registry {
            if entry.key.trim().is_empty() {
                return Err(ExtractorError::Config("pattern key cannot be empty".to_string()));
            }
            let compiled = CompiledMatcher::compile(&entry.matcher)?;
            for name in placeholders(&entry.key).chain(placeholders(&entry.question)) {
                let known = name == "theme" || CONTEXT_PLACEHOLDERS.contains(&name) || compiled.can_fill(name);
                if !known {
                    return Err(ExtractorError::Config(format!(
                        "pattern '{}' uses unknown placeholder {{{}}}",
                        entry.key, name
                    )));
                }
            }
            entries.push((entry, compiled));
        }
        Ok(Self { entries })
    }

    /// Compile the built-in registry
    pub fn with_defaults() -> Result<Self, ExtractorError> {
        Self::new(default_registry())
    }

    /// Number of registry entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve text to a claim key
    ///
    /// The context frame and section theme are only used to fill
    /// placeholders; they never decide whether an entry matches.
    pub fn resolve(&self, text: &str, context: &ContextFrame, theme: Option<&str>) -> Option<Resolution> {
        for (index, (entry, matcher)) in self.entries.iter().enumerate() {
            let Some(captures) = matcher.captures(text) else {
                continue;
            };

            let lookup = |name: &str| -> Option<String> {
                let value = match name {
                    "theme" => theme.map(str::to_string),
                    n if CONTEXT_PLACEHOLDERS.contains(&n) => context.field(n),
                    n => captures.get(n).cloned(),
                };
                value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
            };

            let key = fill(&entry.key, |name| lookup(name).map(|v| slugify(&v)).filter(|s| !s.is_empty()));
            let question = fill(&entry.question, |name| lookup(name).map(|v| v.to_lowercase()));

            match (key, question) {
                (Some(machine_key), Some(question)) => {
                    debug!("Resolved '{}' to {} (pattern {})", text, machine_key, index);
                    return Some(Resolution {
                        draft: ClaimKeyDraft {
                            machine_key,
                            question,
                            domain: entry.domain.clone(),
                            expected_kind: entry.expected_kind,
                        },
                        pattern_index: index,
                    });
                }
                _ => {
                    debug!("Pattern {} ({}) matched '{}' but a placeholder is unresolved", index, entry.key, text);
                }
            }
        }

        debug!("No claim key pattern for '{}'", text);
        None
    }
}

/// Placeholder names of a template, in order
fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    template.split('{').skip(1).filter_map(|part| part.split_once('}').map(|(name, _)| name))
}

/// Substitute every `{name}`; `None` when any placeholder has no value
fn fill(template: &str, mut value: impl FnMut(&str) -> Option<String>) -> Option<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}')?;
        out.push_str(&value(&after[..close])?);
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Lowercase, non-alphanumeric runs collapsed to `_`
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    for c in value.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}
