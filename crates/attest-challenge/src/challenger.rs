//! Challenge orchestration: one verdict per claim of a free text

use crate::gap::GapQualifier;
use crate::types::{ChallengeResponse, ChallengeStatus, ChallengeSummary, ClaimMatch};
use crate::{ChallengeConfig, ChallengeError};
use attest_domain::{
    compare_values, ContextFrame, Fact, FactQuery, FactStore, GapReason, TensionLevel, TypedValue, ValueComparison,
};
use attest_extractor::{ClaimSegmenter, KeyResolver, PatternEntry, Resolution, ValueNormalizer};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Facts found for one resolved claim
struct Lookup {
    facts: Vec<Fact>,
    gap: Option<GapReason>,
}

/// A claim waiting for its corpus lookup
struct PendingClaim {
    claim: String,
    resolution: Option<Resolution>,
    value: Option<TypedValue>,
    lookup: Option<JoinHandle<Result<Lookup, ChallengeError>>>,
}

/// Checks free text against the corpus
///
/// The text is segmented into claims; each claim is resolved to a claim key,
/// its value extracted, and compared with the linked facts of that key.
/// Lookups run on blocking tasks and are awaited in claim order, so the
/// response lists exactly one match per claim in input order.
pub struct Challenger<S> {
    store: Arc<Mutex<S>>,
    segmenter: ClaimSegmenter,
    resolver: KeyResolver,
    normalizer: ValueNormalizer,
    gaps: Arc<GapQualifier>,
    config: ChallengeConfig,
}

impl<S> Challenger<S>
where
    S: FactStore + Send + 'static,
    S::Error: Display,
{
    /// Create a challenger over a shared store
    pub fn new(
        store: Arc<Mutex<S>>,
        patterns: Vec<PatternEntry>,
        config: ChallengeConfig,
    ) -> Result<Self, ChallengeError> {
        config.validate().map_err(ChallengeError::Config)?;

        Ok(Self {
            store,
            segmenter: ClaimSegmenter::new(config.min_claim_length)?,
            resolver: KeyResolver::new(patterns)?,
            normalizer: ValueNormalizer::new()?,
            gaps: Arc::new(GapQualifier::new(&config)?),
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ChallengeConfig {
        &self.config
    }

    /// Challenge every claim in `text`
    ///
    /// With `include_missing`, claims whose key has no facts carry a
    /// qualified gap; a gap that cannot be backed by corpus evidence is an
    /// error, never an empty result.
    pub async fn challenge(
        &self,
        text: &str,
        context: Option<ContextFrame>,
        include_missing: bool,
    ) -> Result<ChallengeResponse, ChallengeError> {
        let claims = self.segmenter.segment(text);
        info!("Challenging {} claims", claims.len());

        let frame = context.clone().unwrap_or_default();
        let mut pending = Vec::with_capacity(claims.len());

        for claim in &claims {
            let resolution = self.resolver.resolve(claim, &frame, None);
            let value = match resolution.as_ref().and_then(|r| r.draft.expected_kind) {
                Some(kind) => self.normalizer.normalize_as(claim, kind)?,
                None => self.normalizer.normalize(claim)?,
            };

            let lookup = resolution.as_ref().map(|r| {
                let store = Arc::clone(&self.store);
                let gaps = Arc::clone(&self.gaps);
                let key = r.machine_key().to_string();
                let context = context.clone();
                tokio::task::spawn_blocking(move || lookup(&store, &gaps, &key, context, include_missing))
            });

            pending.push(PendingClaim {
                claim: claim.clone(),
                resolution,
                value,
                lookup,
            });
        }

        let mut matches = Vec::with_capacity(pending.len());
        for claim in pending {
            let lookup = match claim.lookup {
                Some(handle) => Some(
                    handle
                        .await
                        .map_err(|e| ChallengeError::Task(format!("Task join error: {}", e)))??,
                ),
                None => None,
            };
            let matched = judge(
                claim.claim,
                claim.resolution.as_ref(),
                claim.value.as_ref(),
                lookup,
                self.config.max_excerpts,
            );
            debug!("Claim '{}': {}", matched.claim, matched.status.as_str());
            matches.push(matched);
        }

        let summary = ChallengeSummary::from_matches(&matches, self.config.unmapped_alert_threshold);
        if summary.high_unmapped_rate {
            warn!(
                "High unmapped rate: {}/{} claims match no pattern",
                summary.unmapped, summary.total
            );
        }
        info!(
            "Challenge complete: {} confirmed, {} contradicted, {} partial, {} missing, {} unmapped",
            summary.confirmed, summary.contradicted, summary.partial, summary.missing, summary.unmapped
        );

        Ok(ChallengeResponse {
            claims,
            matches,
            summary,
        })
    }
}

fn lookup<S>(
    store: &Mutex<S>,
    gaps: &GapQualifier,
    machine_key: &str,
    context: Option<ContextFrame>,
    include_missing: bool,
) -> Result<Lookup, ChallengeError>
where
    S: FactStore,
    S::Error: Display,
{
    let store = store
        .lock()
        .map_err(|e| ChallengeError::Store(format!("Store lock error: {}", e)))?;

    let facts = store
        .query_facts(&FactQuery::for_key(machine_key).in_context(context.clone()))
        .map_err(|e| ChallengeError::Store(e.to_string()))?;

    let gap = if facts.is_empty() && include_missing {
        Some(gaps.qualify(&*store, machine_key, context.as_ref())?)
    } else {
        None
    };

    Ok(Lookup { facts, gap })
}

/// Verdict for one claim
///
/// Hard tension against any corpus value contradicts; otherwise any
/// successful comparison confirms (soft counts as confirmed). Facts that
/// cannot be compared give a partial verdict.
fn judge(
    claim: String,
    resolution: Option<&Resolution>,
    value: Option<&TypedValue>,
    lookup: Option<Lookup>,
    max_excerpts: usize,
) -> ClaimMatch {
    let mut matched = ClaimMatch {
        claim,
        claim_key: resolution.map(|r| r.machine_key().to_string()),
        value: value.map(|v| v.to_string()),
        excerpts: Vec::new(),
        status: ChallengeStatus::Unmapped,
        tension: None,
        explanation: "No claim key pattern matches this claim".to_string(),
        gap: None,
    };

    let (Some(resolution), Some(lookup)) = (resolution, lookup) else {
        return matched;
    };
    let key = resolution.machine_key();

    if lookup.facts.is_empty() {
        matched.status = ChallengeStatus::Missing;
        matched.explanation = match &lookup.gap {
            Some(gap) => gap.description().to_string(),
            None => format!("No corpus facts for {}", key),
        };
        matched.gap = lookup.gap;
        return matched;
    }

    let excerpts = |facts: &[&Fact]| -> Vec<String> { facts.iter().take(max_excerpts).map(|f| f.excerpt()).collect() };

    let Some(value) = value else {
        let all: Vec<&Fact> = lookup.facts.iter().collect();
        matched.status = ChallengeStatus::Partial;
        matched.excerpts = excerpts(&all);
        matched.explanation = format!(
            "Corpus has {} fact(s) for {} but the claim states no comparable value",
            lookup.facts.len(),
            key
        );
        return matched;
    };

    let comparisons: Vec<(&Fact, ValueComparison)> = lookup
        .facts
        .iter()
        .filter_map(|f| f.value.as_ref().map(|v| (f, compare_values(v, value))))
        .collect();

    let compared: Vec<(&Fact, TensionLevel, &str)> = comparisons
        .iter()
        .filter_map(|(f, c)| c.level().map(|level| (*f, level, c.explanation())))
        .collect();

    let hard: Vec<&(&Fact, TensionLevel, &str)> = compared.iter().filter(|c| c.1 == TensionLevel::Hard).collect();
    if let Some((_, _, explanation)) = hard.first() {
        let facts: Vec<&Fact> = hard.iter().map(|c| c.0).collect();
        matched.status = ChallengeStatus::Contradicted;
        matched.tension = Some(TensionLevel::Hard);
        matched.excerpts = excerpts(&facts);
        matched.explanation = explanation.to_string();
        return matched;
    }

    if !compared.is_empty() {
        let soft = compared.iter().find(|c| c.1 == TensionLevel::Soft);
        let (_, level, explanation) = soft.unwrap_or(&compared[0]);
        let facts: Vec<&Fact> = compared.iter().map(|c| c.0).collect();
        matched.status = ChallengeStatus::Confirmed;
        matched.tension = Some(*level);
        matched.excerpts = excerpts(&facts);
        matched.explanation = explanation.to_string();
        return matched;
    }

    let all: Vec<&Fact> = lookup.facts.iter().collect();
    matched.status = ChallengeStatus::Partial;
    matched.excerpts = excerpts(&all);
    matched.explanation = match comparisons.first() {
        Some((_, comparison)) => format!("Not comparable with the corpus: {}", comparison.explanation()),
        None => format!("Corpus facts for {} carry no value", key),
    };
    matched
}
