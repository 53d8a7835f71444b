// The scoring pipeline for one request.
//
// Steps:
// 1. Validate the job and batch — unusable requests are rejected before
//    any scoring begins.
// 2. Split records into scoring profiles and the auditor-only sensitive
//    table; redact and truncate text; exclude unusable candidates with a
//    reason instead of dropping them.
// 3. Run the analysis branches in parallel under the request budget: the
//    batch-level similarity model on a blocking worker, per-candidate
//    coverage + timeline analysis fanned out over a bounded stream. Each
//    branch writes its own slot, so a timeout keeps whatever finished.
// 4. Join at the composite scorer, rank, and audit.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::config::{Config, FairnessPolicy};
use crate::coverage::{self, synonyms};
use crate::error::EngineError;
use crate::fairness;
use crate::models::{
    CandidateFeatures, CandidateProfile, CandidateRecord, Coverage, ExcludedCandidate,
    ExclusionReason, Flag, JobRequirement, ScoredCandidate, ScoringOutcome,
};
use crate::redact;
use crate::scoring::{self, ScoringWeights, WeightOverrides};
use crate::similarity;
use crate::timeline;

/// Score a batch against a job, with "now" taken from the system clock.
pub async fn score_batch(
    job: &JobRequirement,
    records: &[CandidateRecord],
    config: &Config,
    weights: &ScoringWeights,
) -> Result<ScoringOutcome, EngineError> {
    score_batch_at(job, records, config, weights, chrono::Utc::now().date_naive()).await
}

/// Score a batch with an explicit "today", so timeline verdicts are
/// reproducible in tests and replays.
pub async fn score_batch_at(
    job: &JobRequirement,
    records: &[CandidateRecord],
    config: &Config,
    weights: &ScoringWeights,
    today: NaiveDate,
) -> Result<ScoringOutcome, EngineError> {
    let job = sanitize_job(job)?;
    if records.is_empty() {
        return Err(EngineError::input("candidate batch is empty"));
    }
    if records.len() > config.limits.max_batch {
        return Err(EngineError::input(format!(
            "batch of {} exceeds the configured maximum of {}",
            records.len(),
            config.limits.max_batch
        )));
    }

    // Later uploads with the same id replace earlier ones, keeping the
    // original position in the batch.
    let mut deduped: Vec<&CandidateRecord> = Vec::with_capacity(records.len());
    let mut positions: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        match positions.get(record.id.as_str()) {
            Some(&at) => deduped[at] = record,
            None => {
                positions.insert(record.id.as_str(), deduped.len());
                deduped.push(record);
            }
        }
    }

    let mut excluded: Vec<ExcludedCandidate> = Vec::new();
    let mut profiles: Vec<CandidateProfile> = Vec::new();
    let mut sensitive: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();

    for record in deduped {
        let (redacted, notes) = redact::redact_sensitive(&record.text);
        if !notes.is_empty() {
            info!(candidate = %record.id, patterns = ?notes, "redacted sensitive text");
        }
        let text = truncate_text(&redacted, config.limits.max_text_len);

        let usable =
            !text.trim().is_empty() || !record.skills.is_empty() || !record.timeline.is_empty();
        if !usable {
            warn!(candidate = %record.id, "no usable content, excluding from ranking");
            excluded.push(ExcludedCandidate {
                id: record.id.clone(),
                reason: ExclusionReason::NoUsableText,
            });
            continue;
        }

        // The sensitive map is quarantined here: the profile the engines
        // see does not carry it, only the auditor table does.
        if !record.sensitive.is_empty() {
            sensitive.insert(record.id.clone(), record.sensitive.clone());
        }
        profiles.push(CandidateProfile {
            id: record.id.clone(),
            text,
            skills: record.skills.iter().map(|s| synonyms::canonical(s)).collect(),
            timeline: record.timeline.clone(),
        });
    }

    info!(
        candidates = profiles.len(),
        excluded = excluded.len(),
        must_have = job.must_have.len(),
        "scoring batch"
    );

    // Branch slots — filled incrementally so an expired budget still
    // leaves the finished candidates usable.
    let mut analysis: BTreeMap<String, (Coverage, Vec<Flag>)> = BTreeMap::new();
    let mut semantic: Option<BTreeMap<String, f64>> = None;

    let budget = Duration::from_millis(config.limits.timeout_ms.max(1));
    let timed_out = {
        let work = async {
            let similarity_task = tokio::task::spawn_blocking({
                let job_text = job.description.clone();
                let profiles = profiles.clone();
                move || similarity::compute_similarity(&job_text, &profiles)
            });

            let per_candidate = stream::iter(profiles.iter().map(|profile| {
                let job = &job;
                let policy = &config.timeline;
                async move {
                    let coverage = coverage::compute_coverage(job, profile);
                    let flags = timeline::analyze_timeline(profile, policy, today);
                    (profile.id.clone(), coverage, flags)
                }
            }))
            .buffer_unordered(config.limits.concurrency.max(1));
            futures::pin_mut!(per_candidate);

            let fill = async {
                while let Some((id, coverage, flags)) = per_candidate.next().await {
                    analysis.insert(id, (coverage, flags));
                }
            };

            let (similarity_result, ()) = tokio::join!(similarity_task, fill);
            semantic = Some(match similarity_result {
                Ok(scores) => scores,
                Err(error) => {
                    warn!(%error, "similarity branch failed");
                    BTreeMap::new()
                }
            });
        };
        tokio::time::timeout(budget, work).await.is_err()
    };

    if timed_out {
        warn!(
            finished = analysis.len(),
            total = profiles.len(),
            "request budget expired, returning partial results"
        );
    }

    // Join: a candidate is scoreable once the batch similarity model and
    // its own analysis slot both completed.
    let mut features: BTreeMap<String, CandidateFeatures> = BTreeMap::new();
    for profile in &profiles {
        let joined = semantic
            .as_ref()
            .and_then(|scores| analysis.get(&profile.id).map(|slot| (scores, slot)));
        match joined {
            Some((scores, (coverage, timeline_flags))) => {
                let mut flags = coverage::missing_skill_flags(coverage);
                flags.extend(timeline_flags.iter().cloned());
                features.insert(
                    profile.id.clone(),
                    CandidateFeatures {
                        semantic: scores.get(&profile.id).copied().unwrap_or(0.0),
                        coverage: coverage.clone(),
                        flags,
                    },
                );
            }
            None => excluded.push(ExcludedCandidate {
                id: profile.id.clone(),
                reason: ExclusionReason::ScoringTimeout,
            }),
        }
    }

    let mut ranked: Vec<ScoredCandidate> = features
        .iter()
        .map(|(id, f)| scoring::score(id, f, weights))
        .collect();
    scoring::rank(&mut ranked);

    let fairness = fairness::audit(&ranked, &sensitive, &config.fairness);

    info!(
        ranked = ranked.len(),
        excluded = excluded.len(),
        timed_out,
        top_k = fairness.top_k,
        "batch scored"
    );

    Ok(ScoringOutcome {
        ranked,
        excluded,
        fairness,
        timed_out,
        features,
        sensitive,
    })
}

impl ScoringOutcome {
    /// Recompute ranking and audit under a weight override — the what-if
    /// query. Works purely from the cached per-candidate features, so the
    /// cost is O(batch size) and the corpus vectorizer is never touched.
    /// Invalid overrides are rejected with the offending field named and
    /// this outcome stays as it was.
    pub fn what_if(
        &self,
        base: &ScoringWeights,
        overrides: &WeightOverrides,
        policy: &FairnessPolicy,
    ) -> Result<ScoringOutcome, EngineError> {
        let weights = base.with_overrides(overrides)?;
        Ok(self.rescore(&weights, policy))
    }

    /// Re-rank from cached features under already-validated weights.
    pub fn rescore(&self, weights: &ScoringWeights, policy: &FairnessPolicy) -> ScoringOutcome {
        let mut ranked: Vec<ScoredCandidate> = self
            .features
            .iter()
            .map(|(id, f)| scoring::score(id, f, weights))
            .collect();
        scoring::rank(&mut ranked);

        let fairness = fairness::audit(&ranked, &self.sensitive, policy);

        ScoringOutcome {
            ranked,
            excluded: self.excluded.clone(),
            fairness,
            timed_out: self.timed_out,
            features: self.features.clone(),
            sensitive: self.sensitive.clone(),
        }
    }
}

/// Validate the job and normalize its requirement lists: terms are trimmed,
/// lowercased, and deduplicated preserving order; the description is
/// redacted like any resume.
fn sanitize_job(job: &JobRequirement) -> Result<JobRequirement, EngineError> {
    if job.description.trim().is_empty() {
        return Err(EngineError::input("job description is empty"));
    }
    let (description, _) = redact::redact_sensitive(&job.description);
    Ok(JobRequirement {
        description,
        must_have: normalize_terms(&job.must_have),
        nice_to_have: normalize_terms(&job.nice_to_have),
    })
}

fn normalize_terms(terms: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(terms.len());
    for term in terms {
        let normalized = term.trim().to_lowercase();
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
