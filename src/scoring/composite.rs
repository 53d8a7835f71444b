// Composite score formula and ranking.
//
// Merges the three orthogonal signals (semantic similarity, requirement
// coverage, consistency penalty) into one clamped [0,1] score with a
// structured term-by-term breakdown. Candidates missing must-have skills
// are never hard-excluded — they rank lower through the coverage term and
// keep their flags visible.

use crate::models::{CandidateFeatures, ExplanationTerm, Flag, ScoredCandidate};

use super::weights::ScoringWeights;

/// Per-flag decrements, ordered by severity: duplicate > gap > overlap.
const PENALTY_DUPLICATE: f64 = 0.06;
const PENALTY_GAP: f64 = 0.04;
const PENALTY_EXAGGERATION: f64 = 0.04;
const PENALTY_STALE_OPEN_ROLE: f64 = 0.03;
const PENALTY_EXPERIENCE_MISMATCH: f64 = 0.03;
const PENALTY_OVERLAP: f64 = 0.02;
const PENALTY_UNPARSED: f64 = 0.01;

/// Cap on the total penalty, so coverage and similarity always dominate
/// the final score.
const PENALTY_CAP: f64 = 0.25;

/// Derive the consistency penalty from flag severities.
///
/// Missing-skill flags carry no penalty here — the coverage term already
/// prices them in, and double counting would make the breakdown lie.
pub fn consistency_penalty(flags: &[Flag]) -> f64 {
    let total: f64 = flags
        .iter()
        .map(|flag| match flag {
            Flag::DuplicateEntry { .. } => PENALTY_DUPLICATE,
            Flag::EmploymentGap { .. } => PENALTY_GAP,
            Flag::ExaggeratedClaim { .. } => PENALTY_EXAGGERATION,
            Flag::SuspiciousOpenRole { .. } => PENALTY_STALE_OPEN_ROLE,
            Flag::ExperienceMismatch { .. } => PENALTY_EXPERIENCE_MISMATCH,
            Flag::OverlappingClaim { .. } => PENALTY_OVERLAP,
            Flag::UnparsedDate { .. } | Flag::InvertedDates { .. } => PENALTY_UNPARSED,
            Flag::MissingRequiredSkill { .. } => 0.0,
        })
        .sum();
    total.min(PENALTY_CAP)
}

/// Compute the composite score for one candidate from its cached features.
///
/// Pure over (features, weights): rescoring with different weights reuses
/// the same feature values and is O(1) per candidate.
pub fn score(id: &str, features: &CandidateFeatures, weights: &ScoringWeights) -> ScoredCandidate {
    let semantic = sanitize(features.semantic);
    let must = sanitize(features.coverage.must_have_score);
    let nice = sanitize(features.coverage.nice_to_have_score);
    let penalty = consistency_penalty(&features.flags);

    let explanation = vec![
        term("semantic", weights.semantic, semantic),
        term("must_have", weights.must_have, must),
        term("nice_to_have", weights.nice_to_have, nice),
        term("consistency_penalty", -weights.consistency, penalty),
    ];

    let raw: f64 = explanation.iter().map(|t| t.contribution).sum();
    let final_score = raw.clamp(0.0, 1.0);

    ScoredCandidate {
        id: id.to_string(),
        semantic_score: semantic,
        coverage: features.coverage.clone(),
        consistency_penalty: penalty,
        final_score,
        flags: features.flags.clone(),
        explanation,
    }
}

/// Sort candidates into their final rank order: score descending, then
/// must-have coverage descending, then candidate id — stable and
/// reproducible across runs on identical input.
pub fn rank(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.final_score
            .total_cmp(&a.final_score)
            .then_with(|| b.coverage.must_have_score.total_cmp(&a.coverage.must_have_score))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn term(name: &str, weight: f64, value: f64) -> ExplanationTerm {
    ExplanationTerm {
        term: name.to_string(),
        weight,
        value,
        contribution: weight * value,
    }
}

/// Guard against NaN or out-of-range inputs leaking into the formula.
fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
