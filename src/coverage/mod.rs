// Qualification Matcher — must-have / nice-to-have coverage scoring.
//
// Matching is exact-term or synonym-normalized set membership against the
// candidate's extracted skills, falling back to a word-boundary search of
// the resume text. Deliberately no fuzzy similarity here: semantic
// closeness is the Similarity Engine's signal, and keeping the two
// orthogonal is what makes the composite score explainable.

pub mod synonyms;

use crate::models::{CandidateProfile, Coverage, Flag, JobRequirement};
use synonyms::canonical;

/// Score requirement coverage for one candidate.
///
/// `must_have_score` is matched/required, defined as 1.0 when the job lists
/// no must-have terms ("no hard constraint to fail"). `nice_to_have_score`
/// is analogous but contributes only positively; an empty nice list scores
/// 0.0 and costs the candidate nothing.
pub fn compute_coverage(job: &JobRequirement, profile: &CandidateProfile) -> Coverage {
    let text_lower = profile.text.to_lowercase();

    let mut matched_must_have = Vec::new();
    let mut missing_must_have = Vec::new();
    for term in &job.must_have {
        if term_present(term, profile, &text_lower) {
            matched_must_have.push(term.clone());
        } else {
            missing_must_have.push(term.clone());
        }
    }

    let mut matched_nice = Vec::new();
    for term in &job.nice_to_have {
        if term_present(term, profile, &text_lower) {
            matched_nice.push(term.clone());
        }
    }

    let must_have_score = if job.must_have.is_empty() {
        1.0
    } else {
        matched_must_have.len() as f64 / job.must_have.len() as f64
    };
    let nice_to_have_score = if job.nice_to_have.is_empty() {
        0.0
    } else {
        matched_nice.len() as f64 / job.nice_to_have.len() as f64
    };

    Coverage {
        must_have_score,
        nice_to_have_score,
        matched_must_have,
        missing_must_have,
        matched_nice,
    }
}

/// Every missing must-have term as its own flag, preserving explainability —
/// a number alone can't tell the reviewer *which* requirement failed.
pub fn missing_skill_flags(coverage: &Coverage) -> Vec<Flag> {
    coverage
        .missing_must_have
        .iter()
        .map(|term| Flag::MissingRequiredSkill { term: term.clone() })
        .collect()
}

/// A requirement term is present when its canonical form matches a
/// canonicalized extracted skill, or appears word-bounded in the resume text.
fn term_present(term: &str, profile: &CandidateProfile, text_lower: &str) -> bool {
    let canon = canonical(term);
    if profile.skills.contains(&canon) {
        return true;
    }
    // The canonical form and the raw form may differ ("k8s" vs "kubernetes");
    // the text can contain either spelling.
    contains_bounded(text_lower, &canon) || contains_bounded(text_lower, &term.to_lowercase())
}

/// Substring search requiring non-alphanumeric (or edge) characters on both
/// sides, so "go" doesn't match inside "mongodb".
fn contains_bounded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(needle) {
        let start = from + pos;
        let end = start + needle.len();
        let left_ok = start == 0
            || !haystack[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        // Advance by one whole character so the next slice stays on a
        // UTF-8 boundary.
        let step = haystack[start..]
            .chars()
            .next()
            .map(|c| c.len_utf8())
            .unwrap_or(1);
        from = start + step;
        if from >= haystack.len() {
            break;
        }
    }
    false
}
