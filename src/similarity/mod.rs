// Similarity Engine — batch-scoped vector-space comparison.
//
// One tf-idf model is built per request over the corpus `[job description] +
// every resume in the batch`, so document statistics reflect exactly this
// batch. Scores are therefore comparable only within a batch; the vectorizer
// is a plain local value that is dropped with the request and must never be
// cached across unrelated jobs.

pub mod vectorizer;

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::CandidateProfile;
use vectorizer::BatchVectorizer;

/// Compute cosine similarity between the job description and each profile.
///
/// Returns a score in [0,1] per candidate id. Empty or all-stopword resume
/// text scores exactly 0.0 — never NaN.
pub fn compute_similarity(
    job_text: &str,
    profiles: &[CandidateProfile],
) -> BTreeMap<String, f64> {
    let mut docs = Vec::with_capacity(profiles.len() + 1);
    docs.push(job_text.to_string());
    docs.extend(profiles.iter().map(|p| p.text.clone()));

    let model = BatchVectorizer::fit(&docs);

    let mut scores = BTreeMap::new();
    for (i, profile) in profiles.iter().enumerate() {
        let score = model.cosine(0, i + 1);
        debug!(candidate = %profile.id, score, "semantic similarity");
        scores.insert(profile.id.clone(), score);
    }
    scores
}
