// Request-scoped tf-idf vectorizer.
//
// Each document in the batch is tokenized (lowercase, alphanumeric runs
// keeping `+`, `#` and interior `.` so terms like "c++", "c#" and "node.js"
// survive), stop words are removed, and tokens get a minimal plural stem.
// Term weights are tf * smoothed idf, L2-normalized per document, which
// makes cosine similarity a dot product bounded in [0,1] for these
// non-negative vectors.

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::sync::LazyLock;

use stop_words::{get, LANGUAGE};

static STOP_WORDS: LazyLock<HashSet<String>> =
    LazyLock::new(|| get(LANGUAGE::English).into_iter().collect());

/// One batch's vector-space model. Holds the vocabulary, per-term document
/// frequencies, and an L2-normalized sparse vector per document.
pub struct BatchVectorizer {
    /// term -> vocabulary index, ordered for determinism
    vocab: BTreeMap<String, usize>,
    /// normalized sparse tf-idf vectors, one per input document
    docs: Vec<Vec<(usize, f64)>>,
}

impl BatchVectorizer {
    /// Build the model over all documents at once. Document 0 is by
    /// convention the job description; the rest are resumes.
    pub fn fit(documents: &[String]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d)).collect();

        // Vocabulary and document frequencies
        let mut vocab: BTreeMap<String, usize> = BTreeMap::new();
        let mut df: BTreeMap<String, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let mut seen: HashSet<&str> = HashSet::new();
            for token in tokens {
                if seen.insert(token) {
                    *df.entry(token.clone()).or_insert(0) += 1;
                }
            }
        }
        for term in df.keys() {
            let next = vocab.len();
            vocab.insert(term.clone(), next);
        }

        // Smoothed idf, as if one extra document contained every term —
        // keeps weights strictly positive and finite for any batch.
        let n = documents.len() as f64;
        let mut idf = vec![0.0; vocab.len()];
        for (term, &index) in &vocab {
            let freq = df[term] as f64;
            idf[index] = ((1.0 + n) / (1.0 + freq)).ln() + 1.0;
        }

        // Per-document normalized tf-idf vectors
        let docs = tokenized
            .iter()
            .map(|tokens| {
                let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
                for token in tokens {
                    if let Some(&index) = vocab.get(token) {
                        *counts.entry(index).or_insert(0.0) += 1.0;
                    }
                }
                let mut vector: Vec<(usize, f64)> = counts
                    .into_iter()
                    .map(|(index, tf)| (index, tf * idf[index]))
                    .collect();
                let norm: f64 = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in &mut vector {
                        *w /= norm;
                    }
                }
                vector
            })
            .collect();

        Self { vocab, docs }
    }

    /// Cosine similarity between two documents of the batch.
    ///
    /// Both vectors are already L2-normalized, so this is a sparse dot
    /// product. An empty document (no surviving tokens) yields 0.0.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let (va, vb) = (&self.docs[a], &self.docs[b]);
        if va.is_empty() || vb.is_empty() {
            return 0.0;
        }

        let mut dot = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < va.len() && j < vb.len() {
            match va[i].0.cmp(&vb[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += va[i].1 * vb[j].1;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }

    /// Number of distinct terms in the batch vocabulary.
    pub fn vocab_len(&self) -> usize {
        self.vocab.len()
    }
}

/// Split text into normalized tokens: lowercase, keep alphanumerics plus
/// `+`/`#`/interior `.`, drop stop words and single characters, apply a
/// minimal plural stem.
fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in lower.chars() {
        if ch.is_alphanumeric() || ch == '+' || ch == '#' || ch == '.' {
            current.push(ch);
        } else if !current.is_empty() {
            push_token(&mut tokens, &current);
            current.clear();
        }
    }
    if !current.is_empty() {
        push_token(&mut tokens, &current);
    }

    tokens
}

fn push_token(tokens: &mut Vec<String>, raw: &str) {
    let trimmed = raw.trim_matches('.');
    if trimmed.chars().count() < 2 {
        return;
    }
    if STOP_WORDS.contains(trimmed) {
        return;
    }
    // The redaction marker appears in every document that had sensitive
    // text; treating it as a term would manufacture similarity edges.
    if trimmed.eq_ignore_ascii_case("redacted") {
        return;
    }
    tokens.push(stem(trimmed));
}

/// Minimal stemming: strip a trailing plural `s` from longer tokens,
/// leaving endings like "ss"/"us"/"is" (class, nexus, analysis) alone.
fn stem(token: &str) -> String {
    if token.len() > 3
        && token.ends_with('s')
        && !token.ends_with("ss")
        && !token.ends_with("us")
        && !token.ends_with("is")
    {
        token[..token.len() - 1].to_string()
    } else {
        token.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_tech_terms() {
        let tokens = tokenize("C++ and C# developer using Node.js.");
        assert!(tokens.contains(&"c++".to_string()));
        assert!(tokens.contains(&"c#".to_string()));
        assert!(tokens.contains(&"node.js".to_string()));
        assert!(tokens.contains(&"developer".to_string()));
        // "and" is a stop word
        assert!(!tokens.contains(&"and".to_string()));
    }

    #[test]
    fn test_stem_plurals_only() {
        assert_eq!(stem("skills"), "skill");
        assert_eq!(stem("pipelines"), "pipeline");
        assert_eq!(stem("class"), "class");
        assert_eq!(stem("analysis"), "analysis");
        assert_eq!(stem("nexus"), "nexus");
        assert_eq!(stem("aws"), "aws");
    }

    #[test]
    fn test_identical_documents_cosine_one() {
        let docs = vec![
            "rust engineer building distributed systems".to_string(),
            "rust engineer building distributed systems".to_string(),
        ];
        let model = BatchVectorizer::fit(&docs);
        let sim = model.cosine(0, 1);
        assert!((sim - 1.0).abs() < 1e-9, "identical docs should score 1.0, got {sim}");
    }

    #[test]
    fn test_disjoint_documents_cosine_zero() {
        let docs = vec![
            "rust kubernetes terraform".to_string(),
            "sourdough lamination croissant".to_string(),
        ];
        let model = BatchVectorizer::fit(&docs);
        assert_eq!(model.cosine(0, 1), 0.0);
    }

    #[test]
    fn test_empty_document_cosine_zero() {
        let docs = vec!["rust engineer".to_string(), String::new()];
        let model = BatchVectorizer::fit(&docs);
        let sim = model.cosine(0, 1);
        assert_eq!(sim, 0.0);
        assert!(!sim.is_nan());
    }

    #[test]
    fn test_vocab_is_shared_across_batch() {
        let docs = vec![
            "alpha beta".to_string(),
            "beta gamma".to_string(),
            "gamma delta".to_string(),
        ];
        let model = BatchVectorizer::fit(&docs);
        assert_eq!(model.vocab_len(), 4);
    }
}
