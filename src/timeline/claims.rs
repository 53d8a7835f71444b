// Claim-level text heuristics.
//
// Beyond the interval math, the analyzer inspects what the resume *says*:
// extreme quantified claims ("increased revenue 800%"), implausible
// multipliers, superlative-heavy prose with no numbers behind it, and a
// stated years-of-experience figure that the timeline can't support.

use std::sync::LazyLock;

use regex_lite::Regex;

static PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,4})\s*(?:%|percent\b)").unwrap());
static MULTIPLIER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{1,3})\s*[xX]\b").unwrap());
static STATED_YEARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:over|more than|approximately|approx|~)?\s*(\d{1,2}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs)\b")
        .unwrap()
});
static YEARS_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}(?:\.\d+)?)\s*(?:-|–|to)\s*(\d{1,2}(?:\.\d+)?)\s*(?:years?|yrs)\b")
        .unwrap()
});
static TIMEFRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(weeks?|months?|years?|quarters?)\b").unwrap());

const SUPERLATIVES: &[&str] = &[
    "world-class",
    "world class",
    "unparalleled",
    "unmatched",
    "revolutionary",
    "groundbreaking",
    "state-of-the-art",
    "cutting-edge",
    "cutting edge",
];

const IMPROVEMENT_WORDS: &[&str] = &[
    "increased", "boosted", "improved", "reduced", "grew", "accelerated", "decreased",
];

/// Percentage claims at or above this are considered extreme.
const EXTREME_PERCENT: u32 = 300;
/// Multiplier claims at or above this are considered extreme.
const EXTREME_MULTIPLIER: u32 = 10;
/// Superlative density that reads as padding when no metrics back it up.
const SUPERLATIVE_LIMIT: usize = 5;

/// Scan resume text for metric anomalies. Returns human-readable reasons,
/// empty when the text looks plausible.
pub fn metric_anomalies(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lower = text.to_lowercase();
    let mut reasons = Vec::new();

    let mut percents: Vec<u32> = PERCENT
        .captures_iter(&lower)
        .filter_map(|c| c[1].parse().ok())
        .filter(|v| *v >= EXTREME_PERCENT)
        .collect();
    percents.sort_unstable();
    percents.dedup();
    if !percents.is_empty() {
        reasons.push(format!("extreme percentage claims: {percents:?}"));
    }

    let mut multipliers: Vec<u32> = MULTIPLIER
        .captures_iter(&lower)
        .filter_map(|c| c[1].parse().ok())
        .filter(|v| *v >= EXTREME_MULTIPLIER)
        .collect();
    multipliers.sort_unstable();
    multipliers.dedup();
    if !multipliers.is_empty() {
        reasons.push(format!("extreme multiplier claims: {multipliers:?}x"));
    }

    let superlative_count: usize = SUPERLATIVES.iter().map(|s| lower.matches(s).count()).sum();
    let has_any_metric = PERCENT.is_match(&lower) || MULTIPLIER.is_match(&lower);
    if superlative_count >= SUPERLATIVE_LIMIT && !has_any_metric {
        reasons.push("superlative-heavy text without metrics".to_string());
    }

    let claims_improvement = IMPROVEMENT_WORDS.iter().any(|w| lower.contains(w));
    if claims_improvement && !TIMEFRAME.is_match(&lower) {
        reasons.push("improvement claims without a timeframe".to_string());
    }

    reasons
}

/// Extract a stated years-of-experience figure from the text, if any.
/// A range like "3-5 years" resolves to its midpoint.
pub fn stated_years(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    if let Some(caps) = YEARS_RANGE.captures(text) {
        let low: f64 = caps[1].parse().ok()?;
        let high: f64 = caps[2].parse().ok()?;
        return Some((low + high) / 2.0);
    }
    let caps = STATED_YEARS.captures(text)?;
    caps[1].parse().ok()
}
