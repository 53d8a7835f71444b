// Sensitive-attribute redaction.
//
// Group signals the auditor cares about (pronoun clusters, age statements,
// marital status, religion, ethnicity) plus direct contact details are
// stripped from both the job description and each resume before any scoring
// component sees the text. The structured `sensitive` map on the candidate
// record is the only place group information survives, and only the fairness
// auditor reads it.

use std::sync::LazyLock;

use regex_lite::Regex;

pub const REDACTION_TOKEN: &str = "[REDACTED]";

static PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "gender",
            Regex::new(r"(?i)\b(he|she|him|her|his|hers|mr\.|mrs\.|ms\.)\b").unwrap(),
        ),
        (
            "age",
            Regex::new(r"(?i)\b\d{2}\s*years?\s*old\b|\bage\s*\d{2}\b").unwrap(),
        ),
        (
            "marital",
            Regex::new(r"(?i)\b(single|married|divorced|widowed)\b").unwrap(),
        ),
        (
            "religion",
            Regex::new(r"(?i)\b(hindu|muslim|christian|sikh|buddhist|jain|jewish)\b").unwrap(),
        ),
        (
            "ethnicity",
            Regex::new(r"(?i)\b(black|white|asian|hispanic|latino|caucasian)\b").unwrap(),
        ),
        (
            "email",
            Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap(),
        ),
        ("phone", Regex::new(r"\+?\d[\d\s().-]{8,}\d").unwrap()),
    ]
});

/// Replace sensitive surface patterns with a redaction token.
///
/// Returns the redacted text and the names of the pattern families that
/// matched, for transparency in logs and reports.
pub fn redact_sensitive(text: &str) -> (String, Vec<&'static str>) {
    if text.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut out = text.to_string();
    let mut notes = Vec::new();

    for (name, pattern) in PATTERNS.iter() {
        if pattern.is_match(&out) {
            out = pattern.replace_all(&out, REDACTION_TOKEN).into_owned();
            notes.push(*name);
        }
    }

    (out, notes)
}
