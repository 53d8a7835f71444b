// Consistency & Gap Analyzer.
//
// Inspects one candidate's timeline and claims for anomalies: uncovered
// gaps, overlapping roles, duplicated entries, implausibly old open-ended
// roles, and text claims the dates can't support. Total over arbitrary
// input — unparseable dates become flags and drop out of the interval
// arithmetic, nothing ever panics or errors.

pub mod claims;
pub mod dates;

use chrono::{Months, NaiveDate};

use crate::config::TimelinePolicy;
use crate::models::{CandidateProfile, Flag};

/// Average month length in days, for stated-vs-computed comparisons.
const DAYS_PER_MONTH: f64 = 30.44;

/// A timeline entry that survived date parsing.
#[derive(Debug, Clone)]
struct ParsedEntry {
    start: NaiveDate,
    /// None means the role is ongoing
    end: Option<NaiveDate>,
    label: String,
    normalized_label: String,
}

impl ParsedEntry {
    /// End date for interval math, with open roles running through `today`.
    fn effective_end(&self, today: NaiveDate) -> NaiveDate {
        self.end.unwrap_or(today).max(self.start)
    }
}

/// Analyze one candidate's timeline and claims, producing an ordered flag
/// list: parse problems first (in entry order), then duplicates, overlaps,
/// gaps, suspicious open roles, and claim heuristics.
pub fn analyze_timeline(
    profile: &CandidateProfile,
    policy: &TimelinePolicy,
    today: NaiveDate,
) -> Vec<Flag> {
    let mut flags = Vec::new();
    let mut parsed: Vec<ParsedEntry> = Vec::new();

    for entry in &profile.timeline {
        let start = match dates::parse_date(&entry.start) {
            Some(d) => d,
            None => {
                flags.push(Flag::UnparsedDate {
                    label: entry.label.clone(),
                    raw: entry.start.clone(),
                });
                continue;
            }
        };
        let end = match entry.end.as_deref() {
            None => None,
            Some(raw) if dates::is_open_marker(raw) => None,
            Some(raw) => match dates::parse_date(raw) {
                Some(d) => Some(d),
                None => {
                    flags.push(Flag::UnparsedDate {
                        label: entry.label.clone(),
                        raw: raw.to_string(),
                    });
                    continue;
                }
            },
        };

        if let Some(end_date) = end {
            if start > end_date {
                flags.push(Flag::InvertedDates {
                    label: entry.label.clone(),
                });
                continue;
            }
        }

        parsed.push(ParsedEntry {
            start,
            end,
            label: entry.label.clone(),
            normalized_label: normalize_label(&entry.label),
        });
    }

    // Sort by start ascending; ties put the longer entry first so the
    // shorter sub-entry reads as the anomaly in overlap reports.
    parsed.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.effective_end(today).cmp(&a.effective_end(today)))
            .then_with(|| a.normalized_label.cmp(&b.normalized_label))
    });

    let duplicate_pairs = detect_duplicates(&parsed, &mut flags);
    detect_overlaps(&parsed, &duplicate_pairs, policy, today, &mut flags);
    detect_gaps(&parsed, policy, today, &mut flags);
    detect_stale_open_roles(&parsed, policy, today, &mut flags);

    let anomalies = claims::metric_anomalies(&profile.text);
    if !anomalies.is_empty() {
        flags.push(Flag::ExaggeratedClaim { reasons: anomalies });
    }

    if let Some(stated) = claims::stated_years(&profile.text) {
        let computed = total_experience_years(&parsed, today);
        let tolerance_years = policy.experience_mismatch_months / 12.0;
        if !parsed.is_empty() && (stated - computed).abs() > tolerance_years {
            flags.push(Flag::ExperienceMismatch {
                stated_years: stated,
                computed_years: (computed * 100.0).round() / 100.0,
            });
        }
    }

    flags
}

/// Total experience in years over the merged (deduplicated, overlap-free)
/// intervals, so concurrent roles don't double count.
fn total_experience_years(entries: &[ParsedEntry], today: NaiveDate) -> f64 {
    let mut total_days = 0i64;
    let mut coverage_end: Option<NaiveDate> = None;

    for entry in entries {
        let end = entry.effective_end(today);
        match coverage_end {
            None => {
                total_days += (end - entry.start).num_days();
                coverage_end = Some(end);
            }
            Some(covered) => {
                if entry.start > covered {
                    total_days += (end - entry.start).num_days();
                    coverage_end = Some(end);
                } else if end > covered {
                    total_days += (end - covered).num_days();
                    coverage_end = Some(end);
                }
            }
        }
    }

    total_days as f64 / (DAYS_PER_MONTH * 12.0)
}

/// Identical normalized label plus exact date range — a stronger signal
/// than mere overlap, reported instead of it for that pair.
fn detect_duplicates(parsed: &[ParsedEntry], flags: &mut Vec<Flag>) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            let (a, b) = (&parsed[i], &parsed[j]);
            if a.normalized_label == b.normalized_label && a.start == b.start && a.end == b.end {
                pairs.push((i, j));
                flags.push(Flag::DuplicateEntry {
                    label: a.label.clone(),
                    start: a.start,
                    end: a.end,
                });
            }
        }
    }
    pairs
}

fn detect_overlaps(
    parsed: &[ParsedEntry],
    duplicate_pairs: &[(usize, usize)],
    policy: &TimelinePolicy,
    today: NaiveDate,
    flags: &mut Vec<Flag>,
) {
    for i in 0..parsed.len() {
        for j in (i + 1)..parsed.len() {
            if duplicate_pairs.contains(&(i, j)) {
                continue;
            }
            let (a, b) = (&parsed[i], &parsed[j]);
            let overlap_start = a.start.max(b.start);
            let overlap_end = a.effective_end(today).min(b.effective_end(today));
            let days = (overlap_end - overlap_start).num_days();
            if days > policy.overlap_tolerance_days {
                flags.push(Flag::OverlappingClaim {
                    first: a.label.clone(),
                    second: b.label.clone(),
                    days,
                });
            }
        }
    }
}

/// Walk the sorted entries tracking the furthest covered date; an uncovered
/// stretch beyond the threshold between coverage and the next start is a gap.
fn detect_gaps(
    parsed: &[ParsedEntry],
    policy: &TimelinePolicy,
    today: NaiveDate,
    flags: &mut Vec<Flag>,
) {
    let mut coverage_end: Option<NaiveDate> = None;

    for entry in parsed {
        if let Some(covered) = coverage_end {
            let uncovered = (entry.start - covered).num_days();
            if uncovered > policy.gap_threshold_days {
                flags.push(Flag::EmploymentGap {
                    from: covered,
                    to: entry.start,
                    days: uncovered,
                });
            }
        }
        let end = entry.effective_end(today);
        coverage_end = Some(coverage_end.map_or(end, |c| c.max(end)));
    }
}

fn detect_stale_open_roles(
    parsed: &[ParsedEntry],
    policy: &TimelinePolicy,
    today: NaiveDate,
    flags: &mut Vec<Flag>,
) {
    let months = u32::try_from(policy.open_role_max_years.max(0) * 12).unwrap_or(u32::MAX);
    let Some(threshold) = today.checked_sub_months(Months::new(months)) else {
        return;
    };

    for entry in parsed {
        if entry.end.is_none() && entry.start < threshold {
            flags.push(Flag::SuspiciousOpenRole {
                label: entry.label.clone(),
                started: entry.start,
            });
        }
    }
}

/// Lowercase, collapse whitespace, strip punctuation — enough to make
/// "Acme Corp." and "acme  corp" compare equal.
fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
