// Data models — the types that flow through the scoring pipeline.
//
// Everything here is request-scoped: one JobRequirement plus one batch of
// candidate records go in, one ScoringOutcome comes out, and nothing is kept
// afterwards. The types are separate from the engines so the output and CLI
// layers can use them without depending on the pipeline internals.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The job side of a scoring request. Immutable once scoring starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequirement {
    /// Full job description text
    pub description: String,
    /// Hard requirements — every missing term is surfaced as a flag
    #[serde(default)]
    pub must_have: Vec<String>,
    /// Soft requirements — contribute positively, never penalize
    #[serde(default)]
    pub nice_to_have: Vec<String>,
}

/// One candidate as delivered by the upstream feature extractor.
///
/// This is the only type that carries sensitive attributes. The pipeline
/// splits each record into a [`CandidateProfile`] (what the scoring engines
/// see) and a sensitive-attribute row that goes to the fairness auditor
/// alone, so the separation is structural rather than a convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Opaque, session-scoped identifier (e.g. the upload filename)
    pub id: String,
    /// Raw or normalized resume text
    #[serde(default)]
    pub text: String,
    /// Extracted skill terms
    #[serde(default)]
    pub skills: Vec<String>,
    /// Extracted work history entries, in document order
    #[serde(default)]
    pub timeline: Vec<TimelineEntry>,
    /// Redacted group attributes (e.g. "gender" -> "f"), auditor-only
    #[serde(default)]
    pub sensitive: BTreeMap<String, String>,
}

/// The scoring view of a candidate: identical to the record minus the
/// sensitive attributes, with text redacted/truncated and skills normalized.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub id: String,
    pub text: String,
    pub skills: BTreeSet<String>,
    pub timeline: Vec<TimelineEntry>,
}

/// A single work-history claim. Dates arrive as loosely formatted strings
/// and are parsed leniently — an unparseable date produces a flag, never an
/// error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    /// Start date as written in the source document
    pub start: String,
    /// End date, or None / "present" / "current" for an ongoing role
    #[serde(default)]
    pub end: Option<String>,
    /// Role/organization label
    pub label: String,
    /// Location of the claim in the source document, for display
    #[serde(default)]
    pub span: Option<String>,
}

/// A typed, explainable annotation attached to a candidate.
///
/// Every anomaly the analyzers detect becomes one of these variants, each
/// carrying its evidence, so downstream consumers can match exhaustively
/// instead of comparing ad hoc strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Flag {
    /// A must-have requirement term absent from the candidate's skills/text
    MissingRequiredSkill { term: String },
    /// Uncovered interval between two consecutive claims beyond the threshold
    EmploymentGap {
        from: NaiveDate,
        to: NaiveDate,
        days: i64,
    },
    /// Two claims intersect beyond the tolerance — surfaced, not rejected
    OverlappingClaim {
        first: String,
        second: String,
        days: i64,
    },
    /// Two claims with the same normalized label and exact date range
    DuplicateEntry {
        label: String,
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// Ongoing role whose start is implausibly far in the past
    SuspiciousOpenRole { label: String, started: NaiveDate },
    /// Date that could not be parsed — the entry is excluded from interval math
    UnparsedDate { label: String, raw: String },
    /// Entry whose start parses after its end
    InvertedDates { label: String },
    /// Metric anomalies in the resume text (extreme percentages, multipliers)
    ExaggeratedClaim { reasons: Vec<String> },
    /// Stated years of experience disagree with the computed timeline total
    ExperienceMismatch {
        stated_years: f64,
        computed_years: f64,
    },
}

impl Flag {
    /// Stable machine-readable name, used in exports and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Flag::MissingRequiredSkill { .. } => "missing_required_skill",
            Flag::EmploymentGap { .. } => "employment_gap",
            Flag::OverlappingClaim { .. } => "overlapping_claim",
            Flag::DuplicateEntry { .. } => "duplicate_entry",
            Flag::SuspiciousOpenRole { .. } => "suspicious_open_role",
            Flag::UnparsedDate { .. } => "unparsed_date",
            Flag::InvertedDates { .. } => "inverted_dates",
            Flag::ExaggeratedClaim { .. } => "exaggerated_claim",
            Flag::ExperienceMismatch { .. } => "experience_mismatch",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flag::MissingRequiredSkill { term } => write!(f, "missing required skill: {term}"),
            Flag::EmploymentGap { from, to, days } => {
                write!(f, "employment gap {from} to {to} ({days} days)")
            }
            Flag::OverlappingClaim {
                first,
                second,
                days,
            } => write!(f, "overlapping claims \"{first}\" / \"{second}\" ({days} days)"),
            Flag::DuplicateEntry { label, start, .. } => {
                write!(f, "duplicate entry \"{label}\" starting {start}")
            }
            Flag::SuspiciousOpenRole { label, started } => {
                write!(f, "open role \"{label}\" since {started}")
            }
            Flag::UnparsedDate { label, raw } => {
                write!(f, "unparseable date \"{raw}\" in \"{label}\"")
            }
            Flag::InvertedDates { label } => write!(f, "inverted dates in \"{label}\""),
            Flag::ExaggeratedClaim { reasons } => {
                write!(f, "exaggerated claims: {}", reasons.join(", "))
            }
            Flag::ExperienceMismatch {
                stated_years,
                computed_years,
            } => write!(
                f,
                "stated {stated_years:.1}y experience vs {computed_years:.1}y computed"
            ),
        }
    }
}

/// Requirement coverage for one candidate. Term vectors keep the job's
/// requirement order so output is stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Coverage {
    /// matched / required, or 1.0 when no must-have terms are configured
    pub must_have_score: f64,
    /// matched / listed, or 0.0 when no nice-to-have terms are configured
    pub nice_to_have_score: f64,
    pub matched_must_have: Vec<String>,
    pub missing_must_have: Vec<String>,
    pub matched_nice: Vec<String>,
}

/// The per-candidate feature vector cached in the request scope.
///
/// What-if reweighting recomputes scores from these values alone — no
/// re-extraction, no access to the batch vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFeatures {
    pub semantic: f64,
    pub coverage: Coverage,
    pub flags: Vec<Flag>,
}

/// One term of a score breakdown: `contribution = weight * value`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationTerm {
    pub term: String,
    pub weight: f64,
    pub value: f64,
    pub contribution: f64,
}

/// A fully scored candidate, ready for ranking and export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    /// Cosine similarity against the job description, in [0,1]
    pub semantic_score: f64,
    pub coverage: Coverage,
    /// Total decrement derived from flag severities, >= 0
    pub consistency_penalty: f64,
    /// Weighted composite, clamped to [0,1]
    pub final_score: f64,
    pub flags: Vec<Flag>,
    pub explanation: Vec<ExplanationTerm>,
}

/// Why a candidate was excluded from ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// No text, no skills, no timeline — nothing to score
    NoUsableText,
    /// The request budget expired before this candidate finished
    ScoringTimeout,
}

impl ExclusionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExclusionReason::NoUsableText => "no_usable_text",
            ExclusionReason::ScoringTimeout => "scoring_timeout",
        }
    }
}

impl std::fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate reported out of the ranking instead of silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedCandidate {
    pub id: String,
    pub reason: ExclusionReason,
}

/// Disparate-impact verdict for one group against the reference group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Warn => "warn",
            Verdict::Fail => "fail",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Selection statistics for one group value of one sensitive attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRow {
    pub group: String,
    pub population: usize,
    pub selected: usize,
    pub selection_rate: f64,
    /// selection_rate / reference rate; None for the reference group itself,
    /// for undersized groups, and when the reference rate is zero
    pub impact_ratio: Option<f64>,
    pub verdict: Option<Verdict>,
    /// Group too small for a statistically stable ratio
    pub insufficient_sample: bool,
}

/// An advisory fairness finding. Findings never alter scores or order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FairnessFinding {
    DisparateImpactWarning {
        attribute: String,
        group: String,
        ratio: f64,
    },
    InsufficientSample {
        attribute: String,
        group: String,
        population: usize,
    },
    /// Nobody from any eligible group was selected — ratios are undefined
    NoReferenceSelection { attribute: String },
}

/// The audit table for one sensitive attribute (e.g. "gender").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeAudit {
    pub attribute: String,
    pub reference_group: Option<String>,
    pub rows: Vec<GroupRow>,
    pub findings: Vec<FairnessFinding>,
}

/// Pool-level fairness diagnostics over the ranked candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FairnessReport {
    /// Number of top-ranked candidates counted as "selected"
    pub top_k: usize,
    pub audits: Vec<AttributeAudit>,
}

impl FairnessReport {
    /// All advisory findings across attributes, for summary display.
    pub fn findings(&self) -> impl Iterator<Item = &FairnessFinding> {
        self.audits.iter().flat_map(|a| a.findings.iter())
    }
}

/// Everything one scoring request produces.
///
/// Scores in `ranked` are comparable only within this batch — the similarity
/// model's document statistics are built from this batch's corpus and are
/// discarded with it, never cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringOutcome {
    /// Candidates in final rank order (stable across identical runs)
    pub ranked: Vec<ScoredCandidate>,
    /// Candidates left out of the ranking, each with a reason
    pub excluded: Vec<ExcludedCandidate>,
    pub fairness: FairnessReport,
    /// True when the request budget expired before the whole batch finished
    pub timed_out: bool,
    /// Cached features for what-if reweighting
    pub features: BTreeMap<String, CandidateFeatures>,
    /// Auditor-only group attributes, retained so a reweighted ranking can
    /// be re-audited without touching the original records. Never
    /// serialized — only the aggregated fairness report leaves the engine.
    #[serde(skip)]
    pub(crate) sensitive: BTreeMap<String, BTreeMap<String, String>>,
}
