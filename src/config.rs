use std::env;

use anyhow::Result;

/// Thresholds for the timeline analyzer. All of these are policy choices,
/// so they load from the environment rather than being fixed at use sites.
#[derive(Debug, Clone)]
pub struct TimelinePolicy {
    /// Uncovered days between consecutive claims before a gap is flagged
    pub gap_threshold_days: i64,
    /// Days of intersection tolerated before an overlap is flagged
    pub overlap_tolerance_days: i64,
    /// An ongoing role older than this many years is flagged as suspicious
    pub open_role_max_years: i64,
    /// Stated-vs-computed experience difference tolerated, in months
    pub experience_mismatch_months: f64,
}

impl Default for TimelinePolicy {
    fn default() -> Self {
        Self {
            gap_threshold_days: 90,
            overlap_tolerance_days: 30,
            open_role_max_years: 30,
            experience_mismatch_months: 18.0,
        }
    }
}

/// Policy for the fairness auditor.
#[derive(Debug, Clone)]
pub struct FairnessPolicy {
    /// Fraction of the batch counted as "selected" when no absolute K is set
    pub top_fraction: f64,
    /// Absolute top-K override
    pub top_k: Option<usize>,
    /// Groups smaller than this are excluded from ratio computation
    pub min_group_size: usize,
    /// Disparate-impact band: ratios inside [low, high] pass
    pub band_low: f64,
    pub band_high: f64,
    /// Ratios at or below this fail outright
    pub fail_ratio: f64,
    /// Reference group override; defaults to the highest-selection-rate group
    pub reference_group: Option<String>,
}

impl Default for FairnessPolicy {
    fn default() -> Self {
        Self {
            top_fraction: 0.25,
            top_k: None,
            min_group_size: 5,
            band_low: 0.80,
            band_high: 1.25,
            fail_ratio: 0.50,
            reference_group: None,
        }
    }
}

/// Resource bounds for one scoring request.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum candidates per batch
    pub max_batch: usize,
    /// Maximum resume text length in characters (excess is truncated)
    pub max_text_len: usize,
    /// Request budget — on expiry, finished candidates are still returned
    pub timeout_ms: u64,
    /// Per-candidate analysis tasks in flight at once
    pub concurrency: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_batch: 500,
            max_text_len: 20_000,
            timeout_ms: 10_000,
            concurrency: 8,
        }
    }
}

/// Central configuration loaded from environment variables.
///
/// Every value has an in-code default; the .env file is loaded at startup
/// via dotenvy so local overrides never need to be exported by hand.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub timeline: TimelinePolicy,
    pub fairness: FairnessPolicy,
    pub limits: Limits,
}

impl Config {
    /// Load configuration from SHORTLIST_* environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Config::default();

        Ok(Self {
            timeline: TimelinePolicy {
                gap_threshold_days: env_num(
                    "SHORTLIST_GAP_DAYS",
                    defaults.timeline.gap_threshold_days,
                ),
                overlap_tolerance_days: env_num(
                    "SHORTLIST_OVERLAP_TOLERANCE_DAYS",
                    defaults.timeline.overlap_tolerance_days,
                ),
                open_role_max_years: env_num(
                    "SHORTLIST_OPEN_ROLE_MAX_YEARS",
                    defaults.timeline.open_role_max_years,
                ),
                experience_mismatch_months: env_num(
                    "SHORTLIST_EXPERIENCE_MISMATCH_MONTHS",
                    defaults.timeline.experience_mismatch_months,
                ),
            },
            fairness: FairnessPolicy {
                top_fraction: env_num("SHORTLIST_TOP_FRACTION", defaults.fairness.top_fraction),
                top_k: env::var("SHORTLIST_TOP_K").ok().and_then(|v| v.parse().ok()),
                min_group_size: env_num(
                    "SHORTLIST_MIN_GROUP_SIZE",
                    defaults.fairness.min_group_size,
                ),
                band_low: env_num("SHORTLIST_BAND_LOW", defaults.fairness.band_low),
                band_high: env_num("SHORTLIST_BAND_HIGH", defaults.fairness.band_high),
                fail_ratio: env_num("SHORTLIST_FAIL_RATIO", defaults.fairness.fail_ratio),
                reference_group: env::var("SHORTLIST_REFERENCE_GROUP").ok(),
            },
            limits: Limits {
                max_batch: env_num("SHORTLIST_MAX_BATCH", defaults.limits.max_batch),
                max_text_len: env_num("SHORTLIST_MAX_TEXT_LEN", defaults.limits.max_text_len),
                timeout_ms: env_num("SHORTLIST_TIMEOUT_MS", defaults.limits.timeout_ms),
                concurrency: env_num("SHORTLIST_CONCURRENCY", defaults.limits.concurrency),
            },
        })
    }
}

/// Read a numeric env var, falling back to the default on absence or a
/// value that doesn't parse.
fn env_num<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
