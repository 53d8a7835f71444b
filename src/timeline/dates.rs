// Lenient date parsing for timeline entries.
//
// Resume dates arrive in whatever shape the source document used. The
// parser accepts the common formats and gives up quietly — an unparseable
// token becomes a flag upstream, never an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex_lite::Regex;

static YMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})[/.-](\d{1,2})[/.-](\d{1,2})$").unwrap());
static YM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})[/.-](\d{1,2})$").unwrap());
static MY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{1,2})[/.-](\d{4})$").unwrap());
static MONTH_NAME_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z]{3,9})\.?,?\s+(\d{4})$").unwrap());
static YEAR_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})$").unwrap());

/// Markers meaning "this role is ongoing".
const OPEN_MARKERS: &[&str] = &["present", "current", "now", "ongoing", "today"];

/// True when the end-date token means the role has no end.
pub fn is_open_marker(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    token.is_empty() || OPEN_MARKERS.contains(&token.as_str())
}

/// Parse a single date token. Month-precision inputs resolve to the first
/// of the month, year-precision to January 1st. Returns None when nothing
/// matches — the caller decides whether that deserves a flag.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let token = raw.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(caps) = YMD.captures(token) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let day = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if let Some(caps) = YM.captures(token) {
        let year = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(caps) = MY.captures(token) {
        let month = caps[1].parse().ok()?;
        let year = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(caps) = MONTH_NAME_YEAR.captures(token) {
        let month = month_number(&caps[1])?;
        let year = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(caps) = YEAR_ONLY.captures(token) {
        let year = caps[1].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }

    None
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}
