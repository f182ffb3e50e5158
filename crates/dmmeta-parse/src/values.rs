//! Loose parsers for the human-rendered values found in detail tables.
//!
//! All of these return `None` on unparsable input; callers treat that as
//! "unknown" rather than an error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// "2021/03/19", "2021-03-19", "2021年3月19日".
static RE_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[/\-.年](\d{1,2})[/\-.月](\d{1,2})").unwrap());

/// "01:59:30".
static RE_CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d{1,2}):(\d{1,2})").unwrap());

/// "120分", "120 min", "120minutes".
static RE_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*(?:分|min)").unwrap());

static RE_BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").unwrap());

static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

/// Parse a calendar date from free text.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = RE_DATE.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse a running time into whole minutes.
pub fn parse_duration(text: &str) -> Option<u32> {
    if let Some(caps) = RE_CLOCK.captures(text) {
        let hours: u32 = caps[1].parse().ok()?;
        let minutes: u32 = caps[2].parse().ok()?;
        return hours.checked_mul(60)?.checked_add(minutes);
    }
    if let Some(caps) = RE_MINUTES.captures(text) {
        return caps[1].parse().ok();
    }
    RE_BARE_NUMBER
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse the first decimal number in `text` as a score.
pub fn parse_score(text: &str) -> Option<f64> {
    RE_DECIMAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a score from a rating image URL.
///
/// The file stem is the score token; `_` stands in for the decimal point
/// (`.../review/4_5.gif` is 4.5).
pub fn parse_score_from_url(src: &str) -> Option<f64> {
    let path = src.split(['?', '#']).next()?;
    let file = path.rsplit('/').next()?;
    let stem = file.rsplit_once('.').map_or(file, |(stem, _)| stem);
    if stem.is_empty() {
        return None;
    }
    stem.replacen('_', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
