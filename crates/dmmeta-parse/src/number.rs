//! Catalog number normalization.
//!
//! DMM content ids (`cid`) carry a letter prefix and a zero-padded serial,
//! often with a numeric label prefix (`1stars00123`, `h_1234abc00045`).
//! The canonical form used for cross-referencing is `LETTERS-NNN`.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// First run of two or more letters, then an optional separator, then digits.
static RE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]{2,})[-_]?(\d+)").unwrap());

/// Minimum width of the numeric part in canonical form.
const MIN_DIGITS: usize = 3;

/// Canonicalize a raw catalog code into `LETTERS-NNN`.
///
/// Returns an empty string when no letter/digit pair can be found; an empty
/// result means "unparsable", never an error.
pub fn normalize(raw: &str) -> String {
    let upper = raw.nfkc().collect::<String>().to_uppercase();
    let Some(caps) = RE_NUMBER.captures(&upper) else {
        return String::new();
    };

    let letters = &caps[1];
    let digits = caps[2].trim_start_matches('0');
    format!("{letters}-{digits:0>width$}", width = MIN_DIGITS)
}
