use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};

/// Characters stripped from numeric cell text before parsing. Covers the
/// thousands separator plus the unit decorations the site prints next to
/// figures.
const NUMBER_ESCAPE_CHAR: &[char] = &[',', '%', '₹', ' ', '"', '\n', '\u{a0}'];

/// Parses an `f64` value from a given string.
///
/// This function accepts a string representation of a number, potentially
/// containing commas as thousands separators and unit suffixes, and attempts
/// to convert it into an `f64`. If the conversion fails, an error is returned.
///
/// # Arguments
///
/// * `s`: A string slice containing the representation of a number that may
///   include commas as thousands separators and other escape characters.
/// * `escape_chars`: Optional additional characters to be removed from the
///   string before parsing.
///
/// # Returns
///
/// * `Result<f64>`: The parsed value if successful, or an error if the
///   conversion fails.
pub fn parse_f64(s: &str, escape_chars: Option<Vec<char>>) -> Result<f64> {
    let cleaned = clean_escape_chars(s, escape_chars);
    f64::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as f64 because: {:?}", cleaned, why))
}

/// Total numeric normalization for table cell text.
///
/// Strips thousands separators and unit decorations, then parses as floating
/// point. `None`, empty, non-numeric and non-finite input all normalize to
/// `0.0`; this function never fails.
pub fn parse_number(text: Option<&str>) -> f64 {
    text.and_then(|s| parse_f64(s, None).ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Removes a set of escape characters from a given string.
///
/// The default set in [`NUMBER_ESCAPE_CHAR`] is always applied; callers may
/// extend it per call.
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}
