//! Address cleanup before geocoding.
//!
//! User input arrives from a free-text prompt: stray whitespace, trailing
//! punctuation and placeholder values are common. This module normalizes
//! them so that identical addresses produce identical requests.

/// Values that are never worth sending to the geocoder.
static SKIP_PATTERNS: &[&str] = &["N/A", "NA", "NONE", "INCONNU", "UNKNOWN", "-", "?"];

/// Cleans a free-text address for geocoding.
///
/// Collapses runs of whitespace, trims surrounding whitespace and trailing
/// commas, and returns `None` for empty or placeholder input.
#[must_use]
pub fn clean_address(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = collapsed.trim_end_matches([',', ';']).trim();

    if cleaned.is_empty()
        || SKIP_PATTERNS
            .iter()
            .any(|p| cleaned.eq_ignore_ascii_case(p))
    {
        return None;
    }

    Some(cleaned.to_string())
}
