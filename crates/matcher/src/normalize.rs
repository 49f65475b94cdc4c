use std::collections::HashSet;

/// Lowercase, trim, and drop every character other than `[a-z0-9 ]`.
///
/// Total: never fails, and empty input yields an empty string.
pub fn normalize_location(text: &str) -> String {
    text.to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ')
        .collect()
}

/// Distinct whitespace-separated tokens of the normalized location.
pub fn location_tokens(text: &str) -> HashSet<String> {
    normalize_location(text)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
