// src/normalize.rs
//! Review text normalization.

/// Normalize raw review text for vectorization and scoring.
///
/// Lowercases the input and strips every character that is neither
/// alphanumeric nor whitespace (punctuation, emoji, symbols). Whitespace
/// runs are kept as-is. Total and idempotent; never fails on any input.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}
