//! Text normalisation for accent- and case-insensitive comparison.
//!
//! Every comparison the engine makes (free-text search, facet matching,
//! status keywords) goes through [`normalize`] on both sides, so that
//! "Municípios", "MUNICIPIOS" and " municipios " compare equal.
//!
//! # Pipeline
//!
//! 1. Lowercase (Unicode-aware)
//! 2. Canonical decomposition (NFD): "ó" → "o" + U+0301
//! 3. Drop combining marks
//! 4. Trim surrounding whitespace
//!
//! Lowercasing runs first so that characters whose lowercase form carries a
//! combining mark (e.g. "İ" → "i̇") are stripped in the same pass, which keeps
//! the function idempotent.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalise text for comparison: lowercase, accents stripped, trimmed.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.trim().to_string()
}

/// Normalise an optional value; absent is treated as empty.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// True when `text` is absent or whitespace only.
pub fn is_blank(text: Option<&str>) -> bool {
    text.is_none_or(|t| t.trim().is_empty())
}
