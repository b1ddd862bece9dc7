//! Location name comparison

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Comparison key for location names: lowercased, diacritics stripped and
/// whitespace runs collapsed to a single space, so "Café  Central" and
/// " cafe central" collide.
pub fn normalize_name(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
