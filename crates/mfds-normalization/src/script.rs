//! Script detection helpers.

/// True for precomposed Hangul syllables (U+AC00..=U+D7A3).
pub fn is_hangul_syllable(ch: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&ch)
}

/// A key is treated as Korean when it contains any Hangul syllable.
pub fn contains_hangul(value: &str) -> bool {
    value.chars().any(is_hangul_syllable)
}

/// Collapses runs of whitespace to a single space and trims both ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
