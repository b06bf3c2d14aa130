//! Reviewer-confirmed English to Korean product name translations.

use std::collections::BTreeMap;

use mfds_normalization::{Cleaner, collapse_whitespace, contains_hangul};

#[derive(Debug, Clone, Default)]
pub struct Translations {
    english_to_korean: BTreeMap<String, String>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from `(english, korean)` pairs. English keys are uppercased and
    /// whitespace-collapsed; pairs whose Korean side has no Hangul are dropped.
    pub fn from_pairs<I, E, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (E, K)>,
        E: AsRef<str>,
        K: AsRef<str>,
    {
        let mut translations = Self::new();
        for (english, korean) in pairs {
            translations.insert(english.as_ref(), korean.as_ref());
        }
        translations
    }

    /// Returns false when the pair was rejected.
    pub fn insert(&mut self, english: &str, korean: &str) -> bool {
        let key = collapse_whitespace(&english.to_uppercase());
        let korean = korean.trim();
        if key.is_empty() || !contains_hangul(korean) {
            return false;
        }
        self.english_to_korean.insert(key, korean.to_string());
        true
    }

    /// Runs both sides through `cleaner`, so keys compare equal to the
    /// cleaned input keys they translate. When two keys clean to the same
    /// string, the one sorting last wins.
    pub fn cleaned_with(&self, cleaner: &Cleaner) -> Self {
        let mut cleaned = Self::new();
        for (english, korean) in &self.english_to_korean {
            let key = cleaner.clean(english);
            let korean = cleaner.clean(korean);
            if !key.is_empty() && contains_hangul(&korean) {
                cleaned.english_to_korean.insert(key, korean);
            }
        }
        cleaned
    }

    pub fn get(&self, english_key: &str) -> Option<&str> {
        self.english_to_korean
            .get(english_key)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.english_to_korean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.english_to_korean.is_empty()
    }
}
