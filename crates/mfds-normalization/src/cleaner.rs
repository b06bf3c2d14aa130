//! Product-name cleaning into canonical search keys.

use std::sync::LazyLock;

use crate::script::collapse_whitespace;

/// Data-entry artifact tokens found trailing (or embedded in) hospital
/// product names.
pub const DEFAULT_ARTIFACT_TOKENS: &[&str] =
    &["P5V>>", "EUP>>", "AB8>>", "CC4>>", "MPM>>", "G-O", ">>"];

static DEFAULT_CLEANER: LazyLock<Cleaner> = LazyLock::new(Cleaner::default);

/// Cleans a raw product name with the default artifact token list.
pub fn clean(raw: &str) -> String {
    DEFAULT_CLEANER.clean(raw)
}

/// Name cleaner with a configurable artifact token list.
#[derive(Debug, Clone)]
pub struct Cleaner {
    /// Uppercased, longest first.
    tokens: Vec<String>,
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::new(DEFAULT_ARTIFACT_TOKENS.iter().copied())
    }
}

impl Cleaner {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(|token| token.as_ref().trim().to_uppercase())
            .filter(|token| !token.is_empty())
            .collect();
        tokens.dedup();
        // Stable sort keeps the configured order among equal lengths.
        tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        Self { tokens }
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Trim, uppercase, replace `.` with a space, remove artifact tokens
    /// until a full pass finds none, collapse whitespace.
    ///
    /// Uppercasing leaves Hangul untouched.
    pub fn clean(&self, raw: &str) -> String {
        let mut cleaned = raw.trim().to_uppercase().replace('.', " ");
        // Shorter tokens such as ">>" are suffixes of longer ones, so restart
        // from the longest token after every removal.
        'scan: loop {
            for token in &self.tokens {
                if let Some(pos) = cleaned.find(token.as_str()) {
                    cleaned.replace_range(pos..pos + token.len(), "");
                    continue 'scan;
                }
            }
            break;
        }
        collapse_whitespace(&cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(clean(""), "");
        assert_eq!(clean("   \t "), "");
    }

    #[test]
    fn uppercases_and_replaces_dots() {
        assert_eq!(clean("  glivec tab.  100mg "), "GLIVEC TAB 100MG");
    }

    #[test]
    fn keeps_hangul_untouched() {
        assert_eq!(clean("허셉틴주150밀리그램"), "허셉틴주150밀리그램");
        assert_eq!(clean("tykerb정 250mg"), "TYKERB정 250MG");
    }

    #[test]
    fn removes_trailing_artifact_tokens() {
        assert_eq!(clean("Herceptin inj P5V>>"), "HERCEPTIN INJ");
        assert_eq!(clean("Glivec tab>>"), "GLIVEC TAB");
        assert_eq!(clean("Sutent cap mpm>>"), "SUTENT CAP");
    }

    #[test]
    fn removes_longest_token_first() {
        // "EUP>>" must go as a whole, not leave "EUP" behind after ">>".
        assert_eq!(clean("Avastin EUP>>"), "AVASTIN");
    }

    #[test]
    fn repeats_until_no_token_left() {
        assert_eq!(clean("Tarceva G-O >> AB8>>"), "TARCEVA");
    }

    #[test]
    fn custom_tokens() {
        let cleaner = Cleaner::new(["zz9", ""]);
        assert_eq!(cleaner.tokens(), &["ZZ9".to_string()]);
        assert_eq!(cleaner.clean("Nexavar ZZ9"), "NEXAVAR");
        // Default tokens are not applied by a custom cleaner.
        assert_eq!(cleaner.clean("Nexavar>>"), "NEXAVAR>>");
    }
}
