//! Dosage and strength removal for product and ingredient names.
//!
//! Two names that differ only in strength normalize to the same string,
//! which is how dosage variants of one product are counted once.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::script::collapse_whitespace;

/// Decimal number with optional `,`/`.` separators (`1,000`, `0.8`).
const NUMBER: &str = r"\d+(?:[.,]\d+)*";

/// Bilingual unit vocabulary. Longer spellings precede their prefixes.
const UNIT: &str = r"(?:MCG|UG|MG|ML|IU|UNITS|UNIT|G|%|마이크로그램|밀리그램|밀리리터|국제단위|그램|리터|단위)";

/// `(...)` manufacturing notes and `[...]` registry ingredient codes.
static ANNOTATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*?\)|\[[^\]]*?\]").expect("annotation regex"));

/// `40MG/0.8ML`, `20MG/ML`, `100MG/`.
static COMPOUND_DOSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i){NUMBER}\s*{UNIT}\s*/\s*(?:{NUMBER})?\s*(?:{UNIT})?"
    ))
    .expect("compound dosage regex")
});

static SIMPLE_DOSAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){NUMBER}\s*{UNIT}")).expect("simple dosage regex")
});

/// Ratio leftovers once units are gone: `10/20`, `/5`, `10/`.
static BARE_RATIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{NUMBER}\s*/\s*{NUMBER}|/\s*{NUMBER}|{NUMBER}\s*/"
    ))
    .expect("bare ratio regex")
});

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{NUMBER}$")).expect("number token regex"));

/// Removes dosage/strength expressions and annotations, uppercasing Latin text.
///
/// Order matters: compound ratios go before single dosages so no `/ML`
/// remnant survives, and bare fragments and slashes are cleaned last.
pub fn strip_dosage(value: &str) -> String {
    let upper = value.to_uppercase();
    let without_notes = ANNOTATION.replace_all(&upper, " ");
    let without_ratio = replace_dosage(&COMPOUND_DOSAGE, &without_notes);
    let without_dosage = replace_dosage(&SIMPLE_DOSAGE, &without_ratio);
    let without_fragments = BARE_RATIO.replace_all(&without_dosage, " ");
    let without_slashes = without_fragments.replace('/', " ");
    trim_numeric_tokens(&without_slashes)
}

/// True for a whitespace-delimited token that is only a number.
pub(crate) fn is_number_token(token: &str) -> bool {
    NUMBER_TOKEN.is_match(token)
}

/// Replaces dosage matches with a space, except a Latin unit running
/// straight into more Latin letters (`10 GOLD` is not `10 G` + `OLD`).
fn replace_dosage(pattern: &Regex, input: &str) -> String {
    pattern
        .replace_all(input, |caps: &Captures<'_>| {
            let Some(found) = caps.get(0) else {
                return String::new();
            };
            let unit_ends_latin = found
                .as_str()
                .chars()
                .next_back()
                .is_some_and(|ch| ch.is_ascii_alphabetic());
            let runs_into_word = input[found.end()..]
                .chars()
                .next()
                .is_some_and(|ch| ch.is_ascii_alphabetic());
            if unit_ends_latin && runs_into_word {
                found.as_str().to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned()
}

fn trim_numeric_tokens(value: &str) -> String {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    let Some(start) = tokens.iter().position(|token| !is_number_token(token)) else {
        return String::new();
    };
    let end = tokens
        .iter()
        .rposition(|token| !is_number_token(token))
        .map_or(tokens.len(), |idx| idx + 1);
    collapse_whitespace(&tokens[start..end].join(" "))
}
