//! Salt, hydrate and ester suffix removal.
//!
//! English registry text separates salts into their own words and may list
//! several components, so English salts are removed as whole words anywhere.
//! Korean compounds attach salt morphemes to the end of the base name, so
//! Korean salts are only peeled from the end, one suffix at a time.
//!
//! Both languages strip each comma-separated component on its own and rejoin
//! the components with `", "`, so a combination product normalizes the same
//! whichever salt forms its components carry.

use std::sync::LazyLock;

use regex::Regex;

use crate::dosage::is_number_token;
use crate::script::collapse_whitespace;

const ENGLISH_SALT_WORDS: &[&str] = &[
    "HYDROCHLORIDE",
    "DIHYDROCHLORIDE",
    "HCL",
    "HYDROBROMIDE",
    "MESYLATE",
    "MESILATE",
    "DIMESYLATE",
    "BESYLATE",
    "BESILATE",
    "TOSYLATE",
    "TOSILATE",
    "MALEATE",
    "FUMARATE",
    "HEMIFUMARATE",
    "SUCCINATE",
    "TARTRATE",
    "BITARTRATE",
    "CITRATE",
    "ACETATE",
    "SULFATE",
    "SULPHATE",
    "BISULFATE",
    "PHOSPHATE",
    "NITRATE",
    "LACTATE",
    "GLUCONATE",
    "MALATE",
    "OXALATE",
    "PAMOATE",
    "BROMIDE",
    "CHLORIDE",
    "IODIDE",
    "SODIUM",
    "DISODIUM",
    "TRISODIUM",
    "POTASSIUM",
    "DIPOTASSIUM",
    "CALCIUM",
    "MAGNESIUM",
    "HYDRATE",
    "MONOHYDRATE",
    "DIHYDRATE",
    "TRIHYDRATE",
    "SESQUIHYDRATE",
    "HEMIHYDRATE",
    "PENTAHYDRATE",
    "HEXAHYDRATE",
    "HEPTAHYDRATE",
    "ANHYDROUS",
    "OLAMINE",
    "MEGLUMINE",
    "TROMETHAMINE",
    "SALT",
];

/// Counter-ions that are the active compound when paired with an inorganic
/// anion (`CALCIUM CARBONATE` vs `SODIUM CARBONATE`).
const CATION_WORDS: &[&str] = &[
    "SODIUM",
    "DISODIUM",
    "TRISODIUM",
    "POTASSIUM",
    "DIPOTASSIUM",
    "CALCIUM",
    "MAGNESIUM",
];

const INORGANIC_ANION_WORDS: &[&str] = &[
    "CARBONATE",
    "BICARBONATE",
    "HYDROXIDE",
    "OXIDE",
    "PEROXIDE",
    "FLUORIDE",
    "SILICATE",
    "BORATE",
    "HYPOCHLORITE",
    "PERMANGANATE",
    "THIOSULFATE",
];

const KOREAN_SALT_SUFFIXES: &[&str] = &[
    "칠수화물",
    "육수화물",
    "오수화물",
    "삼수화물",
    "이수화물",
    "일수화물",
    "반수화물",
    "세스퀴수화물",
    "수화물",
    "무수물",
    "이나트륨염",
    "이나트륨",
    "나트륨염",
    "나트륨",
    "이칼륨",
    "칼륨염",
    "칼륨",
    "칼슘염",
    "칼슘",
    "마그네슘",
    "이염산염",
    "염산염",
    "브롬화수소산염",
    "메실산염",
    "베실산염",
    "토실산염",
    "말레산염",
    "푸마르산염",
    "숙신산염",
    "타르타르산염",
    "시트르산염",
    "아세트산염",
    "황산염",
    "인산염",
    "질산염",
    "젖산염",
    "올라민",
    "메글루민",
    "염",
];

pub static ENGLISH_SALTS: LazyLock<SaltList> =
    LazyLock::new(|| SaltList::new(SaltLanguage::English, ENGLISH_SALT_WORDS.iter().copied()));

pub static KOREAN_SALTS: LazyLock<SaltList> =
    LazyLock::new(|| SaltList::new(SaltLanguage::Korean, KOREAN_SALT_SUFFIXES.iter().copied()));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaltLanguage {
    /// Whole-word removal anywhere in the string.
    English,
    /// Repeated removal from the end of the string only.
    Korean,
}

/// An ordered (longest first) salt suffix list for one language.
#[derive(Debug, Clone)]
pub struct SaltList {
    language: SaltLanguage,
    suffixes: Vec<String>,
    word_pattern: Option<Regex>,
    /// `word_pattern` without cation words.
    anion_pattern: Option<Regex>,
}

impl SaltList {
    pub fn new<I, S>(language: SaltLanguage, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suffixes: Vec<String> = suffixes
            .into_iter()
            .map(|suffix| suffix.as_ref().trim().to_uppercase())
            .filter(|suffix| !suffix.is_empty())
            .collect();
        suffixes.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        suffixes.dedup();
        let (word_pattern, anion_pattern) = match language {
            SaltLanguage::English => (
                whole_word_pattern(suffixes.iter()),
                whole_word_pattern(
                    suffixes
                        .iter()
                        .filter(|suffix| !CATION_WORDS.contains(&suffix.as_str())),
                ),
            ),
            SaltLanguage::Korean => (None, None),
        };
        Self {
            language,
            suffixes,
            word_pattern,
            anion_pattern,
        }
    }

    pub fn language(&self) -> SaltLanguage {
        self.language
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

fn whole_word_pattern<'a, I>(words: I) -> Option<Regex>
where
    I: Iterator<Item = &'a String>,
{
    let alternation = words
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    if alternation.is_empty() {
        return None;
    }
    Regex::new(&format!(r"\b(?:{alternation})\b")).ok()
}

/// Removes salt/hydrate suffixes from a dosage-normalized base name.
///
/// Each comma-separated component is stripped on its own; empty components
/// are dropped and the rest rejoined with `", "`. A component made only of
/// salt words (`SODIUM CHLORIDE`) is kept unstripped, and a cation paired
/// with an inorganic anion (`CALCIUM CARBONATE`) keeps its cation.
pub fn strip_salts(base: &str, list: &SaltList) -> String {
    let upper = base.to_uppercase();
    upper
        .split(',')
        .map(|component| match list.language {
            SaltLanguage::English => strip_english(component, list),
            SaltLanguage::Korean => strip_korean(component, list),
        })
        .filter(|component| !component.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn strip_english(component: &str, list: &SaltList) -> String {
    let words: Vec<&str> = component
        .split_whitespace()
        .filter(|token| !is_number_token(token))
        .collect();
    let joined = words.join(" ");
    let Some(pattern) = &list.word_pattern else {
        return joined;
    };
    let stripped = collapse_whitespace(&pattern.replace_all(&joined, " "));
    if stripped.is_empty() {
        return joined;
    }
    if INORGANIC_ANION_WORDS.contains(&stripped.as_str())
        && let Some(anion_pattern) = &list.anion_pattern
    {
        return collapse_whitespace(&anion_pattern.replace_all(&joined, " "));
    }
    stripped
}

fn strip_korean(component: &str, list: &SaltList) -> String {
    let mut current = component.trim();
    'peel: loop {
        for suffix in &list.suffixes {
            if current.len() > suffix.len()
                && let Some(rest) = current.strip_suffix(suffix.as_str())
            {
                current = rest.trim_end();
                continue 'peel;
            }
        }
        break;
    }
    collapse_whitespace(current)
}
