//! Ingredient group keys and the Korean-to-English cross-reference.

use std::collections::BTreeMap;

use mfds_model::CandidateRecord;
use tracing::debug;

use crate::dosage::strip_dosage;
use crate::salts::{ENGLISH_SALTS, KOREAN_SALTS, strip_salts};

/// Dosage- and salt-free English ingredient base.
pub fn normalize_ingredient_eng(raw: &str) -> String {
    strip_salts(&strip_dosage(raw), &ENGLISH_SALTS)
}

/// Dosage- and salt-free Korean ingredient base.
pub fn normalize_ingredient_kor(raw: &str) -> String {
    strip_salts(&strip_dosage(raw), &KOREAN_SALTS)
}

/// Maps normalized Korean ingredients to the English group key they were
/// observed with, built from records carrying both languages.
///
/// When one Korean key is paired with several English keys, the pairing seen
/// most often wins and ties go to the smallest English key, so the result
/// does not depend on pool order.
#[derive(Debug, Clone, Default)]
pub struct CrossReference {
    korean_to_english: BTreeMap<String, String>,
    conflicts: usize,
}

impl CrossReference {
    pub fn build<'a, I>(pool: I) -> Self
    where
        I: IntoIterator<Item = &'a CandidateRecord>,
    {
        let mut votes: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
        for candidate in pool {
            if candidate.ingredient.trim().is_empty() || candidate.ingredient_eng.trim().is_empty()
            {
                continue;
            }
            let korean = normalize_ingredient_kor(&candidate.ingredient);
            let english = normalize_ingredient_eng(&candidate.ingredient_eng);
            if korean.is_empty() || english.is_empty() {
                continue;
            }
            *votes.entry(korean).or_default().entry(english).or_default() += 1;
        }

        let mut korean_to_english = BTreeMap::new();
        let mut conflicts = 0;
        for (korean, english_votes) in votes {
            if english_votes.len() > 1 {
                conflicts += 1;
                debug!(
                    korean = %korean,
                    candidates = english_votes.len(),
                    "conflicting english keys for korean ingredient"
                );
            }
            // Ascending key order: a later key must strictly outvote to win.
            let mut best: Option<(String, usize)> = None;
            for (english, count) in english_votes {
                if best.as_ref().is_none_or(|(_, best_count)| count > *best_count) {
                    best = Some((english, count));
                }
            }
            if let Some((english, _)) = best {
                korean_to_english.insert(korean, english);
            }
        }
        Self {
            korean_to_english,
            conflicts,
        }
    }

    pub fn english_for(&self, korean: &str) -> Option<&str> {
        self.korean_to_english.get(korean).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.korean_to_english.len()
    }

    pub fn is_empty(&self) -> bool {
        self.korean_to_english.is_empty()
    }

    /// Number of Korean keys that were paired with more than one English key.
    pub fn conflicts(&self) -> usize {
        self.conflicts
    }
}

/// Canonical ingredient group key of a record; empty when the record has no
/// usable ingredient text.
pub fn group_key(candidate: &CandidateRecord, xref: &CrossReference) -> String {
    if !candidate.ingredient_eng.trim().is_empty() {
        let english = normalize_ingredient_eng(&candidate.ingredient_eng);
        if !english.is_empty() {
            return english;
        }
    }
    let korean = normalize_ingredient_kor(&candidate.ingredient);
    if korean.is_empty() {
        return korean;
    }
    match xref.english_for(&korean) {
        Some(english) => english.to_string(),
        None => korean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ingredient: &str, ingredient_eng: &str) -> CandidateRecord {
        CandidateRecord {
            item_name: "테스트주".to_string(),
            ingredient: ingredient.to_string(),
            ingredient_eng: ingredient_eng.to_string(),
            ..CandidateRecord::default()
        }
    }

    #[test]
    fn english_key_preferred() {
        let xref = CrossReference::default();
        let rec = record("페메트렉시드이나트륨염칠수화물", "Pemetrexed Disodium Heptahydrate");
        assert_eq!(group_key(&rec, &xref), "PEMETREXED");
    }

    #[test]
    fn korean_key_without_cross_reference() {
        let xref = CrossReference::default();
        assert_eq!(group_key(&record("페메트렉시드이나트륨염칠수화물", ""), &xref), "페메트렉시드");
        assert_eq!(group_key(&record("페메트렉시드이나트륨", ""), &xref), "페메트렉시드");
    }

    #[test]
    fn korean_only_record_joins_english_group() {
        let pool = vec![
            record("페메트렉시드이나트륨염칠수화물", "Pemetrexed Disodium Heptahydrate"),
            record("페메트렉시드이나트륨", ""),
        ];
        let xref = CrossReference::build(&pool);
        assert_eq!(xref.len(), 1);
        assert_eq!(group_key(&pool[1], &xref), "PEMETREXED");
    }

    #[test]
    fn empty_ingredient_has_empty_key() {
        let xref = CrossReference::default();
        assert_eq!(group_key(&record("", ""), &xref), "");
        assert_eq!(group_key(&record(" ", "  "), &xref), "");
    }

    #[test]
    fn conflicting_pairings_resolve_deterministically() {
        let pool = vec![
            record("이마티닙메실산염", "Imatinib Mesylate"),
            record("이마티닙", "Imatinib"),
            record("이마티닙", "Gleevec Base"),
        ];
        let xref = CrossReference::build(&pool);
        assert_eq!(xref.english_for("이마티닙"), Some("IMATINIB"));
        assert_eq!(xref.conflicts(), 1);

        let tie = vec![record("타다라필", "Tadalafil B"), record("타다라필", "Tadalafil A")];
        let xref = CrossReference::build(&tie);
        assert_eq!(xref.english_for("타다라필"), Some("TADALAFIL A"));

        let reversed: Vec<CandidateRecord> = tie.into_iter().rev().collect();
        let xref = CrossReference::build(&reversed);
        assert_eq!(xref.english_for("타다라필"), Some("TADALAFIL A"));
    }
}
