//! Local substring search over the registry snapshot.

use mfds_core::CandidateSupplier;
use mfds_model::CandidateRecord;
use mfds_normalization::contains_hangul;
use tracing::debug;

use crate::registry::{Registry, SearchText};

/// Trailing Korean dosage-form words, longest first.
const KOREAN_DOSAGE_FORMS: [&str; 20] = [
    "필름코팅정",
    "구강붕해정",
    "츄어블정",
    "서방정",
    "장용정",
    "분산정",
    "주사액",
    "점안액",
    "점비액",
    "현탁액",
    "주사",
    "캡슐",
    "시럽",
    "연고",
    "크림",
    "패치",
    "정",
    "주",
    "액",
    "산",
];

/// Shortest base worth retrying after a dosage form is stripped.
const MIN_BASE_CHARS: usize = 2;

/// Uppercases `name` and strips one trailing Korean dosage-form word, if
/// something remains in front of it.
pub fn strip_dosage_form(name: &str) -> String {
    let upper = name.trim().to_uppercase();
    for form in KOREAN_DOSAGE_FORMS {
        if let Some(base) = upper.strip_suffix(form)
            && !base.is_empty()
        {
            return base.to_string();
        }
    }
    upper
}

impl Registry {
    /// Product-name search. Korean queries match item names and retry once
    /// without a trailing dosage form (`글리벡정` finds `글리벡필름코팅정`);
    /// English queries match English or item names.
    pub fn search_local(&self, query: &str) -> Vec<CandidateRecord> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Vec::new();
        }

        if !contains_hangul(&query) {
            return self.filter_records(|text| {
                text.item_name_eng.contains(&query) || text.item_name.contains(&query)
            });
        }

        let found = self.filter_records(|text| text.item_name.contains(&query));
        if !found.is_empty() {
            return found;
        }
        let base = strip_dosage_form(&query);
        if base == query || base.chars().count() < MIN_BASE_CHARS {
            return found;
        }
        debug!(query = %query, base = %base, "retrying without dosage form");
        self.filter_records(|text| text.item_name.contains(&base))
    }

    /// Records whose Korean or English ingredient contains `query`.
    pub fn search_by_ingredient(&self, query: &str) -> Vec<CandidateRecord> {
        let query = query.trim().to_uppercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.filter_records(|text| {
            text.ingredient.contains(&query) || text.ingredient_eng.contains(&query)
        })
    }

    fn filter_records<F>(&self, mut predicate: F) -> Vec<CandidateRecord>
    where
        F: FnMut(&SearchText) -> bool,
    {
        self.records()
            .iter()
            .zip(&self.search_text)
            .filter(|(_, text)| predicate(*text))
            .map(|(record, _)| record.clone())
            .collect()
    }
}

impl CandidateSupplier for Registry {
    fn search(&self, query: &str) -> mfds_model::Result<Vec<CandidateRecord>> {
        Ok(self.search_local(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        let record = |item_name: &str, item_name_eng: &str, ingredient: &str| CandidateRecord {
            item_name: item_name.to_string(),
            item_name_eng: item_name_eng.to_string(),
            ingredient: ingredient.to_string(),
            ..CandidateRecord::default()
        };
        Registry::from_records(vec![
            record("글리벡필름코팅정100밀리그램", "Glivec Film Coated Tab. 100mg", "이마티닙메실산염"),
            record("허셉틴주150밀리그램", "Herceptin Inj.", "트라스투주맙"),
            record("히알루론산나트륨점안액0.1%", "", "히알루론산나트륨"),
            record("정", "", ""),
        ])
    }

    #[test]
    fn strips_longest_dosage_form() {
        assert_eq!(strip_dosage_form("글리벡필름코팅정"), "글리벡");
        assert_eq!(strip_dosage_form("타이레놀정"), "타이레놀");
        assert_eq!(strip_dosage_form("리도카인점안액"), "리도카인");
        assert_eq!(strip_dosage_form("정"), "정");
    }

    #[test]
    fn korean_query_retries_without_dosage_form() {
        let registry = registry();
        let found = registry.search_local("글리벡정");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_name, "글리벡필름코팅정100밀리그램");
    }

    #[test]
    fn eye_drop_form_is_stripped_whole() {
        // "액" alone would leave "히알루론산점안", which no item name contains.
        assert_eq!(strip_dosage_form("히알루론산점안액"), "히알루론산");
        let found = registry().search_local("히알루론산점안액");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_name, "히알루론산나트륨점안액0.1%");
    }

    #[test]
    fn short_base_is_not_retried() {
        assert!(registry().search_local("글정").is_empty());
    }

    #[test]
    fn english_query_matches_english_names() {
        let registry = registry();
        assert_eq!(registry.search_local("herceptin").len(), 1);
        assert!(registry.search_local("  ").is_empty());
    }

    #[test]
    fn ingredient_search_is_substring() {
        let registry = registry();
        let found = registry.search_by_ingredient("이마티닙");
        assert_eq!(found.len(), 1);
        assert!(registry.search_by_ingredient("").is_empty());
    }
}
