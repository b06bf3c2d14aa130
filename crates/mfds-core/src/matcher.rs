//! Best-match selection for a cleaned key.

use std::sync::LazyLock;

use mfds_model::{CandidateRecord, MatchQuality};
use mfds_normalization::{Cleaner, contains_hangul};
use tracing::debug;

static DEFAULT_CLEANER: LazyLock<Cleaner> = LazyLock::new(Cleaner::default);

/// Selected registry record and how it was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMatch<'a> {
    pub candidate: &'a CandidateRecord,
    pub quality: MatchQuality,
}

/// Selects the best candidate for `cleaned_key` using the default cleaner.
pub fn find_best_match<'a>(
    cleaned_key: &str,
    candidates: &'a [CandidateRecord],
) -> Option<BestMatch<'a>> {
    find_best_match_with(&DEFAULT_CLEANER, cleaned_key, candidates)
}

/// Selects the best candidate for `cleaned_key`.
///
/// Korean keys match cleaned item names exactly. English keys match cleaned
/// English names exactly, then by the partial rule: the English name
/// contains the key, or the key contains the first word of the English name.
/// Within the matching pool, or the whole list when nothing matched, the
/// earliest permit date wins, with unknown dates last and ties going to the
/// earlier candidate.
///
/// Returns `None` only for an empty candidate list.
pub fn find_best_match_with<'a>(
    cleaner: &Cleaner,
    cleaned_key: &str,
    candidates: &'a [CandidateRecord],
) -> Option<BestMatch<'a>> {
    if candidates.is_empty() {
        return None;
    }

    let exact_pool: Vec<&CandidateRecord> = if contains_hangul(cleaned_key) {
        candidates
            .iter()
            .filter(|candidate| cleaner.clean(&candidate.item_name) == cleaned_key)
            .collect()
    } else {
        english_pool(cleaner, cleaned_key, candidates)
    };

    let (selected, quality) = if exact_pool.is_empty() {
        (earliest(candidates.iter()), MatchQuality::Fuzzy)
    } else {
        (earliest(exact_pool.iter().copied()), MatchQuality::Exact)
    };
    let candidate = selected?;
    debug!(
        key = %cleaned_key,
        candidates = candidates.len(),
        pool = exact_pool.len(),
        quality = %quality,
        item_name = %candidate.item_name,
        "selected best match"
    );
    Some(BestMatch { candidate, quality })
}

fn english_pool<'a>(
    cleaner: &Cleaner,
    cleaned_key: &str,
    candidates: &'a [CandidateRecord],
) -> Vec<&'a CandidateRecord> {
    let named: Vec<(&CandidateRecord, String)> = candidates
        .iter()
        .map(|candidate| (candidate, cleaner.clean(&candidate.item_name_eng)))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let exact: Vec<&CandidateRecord> = named
        .iter()
        .filter(|(_, name)| name == cleaned_key)
        .map(|(candidate, _)| *candidate)
        .collect();
    if !exact.is_empty() || cleaned_key.is_empty() {
        return exact;
    }

    named
        .iter()
        .filter(|(_, name)| {
            let first_word = name.split(' ').next().unwrap_or_default();
            name.contains(cleaned_key) || (!first_word.is_empty() && cleaned_key.contains(first_word))
        })
        .map(|(candidate, _)| *candidate)
        .collect()
}

fn earliest<'a, I>(candidates: I) -> Option<&'a CandidateRecord>
where
    I: Iterator<Item = &'a CandidateRecord>,
{
    candidates.min_by(|a, b| a.permit_date_or_sentinel().cmp(b.permit_date_or_sentinel()))
}
