//! Per-row processing: clean, search once per distinct key, match, classify.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use mfds_model::{
    CandidateRecord, FinalRow, GroupStats, InputRow, MatchQuality, ProcessOutcome,
    UnmatchedReason, UnmatchedRow,
};
use mfds_normalization::{Cleaner, contains_hangul};
use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use crate::matcher::find_best_match_with;
use crate::options::ReconcileOptions;
use crate::results::build_final_rows_with;
use crate::supplier::CandidateSupplier;
use crate::translations::Translations;

/// Everything a reconciliation run produces.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub final_rows: Vec<FinalRow>,
    pub unmatched_rows: Vec<UnmatchedRow>,
    pub groups: BTreeMap<String, GroupStats>,
    pub summary: RunSummary,
}

/// Run counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub distinct_keys: usize,
    pub translated_keys: usize,
    pub matched: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: BTreeMap<UnmatchedReason, usize>,
    pub groups: usize,
    pub pool_records: usize,
    pub deduplicated_records: usize,
}

impl RunSummary {
    pub fn unmatched_total(&self) -> usize {
        self.unmatched.values().sum()
    }

    pub fn unmatched_for(&self, reason: UnmatchedReason) -> usize {
        self.unmatched.get(&reason).copied().unwrap_or(0)
    }

    fn record(&mut self, outcome: &ProcessOutcome) {
        match outcome {
            ProcessOutcome::Matched { quality, .. } => {
                self.matched += 1;
                match quality {
                    MatchQuality::Exact => self.exact += 1,
                    MatchQuality::Fuzzy => self.fuzzy += 1,
                }
            }
            ProcessOutcome::Unmatched { reason, .. } => {
                *self.unmatched.entry(*reason).or_default() += 1;
            }
        }
    }
}

/// Result of resolving one distinct cleaned key.
#[derive(Debug, Clone)]
enum KeyResolution {
    Matched {
        candidate: CandidateRecord,
        quality: MatchQuality,
    },
    Unmatched {
        reason: UnmatchedReason,
        candidate_count: usize,
    },
}

impl KeyResolution {
    fn outcome(&self, product: &str, cleaned_key: &str) -> ProcessOutcome {
        match self {
            Self::Matched { candidate, quality } => ProcessOutcome::Matched {
                product: product.to_string(),
                cleaned_key: cleaned_key.to_string(),
                candidate: candidate.clone(),
                quality: *quality,
            },
            Self::Unmatched {
                reason,
                candidate_count,
            } => ProcessOutcome::Unmatched {
                product: product.to_string(),
                cleaned_key: cleaned_key.to_string(),
                reason: *reason,
                candidate_count: *candidate_count,
            },
        }
    }
}

/// Classifies every input row. Each distinct cleaned key is searched once;
/// `on_progress(done, total)` fires after each distinct key.
///
/// English keys with a confirmed translation are searched by their Korean
/// translation. Matching and the reported outcome still use the English key.
pub fn process_rows<S, P>(
    rows: &[InputRow],
    supplier: &S,
    translations: &Translations,
    options: &ReconcileOptions,
    on_progress: P,
) -> Vec<ProcessOutcome>
where
    S: CandidateSupplier + ?Sized,
    P: FnMut(usize, usize),
{
    let translations = translations.cleaned_with(&options.cleaner);
    process_cleaned(rows, supplier, &translations, options, on_progress)
}

/// `translations` must already be cleaned with `options.cleaner`.
fn process_cleaned<S, P>(
    rows: &[InputRow],
    supplier: &S,
    translations: &Translations,
    options: &ReconcileOptions,
    mut on_progress: P,
) -> Vec<ProcessOutcome>
where
    S: CandidateSupplier + ?Sized,
    P: FnMut(usize, usize),
{
    let span = info_span!("process_rows", rows = rows.len());
    let _guard = span.enter();
    let start = Instant::now();

    let keys: Vec<String> = rows
        .iter()
        .map(|row| options.cleaner.clean(&row.product))
        .collect();
    let distinct = distinct_non_empty(&keys);
    let total = distinct.len();

    let mut resolved: HashMap<&str, KeyResolution> = HashMap::with_capacity(total);
    for (done, key) in distinct.into_iter().enumerate() {
        resolved.insert(key, resolve_key(key, supplier, translations, &options.cleaner));
        on_progress(done + 1, total);
    }

    let outcomes: Vec<ProcessOutcome> = rows
        .iter()
        .zip(&keys)
        .map(|(row, key)| match resolved.get(key.as_str()) {
            Some(resolution) => resolution.outcome(&row.product, key),
            None => ProcessOutcome::Unmatched {
                product: row.product.clone(),
                cleaned_key: key.clone(),
                reason: UnmatchedReason::NoResult,
                candidate_count: 0,
            },
        })
        .collect();

    let matched = outcomes.iter().filter(|outcome| outcome.is_matched()).count();
    info!(
        rows = rows.len(),
        distinct_keys = total,
        matched,
        duration_ms = start.elapsed().as_millis(),
        "rows processed"
    );
    outcomes
}

fn resolve_key<S>(
    key: &str,
    supplier: &S,
    translations: &Translations,
    cleaner: &Cleaner,
) -> KeyResolution
where
    S: CandidateSupplier + ?Sized,
{
    let english = !contains_hangul(key);
    let translated = if english { translations.get(key) } else { None };
    let search_term = translated.unwrap_or(key);
    if let Some(korean) = translated {
        debug!(key, translation = korean, "searching by confirmed translation");
    }

    let candidates = match supplier.search(search_term) {
        Ok(candidates) => candidates,
        Err(error) => {
            warn!(key, %error, "candidate search failed");
            return KeyResolution::Unmatched {
                reason: UnmatchedReason::SourceError,
                candidate_count: 0,
            };
        }
    };

    if candidates.is_empty() {
        let reason = if english {
            UnmatchedReason::NoResultEnglish
        } else {
            UnmatchedReason::NoResult
        };
        debug!(key, %reason, "no candidates");
        return KeyResolution::Unmatched {
            reason,
            candidate_count: 0,
        };
    }

    let candidate_count = candidates.len();
    let Some(best) = find_best_match_with(cleaner, key, &candidates) else {
        return KeyResolution::Unmatched {
            reason: UnmatchedReason::Ambiguous,
            candidate_count,
        };
    };
    if !best.candidate.has_ingredient() {
        debug!(key, item_name = %best.candidate.item_name, "matched record has no ingredient");
        return KeyResolution::Unmatched {
            reason: UnmatchedReason::NoIngredient,
            candidate_count,
        };
    }
    KeyResolution::Matched {
        candidate: best.candidate.clone(),
        quality: best.quality,
    }
}

fn distinct_non_empty(keys: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    keys.iter()
        .map(String::as_str)
        .filter(|key| !key.is_empty() && seen.insert(*key))
        .collect()
}

/// Distinct cleaned keys without Hangul, first-seen order. These are the
/// rows a reviewer may want to translate.
pub fn english_keys(rows: &[InputRow], cleaner: &Cleaner) -> Vec<String> {
    let keys: Vec<String> = rows.iter().map(|row| cleaner.clean(&row.product)).collect();
    distinct_non_empty(&keys)
        .into_iter()
        .filter(|key| !contains_hangul(key))
        .map(str::to_string)
        .collect()
}

/// Processes `rows` against `supplier`, then aggregates over `pool`.
///
/// `pool` must be the same dataset snapshot the supplier searches.
pub fn reconcile<S, P>(
    rows: &[InputRow],
    supplier: &S,
    pool: &[CandidateRecord],
    translations: &Translations,
    options: &ReconcileOptions,
    on_progress: P,
) -> ReconcileReport
where
    S: CandidateSupplier + ?Sized,
    P: FnMut(usize, usize),
{
    let span = info_span!("reconcile", rows = rows.len(), pool = pool.len());
    let _guard = span.enter();

    let translations = translations.cleaned_with(&options.cleaner);
    let outcomes = process_cleaned(rows, supplier, &translations, options, on_progress);
    let report = build_final_rows_with(&outcomes, rows, pool, &options.name_separator);

    let distinct_keys: HashSet<&str> = outcomes
        .iter()
        .map(ProcessOutcome::cleaned_key)
        .filter(|key| !key.is_empty())
        .collect();
    let mut summary = RunSummary {
        rows: rows.len(),
        distinct_keys: distinct_keys.len(),
        translated_keys: distinct_keys
            .iter()
            .filter(|key| translations.get(key).is_some())
            .count(),
        groups: report.aggregates.len(),
        pool_records: report.aggregates.pool_records(),
        deduplicated_records: report.aggregates.deduplicated_records(),
        ..RunSummary::default()
    };
    for outcome in &outcomes {
        summary.record(outcome);
    }

    ReconcileReport {
        groups: report.aggregates.stats(),
        final_rows: report.final_rows,
        unmatched_rows: report.unmatched_rows,
        summary,
    }
}
