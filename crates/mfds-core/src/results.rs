//! Joins per-row outcomes with ingredient statistics into the output tables.

use mfds_model::{
    CandidateRecord, FinalRow, InputRow, OriginalFlag, ProcessOutcome, UnmatchedReason,
    UnmatchedRow,
};
use mfds_normalization::strip_dosage;
use tracing::{info, info_span};

use crate::aggregate::{Aggregates, compute_aggregates};
use crate::options::DEFAULT_NAME_SEPARATOR;

/// Output of the result builder.
#[derive(Debug, Clone)]
pub struct FinalReport {
    /// Exactly one row per input row, in input order.
    pub final_rows: Vec<FinalRow>,
    pub unmatched_rows: Vec<UnmatchedRow>,
    pub aggregates: Aggregates,
}

/// Builds the final and unmatched tables with the default name separator.
pub fn build_final_rows(
    outcomes: &[ProcessOutcome],
    input_rows: &[InputRow],
    pool: &[CandidateRecord],
) -> FinalReport {
    build_final_rows_with(outcomes, input_rows, pool, DEFAULT_NAME_SEPARATOR)
}

/// Builds the final and unmatched tables.
///
/// Outcomes pair with input rows by position. An input row without an
/// outcome is reported as `NO_RESULT`; surplus outcomes are ignored.
pub fn build_final_rows_with(
    outcomes: &[ProcessOutcome],
    input_rows: &[InputRow],
    pool: &[CandidateRecord],
    name_separator: &str,
) -> FinalReport {
    let span = info_span!("build_final_rows", rows = input_rows.len());
    let _guard = span.enter();

    let aggregates = compute_aggregates(outcomes, pool);
    let mut final_rows = Vec::with_capacity(input_rows.len());
    let mut unmatched_rows = Vec::new();

    for (index, row) in input_rows.iter().enumerate() {
        match outcomes.get(index) {
            Some(ProcessOutcome::Matched {
                candidate, quality, ..
            }) => {
                let mut final_row = matched_row(row, candidate, &aggregates, name_separator);
                final_row.match_quality = Some(*quality);
                final_rows.push(final_row);
            }
            Some(ProcessOutcome::Unmatched {
                cleaned_key,
                reason,
                candidate_count,
                ..
            }) => {
                unmatched_rows.push(UnmatchedRow {
                    product: row.product.clone(),
                    cleaned_key: cleaned_key.clone(),
                    reason: *reason,
                    candidate_count: *candidate_count,
                    sequence_tag: row.sequence_tag.clone(),
                });
                final_rows.push(empty_row(row));
            }
            None => {
                unmatched_rows.push(UnmatchedRow {
                    product: row.product.clone(),
                    cleaned_key: String::new(),
                    reason: UnmatchedReason::NoResult,
                    candidate_count: 0,
                    sequence_tag: row.sequence_tag.clone(),
                });
                final_rows.push(empty_row(row));
            }
        }
    }

    info!(
        final_rows = final_rows.len(),
        unmatched_rows = unmatched_rows.len(),
        groups = aggregates.len(),
        "final rows built"
    );

    FinalReport {
        final_rows,
        unmatched_rows,
        aggregates,
    }
}

fn matched_row(
    row: &InputRow,
    candidate: &CandidateRecord,
    aggregates: &Aggregates,
    name_separator: &str,
) -> FinalRow {
    let (original_flag, generic_count, item_name) = match aggregates.group_for(candidate) {
        Some(group) => {
            let flag = if group.is_original(&strip_dosage(&candidate.item_name)) {
                OriginalFlag::Original
            } else {
                OriginalFlag::NotOriginal
            };
            (flag, group.generic_count, group.joined_names(name_separator))
        }
        None => (OriginalFlag::NotOriginal, 0, candidate.item_name.clone()),
    };
    FinalRow {
        product: row.product.clone(),
        original_flag,
        generic_count,
        ingredient: candidate.ingredient.clone(),
        ingredient_eng: candidate.ingredient_eng.clone(),
        item_name,
        sequence_tag: row.sequence_tag.clone(),
        match_quality: None,
    }
}

fn empty_row(row: &InputRow) -> FinalRow {
    FinalRow {
        product: row.product.clone(),
        original_flag: OriginalFlag::NotOriginal,
        generic_count: 0,
        ingredient: String::new(),
        ingredient_eng: String::new(),
        item_name: String::new(),
        sequence_tag: row.sequence_tag.clone(),
        match_quality: None,
    }
}
