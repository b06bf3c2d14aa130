//! Input product lists and reviewer-confirmed translation files.

use std::path::Path;

use csv::ReaderBuilder;
use mfds_core::Translations;
use mfds_model::InputRow;
use tracing::{debug, info};

use crate::error::{IngestError, Result};

const PRODUCT_HEADERS: [&str; 4] = ["제품명", "product", "Product", "PRODUCT"];
const SEQUENCE_HEADERS: [&str; 4] = ["순번", "seq", "sequence", "sequenceTag"];

/// Reads input rows. The product column is the first known product header,
/// else the first column; the sequence column is optional. Rows with an empty
/// product are kept so every input line yields an output line.
pub fn read_input_rows(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, e))?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::csv(path, e))?
        .iter()
        .map(|h| h.trim_matches('\u{feff}').trim().to_string())
        .collect();
    if headers.is_empty() {
        return Err(IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: PRODUCT_HEADERS[0].to_string(),
        });
    }
    let find = |candidates: &[&str]| {
        candidates
            .iter()
            .find_map(|name| headers.iter().position(|h| h == *name))
    };
    let product_column = find(&PRODUCT_HEADERS[..]).unwrap_or(0);
    let sequence_column = find(&SEQUENCE_HEADERS[..]);
    debug!(
        product = %headers[product_column],
        sequence = sequence_column.map(|idx| headers[idx].as_str()),
        "input columns"
    );

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(path, e))?;
        let product = record.get(product_column).unwrap_or_default().trim();
        let mut row = InputRow::new(product);
        if let Some(tag) = sequence_column
            .and_then(|idx| record.get(idx))
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
        {
            row = row.with_sequence_tag(tag);
        }
        rows.push(row);
    }
    info!(path = %path.display(), rows = rows.len(), "input rows loaded");
    Ok(rows)
}

/// Reads `english,korean` pairs. There is no header row: a header line has
/// no Hangul on its Korean side, or a Korean key that is never looked up.
pub fn read_translations(path: &Path) -> Result<Translations> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::csv(path, e))?;

    let mut translations = Translations::new();
    let mut rejected = 0usize;
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::csv(path, e))?;
        let english = record.get(0).unwrap_or_default().trim_matches('\u{feff}');
        let korean = record.get(1).unwrap_or_default();
        if !translations.insert(english, korean) {
            rejected += 1;
        }
    }
    info!(
        path = %path.display(),
        translations = translations.len(),
        rejected,
        "translations loaded"
    );
    Ok(translations)
}
