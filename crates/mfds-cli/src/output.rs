//! CSV and JSON writers for the final and unmatched tables.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use mfds_core::ReconcileReport;
use mfds_model::{FinalRow, MatchQuality, UnmatchedRow};
use serde::Serialize;

pub const FINAL_HEADERS: [&str; 8] = [
    "제품명",
    "오리지널",
    "제네릭 수",
    "성분명",
    "영문성분명",
    "MFDS 제품명",
    "순번",
    "매칭",
];

pub const UNMATCHED_HEADERS: [&str; 5] = ["제품명", "정제키", "사유", "후보 수", "순번"];

/// Output encoding of the written tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

pub fn write_final_csv<W: Write>(writer: W, rows: &[FinalRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(FINAL_HEADERS)?;
    for row in rows {
        let generic_count = row.generic_count.to_string();
        csv.write_record([
            row.product.as_str(),
            row.original_flag.as_str(),
            generic_count.as_str(),
            row.ingredient.as_str(),
            row.ingredient_eng.as_str(),
            row.item_name.as_str(),
            row.sequence_tag.as_deref().unwrap_or_default(),
            row.match_quality.map_or("", MatchQuality::as_str),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_unmatched_csv<W: Write>(writer: W, rows: &[UnmatchedRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(UNMATCHED_HEADERS)?;
    for row in rows {
        let candidate_count = row.candidate_count.to_string();
        csv.write_record([
            row.product.as_str(),
            row.cleaned_key.as_str(),
            row.reason.as_str(),
            candidate_count.as_str(),
            row.sequence_tag.as_deref().unwrap_or_default(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Writes the final table, or the whole report in JSON mode, to `path` or
/// stdout.
pub fn write_report(
    report: &ReconcileReport,
    format: OutputFormat,
    path: Option<&Path>,
) -> Result<()> {
    with_output(path, |writer| match format {
        OutputFormat::Csv => write_final_csv(writer, &report.final_rows),
        OutputFormat::Json => write_json(writer, report),
    })
}

pub fn write_unmatched(rows: &[UnmatchedRow], format: OutputFormat, path: &Path) -> Result<()> {
    with_output(Some(path), |writer| match format {
        OutputFormat::Csv => write_unmatched_csv(writer, rows),
        OutputFormat::Json => write_json(writer, rows),
    })
}

fn with_output<F>(path: Option<&Path>, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write(&mut writer).with_context(|| format!("write output: {}", path.display()))?;
            writer
                .flush()
                .with_context(|| format!("flush output: {}", path.display()))
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write(&mut writer).context("write output: stdout")
        }
    }
}
