//! Registry snapshot: the full candidate pool, loaded once per run.

use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord};
use mfds_model::CandidateRecord;
use sha2::Digest;
use tracing::{debug, info, info_span, warn};

use crate::dates::canonical_permit_date;
use crate::error::{IngestError, Result};

const ITEM_NAME: &str = "제품명";
const ITEM_NAME_ENG: &str = "제품영문명";
const INGREDIENT: &str = "주성분";
const INGREDIENT_ENG: &str = "주성분영문";
const PERMIT_DATE: &str = "허가일";
const PERMIT_NO: &str = "허가번호";
const ITEM_SEQ: &str = "품목기준코드";
const COMPANY_NAME: &str = "업체명";
const CANCEL_STATUS: &str = "취소/취하";

/// New-drug flag headers, in lookup order, before the `신약` substring fallback.
const NEW_DRUG_HEADERS: [&str; 4] = ["신약구분", "신약 구분", "NEW_DRUG", "newDrug"];
const NEW_DRUG_MARKER: &str = "신약";

const WITHDRAWN_STATUSES: [&str; 2] = ["취소", "취하"];

/// Row counts of one registry load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub rows: usize,
    pub loaded: usize,
    pub skipped_empty_name: usize,
    pub skipped_withdrawn: usize,
}

impl LoadStats {
    pub fn skipped(&self) -> usize {
        self.skipped_empty_name + self.skipped_withdrawn
    }
}

/// Uppercased search fields, computed once per record.
#[derive(Debug, Clone)]
pub(crate) struct SearchText {
    pub(crate) item_name: String,
    pub(crate) item_name_eng: String,
    pub(crate) ingredient: String,
    pub(crate) ingredient_eng: String,
}

impl SearchText {
    fn new(record: &CandidateRecord) -> Self {
        Self {
            item_name: record.item_name.to_uppercase(),
            item_name_eng: record.item_name_eng.to_uppercase(),
            ingredient: record.ingredient.to_uppercase(),
            ingredient_eng: record.ingredient_eng.to_uppercase(),
        }
    }
}

/// Immutable registry snapshot, owned by the caller and passed wherever the
/// candidate pool is needed.
#[derive(Debug, Clone)]
pub struct Registry {
    records: Vec<CandidateRecord>,
    pub(crate) search_text: Vec<SearchText>,
    source: Option<PathBuf>,
    fingerprint: String,
    stats: LoadStats,
    has_new_drug_column: bool,
}

impl Registry {
    /// Loads a registry CSV export with the MFDS spreadsheet headers.
    pub fn load(path: &Path) -> Result<Self> {
        let span = info_span!("load_registry", path = %path.display());
        let _guard = span.enter();
        let start = Instant::now();

        let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
        let registry = Self::from_csv_bytes(&bytes, path)?;

        info!(
            loaded = registry.stats.loaded,
            skipped = registry.stats.skipped(),
            new_drug_column = registry.has_new_drug_column,
            fingerprint = %registry.fingerprint,
            duration_ms = start.elapsed().as_millis(),
            "registry loaded"
        );
        Ok(registry)
    }

    /// Parses registry CSV bytes. `source` is only used for error reporting
    /// and provenance.
    pub fn from_csv_bytes(bytes: &[u8], source: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);
        let headers = reader
            .headers()
            .map_err(|e| IngestError::csv(source, e))?
            .clone();
        let columns = RegistryColumns::resolve(&headers, source)?;
        if columns.new_drug.is_none() {
            debug!("registry has no new-drug column; originals fall back to permit dates");
        }

        let mut stats = LoadStats::default();
        let mut records = Vec::new();
        for (index, row) in reader.records().enumerate() {
            let row = row.map_err(|e| IngestError::csv(source, e))?;
            stats.rows += 1;
            let item_name = field(&row, Some(columns.item_name));
            if item_name.is_empty() {
                stats.skipped_empty_name += 1;
                continue;
            }
            let status = field(&row, columns.cancel_status);
            if WITHDRAWN_STATUSES.contains(&status) {
                stats.skipped_withdrawn += 1;
                debug!(line = index + 2, item_name, status, "skipping withdrawn product");
                continue;
            }
            records.push(columns.record(&row, item_name));
        }
        if records.is_empty() {
            warn!(path = %source.display(), "registry contains no usable records");
        }

        let mut registry = Self::from_records(records);
        registry.source = Some(source.to_path_buf());
        registry.fingerprint = hex::encode(sha2::Sha256::digest(bytes));
        registry.stats = LoadStats {
            loaded: registry.records.len(),
            ..stats
        };
        registry.has_new_drug_column = columns.new_drug.is_some();
        Ok(registry)
    }

    /// Wraps an in-memory pool, e.g. one fetched from a remote registry.
    pub fn from_records(records: Vec<CandidateRecord>) -> Self {
        let search_text = records.iter().map(SearchText::new).collect();
        let has_new_drug_column = records.iter().any(|r| r.is_new_drug.is_some());
        Self {
            stats: LoadStats {
                rows: records.len(),
                loaded: records.len(),
                ..LoadStats::default()
            },
            records,
            search_text,
            source: None,
            fingerprint: String::new(),
            has_new_drug_column,
        }
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Hex SHA-256 of the loaded file, empty for in-memory pools.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn stats(&self) -> LoadStats {
        self.stats
    }

    pub fn has_new_drug_column(&self) -> bool {
        self.has_new_drug_column
    }
}

/// Column indices of the registry headers.
#[derive(Debug, Clone, Copy)]
struct RegistryColumns {
    item_name: usize,
    item_name_eng: Option<usize>,
    ingredient: Option<usize>,
    ingredient_eng: Option<usize>,
    permit_date: Option<usize>,
    permit_no: Option<usize>,
    item_seq: Option<usize>,
    company_name: Option<usize>,
    cancel_status: Option<usize>,
    new_drug: Option<usize>,
}

impl RegistryColumns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_matches('\u{feff}').trim())
            .collect();
        let find = |name: &str| names.iter().position(|h| *h == name);

        let item_name = find(ITEM_NAME).ok_or_else(|| IngestError::MissingColumn {
            path: path.to_path_buf(),
            column: ITEM_NAME.to_string(),
        })?;
        let new_drug = NEW_DRUG_HEADERS
            .iter()
            .find_map(|name| find(*name))
            .or_else(|| names.iter().position(|h| h.contains(NEW_DRUG_MARKER)));

        Ok(Self {
            item_name,
            item_name_eng: find(ITEM_NAME_ENG),
            ingredient: find(INGREDIENT),
            ingredient_eng: find(INGREDIENT_ENG),
            permit_date: find(PERMIT_DATE),
            permit_no: find(PERMIT_NO),
            item_seq: find(ITEM_SEQ),
            company_name: find(COMPANY_NAME),
            cancel_status: find(CANCEL_STATUS),
            new_drug,
        })
    }

    fn record(&self, row: &StringRecord, item_name: &str) -> CandidateRecord {
        CandidateRecord {
            item_name: item_name.to_string(),
            item_name_eng: field(row, self.item_name_eng).to_string(),
            ingredient: field(row, self.ingredient).to_string(),
            ingredient_eng: field(row, self.ingredient_eng).to_string(),
            permit_date: canonical_permit_date(field(row, self.permit_date)),
            permit_no: field(row, self.permit_no).to_string(),
            item_seq: field(row, self.item_seq).to_string(),
            company_name: field(row, self.company_name).to_string(),
            is_new_drug: self
                .new_drug
                .map(|idx| field(row, Some(idx)).eq_ignore_ascii_case("Y")),
        }
    }
}

fn field(row: &StringRecord, index: Option<usize>) -> &str {
    index
        .and_then(|idx| row.get(idx))
        .map(str::trim)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "제품명,제품영문명,주성분,주성분영문,허가일,허가번호,품목기준코드,업체명,취소/취하";

    fn parse(body: &str) -> Registry {
        let csv = format!("{HEADER}\n{body}");
        Registry::from_csv_bytes(csv.as_bytes(), Path::new("registry.csv")).unwrap()
    }

    #[test]
    fn skips_empty_and_withdrawn_rows() {
        let registry = parse(
            "글리벡정,Glivec,이마티닙메실산염,Imatinib Mesylate,20010101,P1,S1,노바티스,\n\
             ,,,,,,,,\n\
             취소된정,,,,20000101,P2,S2,,취소\n\
             취하된정,,,,20000101,P3,S3,,취하\n",
        );
        assert_eq!(registry.len(), 1);
        let stats = registry.stats();
        assert_eq!(stats.rows, 4);
        assert_eq!(stats.skipped_empty_name, 1);
        assert_eq!(stats.skipped_withdrawn, 2);
        assert_eq!(registry.fingerprint().len(), 64);
    }

    #[test]
    fn missing_new_drug_column_means_unknown() {
        let registry = parse("글리벡정,,,,2001-01-01,P1,S1,,\n");
        let record = &registry.records()[0];
        assert_eq!(record.is_new_drug, None);
        assert_eq!(record.permit_date, "20010101");
        assert!(!registry.has_new_drug_column());
    }

    #[test]
    fn item_name_column_is_required() {
        let err = Registry::from_csv_bytes("이름,성분\n".as_bytes(), Path::new("bad.csv"))
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn { ref column, .. } if column == "제품명"));
    }
}
