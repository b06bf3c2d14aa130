use serde::{Deserialize, Serialize};

/// Sentinel permit date that sorts after every real `YYYYMMDD` date.
pub const UNKNOWN_PERMIT_DATE: &str = "99999999";

/// One entry of the MFDS product approval registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Registered (Korean) product name.
    pub item_name: String,
    /// Registered English product name, empty when unknown.
    #[serde(default)]
    pub item_name_eng: String,
    /// Korean active-ingredient text, may carry dosage and salt text.
    #[serde(default)]
    pub ingredient: String,
    /// English active-ingredient text, empty when unknown.
    #[serde(default)]
    pub ingredient_eng: String,
    /// Approval date in `YYYYMMDD` form, empty when unknown.
    #[serde(default)]
    pub permit_date: String,
    /// Approval number. Shared by dosage variants of one record family.
    #[serde(default)]
    pub permit_no: String,
    /// Item-level identity code, unique per registry entry when present.
    #[serde(default)]
    pub item_seq: String,
    #[serde(default)]
    pub company_name: String,
    /// Explicit innovator/new-drug classification, `None` when the registry has no flag.
    #[serde(default)]
    pub is_new_drug: Option<bool>,
}

/// Identity used to collapse duplicate registry rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DedupKey<'a> {
    ItemSeq(&'a str),
    PermitNo(&'a str),
}

impl CandidateRecord {
    /// Permit date for ordering, with unknown dates mapped to the sentinel.
    pub fn permit_date_or_sentinel(&self) -> &str {
        let date = self.permit_date.trim();
        if date.is_empty() {
            UNKNOWN_PERMIT_DATE
        } else {
            date
        }
    }

    /// `item_seq`, falling back to `permit_no`. `None` means the record can
    /// only be identified by its position in the pool.
    pub fn dedup_key(&self) -> Option<DedupKey<'_>> {
        let seq = self.item_seq.trim();
        if !seq.is_empty() {
            return Some(DedupKey::ItemSeq(seq));
        }
        let permit = self.permit_no.trim();
        if !permit.is_empty() {
            return Some(DedupKey::PermitNo(permit));
        }
        None
    }

    pub fn has_ingredient(&self) -> bool {
        !self.ingredient.trim().is_empty() || !self.ingredient_eng.trim().is_empty()
    }
}

/// A human-entered product name plus an opaque pass-through tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRow {
    pub product: String,
    #[serde(default)]
    pub sequence_tag: Option<String>,
}

impl InputRow {
    pub fn new(product: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            sequence_tag: None,
        }
    }

    #[must_use]
    pub fn with_sequence_tag(mut self, tag: impl Into<String>) -> Self {
        self.sequence_tag = Some(tag.into());
        self
    }
}
