use std::fmt;

use serde::{Deserialize, Serialize};

use crate::outcome::{MatchQuality, UnmatchedReason};

/// Aggregate statistics for one ingredient group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStats {
    pub generic_count: usize,
    /// Earliest permit date in the group, `99999999` when none is known.
    pub min_permit_date: String,
}

/// Whether a matched product is the original (innovator) of its group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OriginalFlag {
    #[serde(rename = "O")]
    Original,
    #[default]
    #[serde(rename = "X")]
    NotOriginal,
}

impl OriginalFlag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Original => "O",
            Self::NotOriginal => "X",
        }
    }
}

impl fmt::Display for OriginalFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One output row per input row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRow {
    pub product: String,
    pub original_flag: OriginalFlag,
    pub generic_count: usize,
    pub ingredient: String,
    pub ingredient_eng: String,
    /// Every distinct product name of the ingredient group, joined in first-seen order.
    pub item_name: String,
    pub sequence_tag: Option<String>,
    pub match_quality: Option<MatchQuality>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedRow {
    pub product: String,
    pub cleaned_key: String,
    pub reason: UnmatchedReason,
    pub candidate_count: usize,
    pub sequence_tag: Option<String>,
}
