use std::fmt;

use serde::{Deserialize, Serialize};

use crate::candidate::CandidateRecord;

/// How confidently a registry record was matched to a cleaned key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchQuality {
    /// Exact name match, or the partial English containment/prefix rule.
    Exact,
    /// No name rule applied; earliest-approved candidate of the whole result set.
    Fuzzy,
}

impl MatchQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Fuzzy => "FUZZY",
        }
    }
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed, row-scoped failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnmatchedReason {
    /// The supplier returned nothing, or the cleaned key was empty.
    NoResult,
    /// An English key returned nothing; translate-then-retry may help.
    NoResultEnglish,
    /// A record was selected but carries no ingredient text.
    NoIngredient,
    /// Candidates existed but no record could be selected.
    Ambiguous,
    /// The candidate supplier itself failed.
    SourceError,
}

impl UnmatchedReason {
    pub const ALL: [Self; 5] = [
        Self::NoResult,
        Self::NoResultEnglish,
        Self::NoIngredient,
        Self::Ambiguous,
        Self::SourceError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResult => "NO_RESULT",
            Self::NoResultEnglish => "NO_RESULT_ENGLISH",
            Self::NoIngredient => "NO_INGREDIENT",
            Self::Ambiguous => "AMBIGUOUS",
            Self::SourceError => "SOURCE_ERROR",
        }
    }
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-input-row processing outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProcessOutcome {
    Matched {
        product: String,
        cleaned_key: String,
        candidate: CandidateRecord,
        quality: MatchQuality,
    },
    Unmatched {
        product: String,
        cleaned_key: String,
        reason: UnmatchedReason,
        candidate_count: usize,
    },
}

impl ProcessOutcome {
    pub fn product(&self) -> &str {
        match self {
            Self::Matched { product, .. } | Self::Unmatched { product, .. } => product,
        }
    }

    pub fn cleaned_key(&self) -> &str {
        match self {
            Self::Matched { cleaned_key, .. } | Self::Unmatched { cleaned_key, .. } => cleaned_key,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    pub fn candidate(&self) -> Option<&CandidateRecord> {
        match self {
            Self::Matched { candidate, .. } => Some(candidate),
            Self::Unmatched { .. } => None,
        }
    }
}
