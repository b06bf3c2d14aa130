//! Candidate supplier seam.

use mfds_model::{CandidateRecord, Result};

/// Returns the registry records that a search key may refer to.
///
/// Implementations may search a local snapshot or a remote registry; the
/// engine only needs the materialized list. An `Err` is recorded as a
/// `SOURCE_ERROR` row and never aborts the batch.
pub trait CandidateSupplier {
    fn search(&self, query: &str) -> Result<Vec<CandidateRecord>>;
}

impl<F> CandidateSupplier for F
where
    F: Fn(&str) -> Result<Vec<CandidateRecord>>,
{
    fn search(&self, query: &str) -> Result<Vec<CandidateRecord>> {
        self(query)
    }
}
