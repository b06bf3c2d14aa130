pub mod candidate;
pub mod error;
pub mod outcome;
pub mod report;

pub use candidate::{CandidateRecord, DedupKey, InputRow, UNKNOWN_PERMIT_DATE};
pub use error::{Result, SupplierError};
pub use outcome::{MatchQuality, ProcessOutcome, UnmatchedReason};
pub use report::{FinalRow, GroupStats, OriginalFlag, UnmatchedRow};
