//! Reconciliation engine: matching, ingredient aggregation, and result building.
//!
//! Every entry point is a synchronous computation over caller-supplied
//! collections. The candidate pool is borrowed read-only for the duration of
//! a call and nothing is cached between calls.

pub mod aggregate;
pub mod matcher;
pub mod options;
pub mod pipeline;
pub mod results;
pub mod supplier;
pub mod translations;

pub use aggregate::{Aggregates, GroupSummary, compute_aggregates, deduplicate};
pub use matcher::{BestMatch, find_best_match, find_best_match_with};
pub use options::{DEFAULT_NAME_SEPARATOR, ReconcileOptions};
pub use pipeline::{ReconcileReport, RunSummary, english_keys, process_rows, reconcile};
pub use results::{FinalReport, build_final_rows, build_final_rows_with};
pub use supplier::CandidateSupplier;
pub use translations::Translations;
