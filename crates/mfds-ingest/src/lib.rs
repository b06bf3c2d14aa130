#![deny(unsafe_code)]

//! File-backed collaborators of the reconciliation engine: the registry
//! snapshot with its local search, input rows, and confirmed translations.

pub mod dates;
pub mod error;
pub mod input;
pub mod registry;
mod search;

pub use dates::canonical_permit_date;
pub use error::{IngestError, Result};
pub use input::{read_input_rows, read_translations};
pub use registry::{LoadStats, Registry};
pub use search::strip_dosage_form;
