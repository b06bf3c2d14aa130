use thiserror::Error;

/// Failure reported by a candidate supplier while searching for a key.
#[derive(Debug, Error)]
pub enum SupplierError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("registry unavailable: {0}")]
    Unavailable(String),
    #[error("{0}")]
    Message(String),
}

pub type Result<T> = std::result::Result<T, SupplierError>;
