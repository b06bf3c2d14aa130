use mfds_normalization::Cleaner;

/// Separator used when listing every product name of an ingredient group.
pub const DEFAULT_NAME_SEPARATOR: &str = ", ";

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Cleaner applied to input rows and to registry names during matching.
    pub cleaner: Cleaner,

    /// Separator for the joined product-name column.
    pub name_separator: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            cleaner: Cleaner::default(),
            name_separator: DEFAULT_NAME_SEPARATOR.to_string(),
        }
    }
}

impl ReconcileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    #[must_use]
    pub fn with_name_separator(mut self, separator: impl Into<String>) -> Self {
        self.name_separator = separator.into();
        self
    }
}
