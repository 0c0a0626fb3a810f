use serde::{Deserialize, Serialize};

/// Declared data type of an engineered feature column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// One-hot indicator (0 or 1)
    Binary,
    /// Scaled continuous value
    Continuous,
}

/// Maps one feature matrix column to its semantic category
///
/// Callers select features by category, e.g. `genres` resolves to every
/// `genres_*` one-hot column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnMetadata {
    /// Exact column name (e.g. "genres_Action")
    pub column_name: String,
    /// Semantic category (e.g. "genres")
    pub category: String,
    /// Declared data type
    pub dtype: ColumnType,
}

impl ColumnMetadata {
    pub fn new(column_name: impl Into<String>, category: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            column_name: column_name.into(),
            category: category.into(),
            dtype,
        }
    }

    /// Checks whether the column belongs to the given category
    pub fn is_in(&self, category: &str) -> bool {
        self.category == category
    }
}
