use serde::{Deserialize, Serialize};

use crate::{
    error::RecommenderResult,
    models::{ColumnMetadata, TitleInfo},
};

/// Persisted state the Feature Store is built from
///
/// `info[i]` describes the title in `rows[i]`; the row position becomes the
/// title's internal index. `columns[j]` describes column `j` of every row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FeatureSnapshot {
    pub info: Vec<TitleInfo>,
    pub columns: Vec<ColumnMetadata>,
    pub rows: Vec<Vec<f64>>,
}

/// Storage collaborator that produces snapshots
///
/// Implementations own the persisted format; the engine only needs stable row
/// order, a category per column and one external id per row.
pub trait SnapshotLoader: Send + Sync {
    fn load(&self) -> RecommenderResult<FeatureSnapshot>;

    /// Loader name for logging
    fn name(&self) -> &'static str;
}

/// A snapshot already held in memory loads as a copy of itself
impl SnapshotLoader for FeatureSnapshot {
    fn load(&self) -> RecommenderResult<FeatureSnapshot> {
        Ok(self.clone())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
