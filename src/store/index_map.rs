use std::collections::HashMap;

use crate::{
    error::{RecommenderError, RecommenderResult},
    models::{ExternalId, InternalIndex},
};

/// Bijection between external title ids and internal row positions
///
/// Built once at load time. Lookups of unknown ids or out-of-range rows are
/// dropped rather than reported: a user's history may reference titles that are
/// no longer part of the current snapshot.
#[derive(Debug, Clone, Default)]
pub struct IndexMap {
    positions: HashMap<ExternalId, InternalIndex>,
    ids: Vec<ExternalId>,
}

impl IndexMap {
    /// Builds the map from ids in row order; row `i` gets internal index `i`
    pub fn from_ids<I>(ids: I) -> RecommenderResult<Self>
    where
        I: IntoIterator<Item = ExternalId>,
    {
        let ids: Vec<ExternalId> = ids.into_iter().collect();
        let mut positions = HashMap::with_capacity(ids.len());

        for (index, id) in ids.iter().enumerate() {
            if let Some(previous) = positions.insert(*id, index) {
                return Err(RecommenderError::InvalidSnapshot(format!(
                    "external id {id} appears at rows {previous} and {index}"
                )));
            }
        }

        Ok(Self { positions, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn internal(&self, id: ExternalId) -> Option<InternalIndex> {
        self.positions.get(&id).copied()
    }

    pub fn external(&self, index: InternalIndex) -> Option<ExternalId> {
        self.ids.get(index).copied()
    }

    /// Maps external ids to internal indices, silently dropping unknown ids
    pub fn to_internal(&self, ids: &[ExternalId]) -> Vec<InternalIndex> {
        ids.iter().filter_map(|id| self.internal(*id)).collect()
    }

    /// Maps internal indices to external ids, silently dropping out-of-range rows
    pub fn to_external(&self, indices: &[InternalIndex]) -> Vec<ExternalId> {
        indices.iter().filter_map(|index| self.external(*index)).collect()
    }
}
