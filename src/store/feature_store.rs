use std::collections::HashSet;

use chrono::{DateTime, Utc};
use ndarray::{Array2, ArrayView2, Axis};

use crate::{
    error::{RecommenderError, RecommenderResult},
    models::{
        ColumnMetadata, ExternalId, InternalIndex, Recommendation, RecommendedTitle, TitleInfo,
        TitleLanguage,
    },
    store::{FeatureSnapshot, IndexMap},
};

/// Read-only, in-memory feature tables for one snapshot
///
/// Never mutated after construction, so a shared reference can serve any
/// number of concurrent requests. A data refresh builds a new store instead
/// (see [`crate::store::StoreHandle`]).
#[derive(Debug)]
pub struct FeatureStore {
    matrix: Array2<f64>,
    metadata: Vec<ColumnMetadata>,
    info: Vec<TitleInfo>,
    index_map: IndexMap,
    loaded_at: DateTime<Utc>,
}

impl FeatureStore {
    /// Builds a store from a snapshot, checking its shape contract
    pub fn from_snapshot(snapshot: FeatureSnapshot) -> RecommenderResult<Self> {
        let FeatureSnapshot {
            info,
            columns,
            rows,
        } = snapshot;

        if rows.len() != info.len() {
            return Err(RecommenderError::InvalidSnapshot(format!(
                "{} feature rows but {} info rows",
                rows.len(),
                info.len()
            )));
        }

        let n_features = columns.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_features) {
            return Err(RecommenderError::InvalidSnapshot(format!(
                "row {row} has {} values, expected {n_features}",
                values.len()
            )));
        }

        if let Some(row) = rows.iter().position(|r| r.iter().any(|v| !v.is_finite())) {
            return Err(RecommenderError::InvalidSnapshot(format!(
                "row {row} contains a non-finite value"
            )));
        }

        let index_map = IndexMap::from_ids(info.iter().map(|title| title.id))?;
        let n_titles = rows.len();
        let matrix = Array2::from_shape_vec((n_titles, n_features), rows.into_iter().flatten().collect())?;

        tracing::info!(
            titles = n_titles,
            features = n_features,
            "Feature store built from snapshot"
        );

        Ok(Self {
            matrix,
            metadata: columns,
            info,
            index_map,
            loaded_at: Utc::now(),
        })
    }

    pub fn n_titles(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    pub fn metadata(&self) -> &[ColumnMetadata] {
        &self.metadata
    }

    pub fn info(&self) -> &[TitleInfo] {
        &self.info
    }

    pub fn index_map(&self) -> &IndexMap {
        &self.index_map
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Distinct categories in metadata order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.metadata
            .iter()
            .map(|column| column.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.metadata.iter().any(|column| column.is_in(category))
    }

    /// Resolves category names to the positions of every matching column
    ///
    /// Returns positions in ascending column order. Unknown categories match
    /// nothing; an empty result is the caller's to guard against.
    pub fn select_columns<S: AsRef<str>>(&self, categories: &[S]) -> Vec<usize> {
        let wanted: HashSet<&str> = categories.iter().map(AsRef::as_ref).collect();

        self.metadata
            .iter()
            .enumerate()
            .filter(|(_, column)| wanted.contains(column.category.as_str()))
            .map(|(position, _)| position)
            .collect()
    }

    /// Copies the given columns of every row, preserving row order
    pub fn feature_matrix(&self, columns: &[usize]) -> Array2<f64> {
        self.matrix.select(Axis(1), columns)
    }

    pub fn map_external_to_internal(&self, ids: &[ExternalId]) -> Vec<InternalIndex> {
        self.index_map.to_internal(ids)
    }

    pub fn map_internal_to_external(&self, indices: &[InternalIndex]) -> Vec<ExternalId> {
        self.index_map.to_external(indices)
    }

    /// Rows whose info id is one of `ids`, in row order
    ///
    /// Scans the info table directly instead of going through the index map.
    pub fn rows_for_external_ids(&self, ids: &[ExternalId]) -> Vec<InternalIndex> {
        let wanted: HashSet<ExternalId> = ids.iter().copied().collect();

        self.info
            .iter()
            .enumerate()
            .filter(|(_, title)| wanted.contains(&title.id))
            .map(|(row, _)| row)
            .collect()
    }

    pub fn info_for(&self, id: ExternalId) -> Option<&TitleInfo> {
        self.index_map
            .internal(id)
            .and_then(|row| self.info.get(row))
    }

    /// Titles sorted by descending popularity, ties in row order
    pub fn by_popularity(&self) -> Vec<&TitleInfo> {
        let mut titles: Vec<&TitleInfo> = self.info.iter().collect();
        titles.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        titles
    }

    /// Joins the first `limit` recommendations with their display metadata
    pub fn enrich(
        &self,
        recommendations: &[Recommendation],
        language: TitleLanguage,
        limit: usize,
    ) -> Vec<RecommendedTitle> {
        recommendations
            .iter()
            .filter_map(|recommendation| {
                self.info_for(recommendation.id).map(|info| RecommendedTitle {
                    id: info.id,
                    score: recommendation.score,
                    title: info.display_title(language).to_string(),
                    description: info.description.clone(),
                    cover_image: info.cover_image.clone(),
                    color: info.color.clone(),
                })
            })
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnType;

    fn title(id: ExternalId, popularity: u64) -> TitleInfo {
        TitleInfo {
            id,
            romaji: format!("Title {id}"),
            english: None,
            native: None,
            description: None,
            cover_image: None,
            color: None,
            popularity,
        }
    }

    fn snapshot() -> FeatureSnapshot {
        FeatureSnapshot {
            info: vec![title(101, 10), title(102, 50), title(103, 50)],
            columns: vec![
                ColumnMetadata::new("genres_Action", "genres", ColumnType::Binary),
                ColumnMetadata::new("studios_Bones", "studios", ColumnType::Binary),
                ColumnMetadata::new("genres_Drama", "genres", ColumnType::Binary),
                ColumnMetadata::new("duration", "duration", ColumnType::Continuous),
            ],
            rows: vec![
                vec![1.0, 0.0, 1.0, 0.25],
                vec![0.0, 1.0, 0.0, 0.5],
                vec![1.0, 1.0, 0.0, 1.0],
            ],
        }
    }

    #[test]
    fn test_from_snapshot() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        assert_eq!(store.n_titles(), 3);
        assert_eq!(store.n_features(), 4);
        assert_eq!(store.matrix()[[2, 3]], 1.0);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let mut snapshot = snapshot();
        snapshot.rows[1].pop();
        let result = FeatureStore::from_snapshot(snapshot);
        assert!(matches!(result, Err(RecommenderError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_row_info_mismatch_rejected() {
        let mut snapshot = snapshot();
        snapshot.info.pop();
        assert!(FeatureStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut snapshot = snapshot();
        snapshot.rows[0][3] = f64::NAN;
        assert!(FeatureStore::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_select_columns_by_category() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        assert_eq!(store.select_columns(&["genres"]), vec![0, 2]);
        assert_eq!(store.select_columns(&["studios", "genres"]), vec![0, 1, 2]);
        assert!(store.select_columns(&["genres_Action"]).is_empty());
        assert!(store.select_columns::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_feature_matrix_keeps_row_order() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        let matrix = store.feature_matrix(&[0, 2]);
        assert_eq!(matrix.dim(), (3, 2));
        assert_eq!(matrix.row(0).to_vec(), vec![1.0, 1.0]);
        assert_eq!(matrix.row(2).to_vec(), vec![1.0, 0.0]);
    }

    #[test]
    fn test_categories() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        assert_eq!(store.categories(), vec!["genres", "studios", "duration"]);
        assert!(store.has_category("duration"));
        assert!(!store.has_category("tags"));
    }

    #[test]
    fn test_rows_for_external_ids() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        assert_eq!(store.rows_for_external_ids(&[103, 999, 101]), vec![0, 2]);
        assert!(store.rows_for_external_ids(&[]).is_empty());
    }

    #[test]
    fn test_by_popularity() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        let ids: Vec<ExternalId> = store.by_popularity().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![102, 103, 101]);
    }

    #[test]
    fn test_enrich() {
        let store = FeatureStore::from_snapshot(snapshot()).unwrap();
        let recommendations = vec![
            Recommendation { id: 103, score: 1.0 },
            Recommendation { id: 999, score: 0.7 },
            Recommendation { id: 101, score: 0.5 },
            Recommendation { id: 102, score: 0.0 },
        ];

        let enriched = store.enrich(&recommendations, TitleLanguage::English, 2);
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].title, "Title 103");
        assert_eq!(enriched[1].id, 101);
        assert_eq!(enriched[1].score, 0.5);
    }
}
