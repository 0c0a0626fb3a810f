use std::collections::HashSet;
use std::time::Instant;

use uuid::Uuid;

use crate::{
    config::Config,
    error::{RecommenderError, RecommenderResult},
    models::{
        ExternalId, InternalIndex, Recommendation, RecommendationRequest, ReferenceSelection,
        ScaleRange, Weighting,
    },
    services::{
        accumulator::ChunkedAccumulator,
        clients::UserListClient,
        kernel::{Kernel, KernelParams},
        ranking,
    },
    store::FeatureStore,
};

/// Computes one recommendation
///
/// Everything the computation needs is resolved in [`Recommender::new`]:
/// configuration mistakes surface there, and [`Recommender::recommend`] consumes
/// the value so each instance runs exactly once. Nothing is shared between
/// requests apart from the read-only store.
#[derive(Debug)]
pub struct Recommender<'a> {
    store: &'a FeatureStore,
    request_id: Uuid,
    inclusion: Vec<InternalIndex>,
    exclusion: Vec<InternalIndex>,
    weights: Vec<f64>,
    total_weight: f64,
    columns: Vec<usize>,
    accumulator: ChunkedAccumulator,
}

impl<'a> Recommender<'a> {
    /// Resolves a request against the store and the user's lists
    ///
    /// `client` is only consulted for user-list requests and must be present for them.
    pub fn new(
        store: &'a FeatureStore,
        client: Option<&dyn UserListClient>,
        request: &RecommendationRequest,
        config: &Config,
    ) -> RecommenderResult<Self> {
        config.validate()?;

        let columns = resolve_columns(store, &request.feature_categories)?;

        let kernel = Kernel::resolve(
            request.similarity_method,
            KernelParams {
                gamma: config.rbf_gamma,
            },
        )?;
        let accumulator = ChunkedAccumulator::new(
            kernel,
            request.chunk_size.unwrap_or(config.chunk_size),
            config.chunking,
            config.accumulation_precision,
        )?;

        let (inclusion, exclusion, weights, weighted) = match &request.reference {
            ReferenceSelection::Titles { ids } => {
                let inclusion = store.rows_for_external_ids(ids);
                let weights = vec![1.0; inclusion.len()];
                (inclusion, Vec::new(), weights, false)
            }
            ReferenceSelection::UserLists {
                included,
                excluded,
                weighting,
            } => {
                let client = client.ok_or_else(|| {
                    RecommenderError::InvalidConfiguration(
                        "a user-lists request needs a user list client".to_string(),
                    )
                })?;
                resolve_user_lists(store, client, included, excluded, weighting)?
            }
        };

        let total_weight = if weighted {
            weights.iter().sum()
        } else {
            inclusion.len() as f64
        };

        let recommender = Self {
            store,
            request_id: Uuid::new_v4(),
            inclusion,
            exclusion,
            weights,
            total_weight,
            columns,
            accumulator,
        };

        tracing::debug!(
            request_id = %recommender.request_id,
            included = recommender.inclusion.len(),
            excluded = recommender.exclusion.len(),
            columns = recommender.columns.len(),
            total_weight = recommender.total_weight,
            method = %request.similarity_method,
            "Recommendation request resolved"
        );

        Ok(recommender)
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn inclusion(&self) -> &[InternalIndex] {
        &self.inclusion
    }

    pub fn exclusion(&self) -> &[InternalIndex] {
        &self.exclusion
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Scores the catalog and returns every candidate, best first
    ///
    /// An empty reference set returns an empty list without touching the kernel.
    pub fn recommend(self) -> RecommenderResult<Vec<Recommendation>> {
        let span = tracing::info_span!(
            "recommendation",
            request_id = %self.request_id,
            method = %self.accumulator.kernel().method(),
        );
        let _enter = span.enter();

        if self.inclusion.is_empty() {
            tracing::info!("No reference titles, nothing to recommend from");
            return Ok(Vec::new());
        }

        let start = Instant::now();

        let matrix = self.store.feature_matrix(&self.columns);
        let scores = self.accumulator.accumulate(
            matrix.view(),
            &self.inclusion,
            &self.weights,
            self.total_weight,
        )?;

        let recommendations = ranking::rank(
            scores.values(),
            &self.inclusion,
            &self.exclusion,
            self.store.index_map(),
        );

        tracing::info!(
            candidates = recommendations.len(),
            processing_time_ms = start.elapsed().as_millis(),
            "Recommendation completed"
        );

        Ok(recommendations)
    }
}

/// Builds a recommender for `request` and runs it
pub fn recommend(
    store: &FeatureStore,
    client: Option<&dyn UserListClient>,
    request: &RecommendationRequest,
    config: &Config,
) -> RecommenderResult<Vec<Recommendation>> {
    Recommender::new(store, client, request, config)?.recommend()
}

fn resolve_columns(store: &FeatureStore, categories: &[String]) -> RecommenderResult<Vec<usize>> {
    if categories.is_empty() {
        return Err(RecommenderError::InvalidConfiguration(
            "at least one feature category is required".to_string(),
        ));
    }

    if let Some(unknown) = categories.iter().find(|c| !store.has_category(c)) {
        return Err(RecommenderError::UnknownCategory(unknown.clone()));
    }

    let columns = store.select_columns(categories);
    if columns.is_empty() {
        return Err(RecommenderError::InvalidConfiguration(
            "feature categories select no columns".to_string(),
        ));
    }

    Ok(columns)
}

type ResolvedReference = (Vec<InternalIndex>, Vec<InternalIndex>, Vec<f64>, bool);

fn resolve_user_lists(
    store: &FeatureStore,
    client: &dyn UserListClient,
    included: &[String],
    excluded: &[String],
    weighting: &Weighting,
) -> RecommenderResult<ResolvedReference> {
    if let Weighting::UserScores { scale: Some(range) } = weighting {
        validate_scale_range(range)?;
    }

    let entries = client.included_entries(included);

    let (ids, weights, weighted): (Vec<ExternalId>, Vec<f64>, bool) = match weighting {
        Weighting::Uniform => {
            let weights = vec![1.0; entries.len()];
            (entries, weights, false)
        }
        Weighting::UserScores { .. } => {
            let scores = client.scores(included);
            if scores.len() != entries.len() {
                return Err(RecommenderError::ClientData(format!(
                    "{} included entries but {} scores",
                    entries.len(),
                    scores.len()
                )));
            }
            if let Some(position) = scores.iter().position(|score| !score.is_finite()) {
                return Err(RecommenderError::ClientData(format!(
                    "score {} of entry {} is not a finite number",
                    scores[position], entries[position]
                )));
            }
            (entries, scores, true)
        }
    };

    // duplicates keep their first weight; unknown ids are dropped together with their weights
    let mut seen = HashSet::new();
    let requested = ids.len();
    let (inclusion, mut weights): (Vec<InternalIndex>, Vec<f64>) = ids
        .iter()
        .zip(weights)
        .filter(|(id, _)| seen.insert(**id))
        .filter_map(|(id, weight)| store.index_map().internal(*id).map(|index| (index, weight)))
        .unzip();

    if let Weighting::UserScores { scale: Some(range) } = weighting {
        scale_weights(&mut weights, range);
    }

    let excluded_ids = client.excluded_entries(excluded);
    let exclusion = store.map_external_to_internal(&excluded_ids);

    if inclusion.len() < requested || exclusion.len() < excluded_ids.len() {
        tracing::debug!(
            dropped_included = requested - inclusion.len(),
            dropped_excluded = excluded_ids.len() - exclusion.len(),
            "Dropped duplicate list entries and entries missing from the current snapshot"
        );
    }

    Ok((inclusion, exclusion, weights, weighted))
}

fn validate_scale_range(range: &ScaleRange) -> RecommenderResult<()> {
    if !range.min.is_finite() || !range.max.is_finite() || range.min >= range.max {
        return Err(RecommenderError::InvalidConfiguration(format!(
            "scale range must satisfy min < max, got ({}, {})",
            range.min, range.max
        )));
    }
    Ok(())
}

/// Min-max scales weights into `range`; identical weights all become `range.min`
fn scale_weights(weights: &mut [f64], range: &ScaleRange) {
    let (min, max) = weights
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), w| (lo.min(*w), hi.max(*w)));
    let spread = if max > min { max - min } else { 1.0 };

    for weight in weights.iter_mut() {
        *weight = (*weight - min) / spread * (range.max - range.min) + range.min;
    }
}
