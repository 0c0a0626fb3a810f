use std::collections::HashSet;

use ndarray::ArrayView1;

use crate::{
    models::{InternalIndex, Recommendation},
    store::IndexMap,
};

/// Positions of `scores` from highest to lowest; equal scores keep ascending index order
pub fn argsort_descending(scores: ArrayView1<'_, f64>) -> Vec<InternalIndex> {
    let mut order: Vec<InternalIndex> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    order
}

/// Min-max scales `values` into [0, 1]
///
/// A constant input (including a single value) has no spread to scale by;
/// every value maps to 1.0.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let spread = max - min;

    if spread > 0.0 && spread.is_finite() {
        values.iter().map(|v| (v - min) / spread).collect()
    } else {
        vec![1.0; values.len()]
    }
}

/// Ranks every title that is neither a reference title nor excluded
///
/// Output is sorted by descending score and is not truncated; scores are
/// normalized over the returned candidates only.
pub fn rank(
    scores: ArrayView1<'_, f64>,
    inclusion: &[InternalIndex],
    exclusion: &[InternalIndex],
    index_map: &IndexMap,
) -> Vec<Recommendation> {
    let removed: HashSet<InternalIndex> = inclusion.iter().chain(exclusion.iter()).copied().collect();

    let kept: Vec<InternalIndex> = argsort_descending(scores)
        .into_iter()
        .filter(|index| !removed.contains(index))
        .collect();

    let kept_scores: Vec<f64> = kept.iter().map(|index| scores[*index]).collect();
    let normalized = normalize(&kept_scores);

    kept.iter()
        .zip(normalized)
        .filter_map(|(index, score)| {
            index_map
                .external(*index)
                .map(|id| Recommendation { id, score })
        })
        .collect()
}
