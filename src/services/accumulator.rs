use std::ops::Range;

use half::f16;
use ndarray::{Array1, ArrayView1, ArrayView2, Axis};

use crate::{
    config::{AccumulationPrecision, ChunkingStrategy},
    error::{RecommenderError, RecommenderResult},
    models::InternalIndex,
    services::kernel::Kernel,
};

/// One accumulated score per catalog title
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    values: Array1<f64>,
    precision: AccumulationPrecision,
}

impl ScoreVector {
    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn precision(&self) -> AccumulationPrecision {
        self.precision
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Array1<f64> {
        self.values
    }
}

/// Running totals, stored in the configured precision
enum ScoreBuffer {
    Half(Vec<f16>),
    Single(Vec<f32>),
    Double(Vec<f64>),
}

impl ScoreBuffer {
    fn zeros(precision: AccumulationPrecision, len: usize) -> Self {
        match precision {
            AccumulationPrecision::Half => ScoreBuffer::Half(vec![f16::ZERO; len]),
            AccumulationPrecision::Single => ScoreBuffer::Single(vec![0.0; len]),
            AccumulationPrecision::Double => ScoreBuffer::Double(vec![0.0; len]),
        }
    }

    fn add(&mut self, contribution: ArrayView1<'_, f64>) {
        match self {
            ScoreBuffer::Half(totals) => {
                for (total, value) in totals.iter_mut().zip(contribution.iter()) {
                    *total = f16::from_f64(total.to_f64() + value);
                }
            }
            ScoreBuffer::Single(totals) => {
                for (total, value) in totals.iter_mut().zip(contribution.iter()) {
                    *total += *value as f32;
                }
            }
            ScoreBuffer::Double(totals) => {
                for (total, value) in totals.iter_mut().zip(contribution.iter()) {
                    *total += value;
                }
            }
        }
    }

    fn into_values(self) -> Array1<f64> {
        match self {
            ScoreBuffer::Half(totals) => totals.into_iter().map(f16::to_f64).collect(),
            ScoreBuffer::Single(totals) => totals.into_iter().map(f64::from).collect(),
            ScoreBuffer::Double(totals) => Array1::from(totals),
        }
    }
}

/// Scores the whole catalog against a weighted reference set, chunk by chunk
///
/// Only one `[chunk x n]` similarity block is alive at a time, so peak memory is
/// bounded by the chunk size rather than by the size of the reference set.
#[derive(Debug, Clone)]
pub struct ChunkedAccumulator {
    kernel: Kernel,
    chunk_size: usize,
    chunking: ChunkingStrategy,
    precision: AccumulationPrecision,
}

impl ChunkedAccumulator {
    pub fn new(
        kernel: Kernel,
        chunk_size: usize,
        chunking: ChunkingStrategy,
        precision: AccumulationPrecision,
    ) -> RecommenderResult<Self> {
        if chunk_size == 0 {
            return Err(RecommenderError::InvalidConfiguration(
                "chunk_size must be positive".to_string(),
            ));
        }

        Ok(Self {
            kernel,
            chunk_size,
            chunking,
            precision,
        })
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn precision(&self) -> AccumulationPrecision {
        self.precision
    }

    /// Partitions `0..len` into contiguous chunks covering every position
    pub fn chunk_ranges(&self, len: usize) -> Vec<Range<usize>> {
        if len == 0 {
            return Vec::new();
        }

        let size = self.chunk_size;
        let count = match self.chunking {
            ChunkingStrategy::Ceiling => len.div_ceil(size),
            ChunkingStrategy::Rounded => ((len as f64 / size as f64).round_ties_even() as usize).max(1),
        };

        (0..count)
            .map(|chunk| {
                let start = (chunk * size).min(len);
                let end = if chunk + 1 == count {
                    len
                } else {
                    ((chunk + 1) * size).min(len)
                };
                start..end
            })
            .collect()
    }

    /// Weighted sum of kernel rows over the reference set, divided by `total_weight`
    ///
    /// `weights[i]` belongs to `inclusion[i]`. Kernel values and each chunk's
    /// contribution are rounded to the configured precision before they are added
    /// to the running totals; with half precision this can reorder near-equal
    /// scores. A non-positive `total_weight` leaves the sums undivided.
    pub fn accumulate(
        &self,
        matrix: ArrayView2<'_, f64>,
        inclusion: &[InternalIndex],
        weights: &[f64],
        total_weight: f64,
    ) -> RecommenderResult<ScoreVector> {
        if inclusion.len() != weights.len() {
            return Err(RecommenderError::InvalidConfiguration(format!(
                "{} reference titles but {} weights",
                inclusion.len(),
                weights.len()
            )));
        }

        let n_titles = matrix.nrows();
        if let Some(index) = inclusion.iter().find(|index| **index >= n_titles) {
            return Err(RecommenderError::InvalidConfiguration(format!(
                "reference row {index} is outside a catalog of {n_titles} titles"
            )));
        }

        let divisor = if total_weight > 0.0 && total_weight.is_finite() {
            total_weight
        } else {
            tracing::debug!(total_weight, "Total weight is not positive; scores are left undivided");
            1.0
        };

        let ranges = self.chunk_ranges(inclusion.len());
        tracing::debug!(
            reference_titles = inclusion.len(),
            catalog_titles = n_titles,
            chunks = ranges.len(),
            chunk_size = self.chunk_size,
            precision = ?self.precision,
            method = %self.kernel.method(),
            "Accumulating similarity scores"
        );

        let mut buffer = ScoreBuffer::zeros(self.precision, n_titles);

        for range in ranges {
            let reference = matrix.select(Axis(0), &inclusion[range.clone()]);
            let chunk_weights = ArrayView1::from(&weights[range]);

            let mut similarity = self.kernel.compute(reference.view(), matrix);
            similarity.mapv_inplace(|value| self.precision.quantize(value));
            similarity *= &chunk_weights.insert_axis(Axis(1));

            let mut contribution = similarity.sum_axis(Axis(0));
            contribution.mapv_inplace(|value| self.precision.quantize(value / divisor));

            buffer.add(contribution.view());
        }

        Ok(ScoreVector {
            values: buffer.into_values(),
            precision: self.precision,
        })
    }
}
