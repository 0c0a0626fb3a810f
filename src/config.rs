use anyhow::Context;
use serde::Deserialize;

use crate::error::{RecommenderError, RecommenderResult};

/// Numeric type of the running score buffer
///
/// Half precision bounds memory for very large catalogs at the cost of
/// occasionally swapping the order of near-equal scores.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccumulationPrecision {
    #[default]
    Half,
    Single,
    Double,
}

impl AccumulationPrecision {
    /// Rounds a value to the nearest value representable in this precision
    pub fn quantize(self, value: f64) -> f64 {
        match self {
            AccumulationPrecision::Half => half::f16::from_f64(value).to_f64(),
            AccumulationPrecision::Single => value as f32 as f64,
            AccumulationPrecision::Double => value,
        }
    }
}

/// How the inclusion set is partitioned into chunks
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingStrategy {
    /// `ceil(n / chunk_size)` chunks of at most `chunk_size` rows
    #[default]
    Ceiling,
    /// `max(round(n / chunk_size), 1)` chunks, ties rounded to even; the last
    /// chunk takes whatever rows remain
    Rounded,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Engine configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Number of reference titles scored per kernel invocation
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Storage precision of the accumulated score vector
    #[serde(default)]
    pub accumulation_precision: AccumulationPrecision,

    /// Chunk-count policy
    #[serde(default)]
    pub chunking: ChunkingStrategy,

    /// RBF kernel gamma; `1 / n_features` when unset
    #[serde(default)]
    pub rbf_gamma: Option<f64>,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,
}

fn default_chunk_size() -> usize {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            accumulation_precision: AccumulationPrecision::default(),
            chunking: ChunkingStrategy::default(),
            rbf_gamma: None,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_iter(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_iter<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::from_iter::<_, Config>(vars).context("Failed to load config")?;
        config.validate().context("Invalid config")?;
        Ok(config)
    }

    pub fn validate(&self) -> RecommenderResult<()> {
        if self.chunk_size == 0 {
            return Err(RecommenderError::InvalidConfiguration(
                "chunk_size must be positive".to_string(),
            ));
        }

        if let Some(gamma) = self.rbf_gamma {
            if !gamma.is_finite() || gamma <= 0.0 {
                return Err(RecommenderError::InvalidConfiguration(format!(
                    "rbf_gamma must be a positive finite number, got {gamma}"
                )));
            }
        }

        Ok(())
    }
}
