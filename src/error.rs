/// Recommendation engine errors
///
/// Only configuration and load-time contract violations are errors. Data sparsity
/// (empty inclusion sets, ids missing from the current snapshot) resolves to an
/// empty or degenerate result instead.
#[derive(thiserror::Error, Debug)]
pub enum RecommenderError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown similarity method: {0}")]
    UnknownSimilarityMethod(String),

    #[error("Unknown feature category: {0}")]
    UnknownCategory(String),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Client data error: {0}")]
    ClientData(String),

    #[error("Snapshot load error: {0}")]
    SnapshotLoad(String),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl RecommenderError {
    /// Configuration errors are programmer or operator mistakes and must reach the caller
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RecommenderError::InvalidConfiguration(_)
                | RecommenderError::UnknownSimilarityMethod(_)
                | RecommenderError::UnknownCategory(_)
        )
    }
}

pub type RecommenderResult<T> = Result<T, RecommenderError>;
