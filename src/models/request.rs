use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecommenderError;

use super::ExternalId;

/// Kernel family used to compare reference titles with the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    /// Dot product between feature rows
    #[default]
    #[serde(alias = "linear_kernel")]
    Linear,
    /// `exp(-gamma * ||x - y||^2)`; meant for small reference sets such as a
    /// single-title query, since summing many RBF rows flattens the ranking
    #[serde(alias = "rbf_kernel")]
    Rbf,
}

impl Display for SimilarityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMethod::Linear => write!(f, "linear"),
            SimilarityMethod::Rbf => write!(f, "rbf"),
        }
    }
}

impl FromStr for SimilarityMethod {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "linear_kernel" => Ok(SimilarityMethod::Linear),
            "rbf" | "rbf_kernel" => Ok(SimilarityMethod::Rbf),
            _ => Err(RecommenderError::UnknownSimilarityMethod(s.to_string())),
        }
    }
}

/// Inclusive target range for min-max scaling of user scores
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self { min: 1.0, max: 10.0 }
    }
}

/// How included list entries are weighted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Weighting {
    /// Every reference title has weight 1
    #[default]
    Uniform,
    /// The user's score for each entry, optionally min-max scaled into a range
    UserScores {
        #[serde(default)]
        scale: Option<ScaleRange>,
    },
}

/// Where the reference titles come from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReferenceSelection {
    /// Explicitly chosen titles; nothing is excluded and weights are uniform
    Titles { ids: Vec<ExternalId> },
    /// Entries of the user's named lists
    UserLists {
        included: Vec<String>,
        #[serde(default)]
        excluded: Vec<String>,
        #[serde(default)]
        weighting: Weighting,
    },
}

/// One recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationRequest {
    /// Feature categories to compare on (e.g. "genres", "studios")
    pub feature_categories: Vec<String>,
    pub reference: ReferenceSelection,
    #[serde(default)]
    pub similarity_method: SimilarityMethod,
    /// Overrides the configured chunk size for this request
    #[serde(default)]
    pub chunk_size: Option<usize>,
}

impl RecommendationRequest {
    /// Creates a request seeded by explicitly chosen titles
    pub fn by_titles<C, S>(feature_categories: C, ids: Vec<ExternalId>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_categories: feature_categories.into_iter().map(Into::into).collect(),
            reference: ReferenceSelection::Titles { ids },
            similarity_method: SimilarityMethod::default(),
            chunk_size: None,
        }
    }

    /// Creates an unweighted request seeded by the user's lists
    pub fn by_user_lists<C, S>(feature_categories: C, included: Vec<String>, excluded: Vec<String>) -> Self
    where
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feature_categories: feature_categories.into_iter().map(Into::into).collect(),
            reference: ReferenceSelection::UserLists {
                included,
                excluded,
                weighting: Weighting::Uniform,
            },
            similarity_method: SimilarityMethod::default(),
            chunk_size: None,
        }
    }

    pub fn with_similarity_method(mut self, method: SimilarityMethod) -> Self {
        self.similarity_method = method;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    /// Sets the weighting of a user-lists request; explicit-title requests are always uniform
    pub fn with_weighting(mut self, new_weighting: Weighting) -> Self {
        if let ReferenceSelection::UserLists { weighting, .. } = &mut self.reference {
            *weighting = new_weighting;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("linear", SimilarityMethod::Linear)]
    #[case("linear_kernel", SimilarityMethod::Linear)]
    #[case("RBF", SimilarityMethod::Rbf)]
    #[case(" rbf_kernel ", SimilarityMethod::Rbf)]
    fn test_similarity_method_from_str(#[case] name: &str, #[case] expected: SimilarityMethod) {
        assert_eq!(name.parse::<SimilarityMethod>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_similarity_method() {
        let err = "cosine".parse::<SimilarityMethod>().unwrap_err();
        assert!(matches!(err, RecommenderError::UnknownSimilarityMethod(name) if name == "cosine"));
    }

    #[test]
    fn test_request_deserialization_user_lists() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{
                "feature_categories": ["genres", "studios"],
                "reference": {
                    "mode": "user_lists",
                    "included": ["Completed"],
                    "excluded": ["Dropped"],
                    "weighting": {"kind": "user_scores", "scale": {"min": 1.0, "max": 10.0}}
                },
                "similarity_method": "rbf_kernel",
                "chunk_size": 500
            }"#,
        )
        .unwrap();

        assert_eq!(request.similarity_method, SimilarityMethod::Rbf);
        assert_eq!(request.chunk_size, Some(500));
        assert_eq!(
            request.reference,
            ReferenceSelection::UserLists {
                included: vec!["Completed".to_string()],
                excluded: vec!["Dropped".to_string()],
                weighting: Weighting::UserScores {
                    scale: Some(ScaleRange { min: 1.0, max: 10.0 })
                },
            }
        );
    }

    #[test]
    fn test_request_deserialization_titles_defaults() {
        let request: RecommendationRequest = serde_json::from_str(
            r#"{"feature_categories": ["tags"], "reference": {"mode": "titles", "ids": [1, 2]}}"#,
        )
        .unwrap();

        assert_eq!(request.similarity_method, SimilarityMethod::Linear);
        assert_eq!(request.chunk_size, None);
        assert_eq!(request.reference, ReferenceSelection::Titles { ids: vec![1, 2] });
    }

    #[test]
    fn test_unknown_method_rejected_by_serde() {
        let result = serde_json::from_str::<RecommendationRequest>(
            r#"{"feature_categories": ["tags"], "reference": {"mode": "titles", "ids": []}, "similarity_method": "cosine"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_with_weighting_ignored_for_titles() {
        let request = RecommendationRequest::by_titles(["genres"], vec![1])
            .with_weighting(Weighting::UserScores { scale: None });
        assert_eq!(request.reference, ReferenceSelection::Titles { ids: vec![1] });
    }
}
