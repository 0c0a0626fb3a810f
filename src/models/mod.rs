use serde::{Deserialize, Serialize};

pub mod feature;
pub mod request;
pub mod title;

pub use feature::{ColumnMetadata, ColumnType};
pub use request::{RecommendationRequest, ReferenceSelection, ScaleRange, SimilarityMethod, Weighting};
pub use title::{ExternalId, InternalIndex, TitleInfo, TitleLanguage};

/// One ranked recommendation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub id: ExternalId,
    /// Min-max normalized over the candidates actually returned, in [0, 1]
    pub score: f64,
}

/// A recommendation joined with its display metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedTitle {
    pub id: ExternalId,
    pub score: f64,
    pub title: String,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub color: Option<String>,
}

// ============================================================================
// Media List API Types
// ============================================================================

/// Raw media list collection of one user, as returned by the list API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMediaListCollection {
    #[serde(default)]
    pub lists: Vec<ApiMediaList>,
}

/// A named user list ("Completed", "Dropped", custom lists, ...)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMediaList {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<ApiMediaListEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMediaListEntry {
    pub media_id: ExternalId,
    /// Unscored entries are reported as 0
    #[serde(default)]
    pub score: f64,
}
