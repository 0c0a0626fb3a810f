//! Content-based anime recommendations
//!
//! Titles are compared on precomputed feature vectors held in a read-only
//! [`FeatureStore`]. A request picks the feature categories and a set of
//! reference titles, either explicitly or from a user's lists; every other title
//! in the catalog is scored by its summed kernel similarity to the reference set
//! and returned best first.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use error::{RecommenderError, RecommenderResult};
pub use models::{Recommendation, RecommendationRequest, SimilarityMethod};
pub use services::{recommend, Recommender, UserListClient, UserLists};
pub use store::{FeatureStore, StoreHandle};
