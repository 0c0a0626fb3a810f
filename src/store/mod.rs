pub mod feature_store;
pub mod handle;
pub mod index_map;
pub mod snapshot;

pub use feature_store::FeatureStore;
pub use handle::StoreHandle;
pub use index_map::IndexMap;
pub use snapshot::{FeatureSnapshot, SnapshotLoader};
