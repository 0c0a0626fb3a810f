use std::sync::{Arc, PoisonError, RwLock};

use crate::{
    error::RecommenderResult,
    store::{FeatureStore, SnapshotLoader},
};

/// Shared access to the current feature store
///
/// Readers take an `Arc` to the snapshot that is current when they ask and
/// keep using it for the whole request. A reload builds a complete new store
/// first and only then swaps the pointer, so a store is never observed half
/// loaded and readers never wait on a rebuild.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<RwLock<Arc<FeatureStore>>>,
}

impl StoreHandle {
    pub fn new(store: FeatureStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(store))),
        }
    }

    /// Builds the initial store from a loader
    pub fn load(loader: &dyn SnapshotLoader) -> RecommenderResult<Self> {
        let store = FeatureStore::from_snapshot(loader.load()?)?;
        tracing::info!(loader = loader.name(), titles = store.n_titles(), "Feature store loaded");
        Ok(Self::new(store))
    }

    /// The store current at the time of the call
    pub fn current(&self) -> Arc<FeatureStore> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Replaces the current store, returning the previous one
    pub fn replace(&self, store: FeatureStore) -> Arc<FeatureStore> {
        let next = Arc::new(store);
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, next)
    }

    /// Loads a fresh snapshot and swaps it in
    ///
    /// On failure the current store stays in place.
    pub fn reload(&self, loader: &dyn SnapshotLoader) -> RecommenderResult<()> {
        let store = match loader.load().and_then(FeatureStore::from_snapshot) {
            Ok(store) => store,
            Err(e) => {
                tracing::error!(loader = loader.name(), error = %e, "Feature store reload failed");
                return Err(e);
            }
        };

        let titles = store.n_titles();
        let previous = self.replace(store);

        tracing::info!(
            loader = loader.name(),
            titles,
            previous_titles = previous.n_titles(),
            previous_loaded_at = %previous.loaded_at(),
            "Feature store reloaded"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::RecommenderError,
        models::{ColumnMetadata, ColumnType, TitleInfo},
        store::FeatureSnapshot,
    };

    fn snapshot(ids: &[u64]) -> FeatureSnapshot {
        FeatureSnapshot {
            info: ids
                .iter()
                .map(|id| TitleInfo {
                    id: *id,
                    romaji: format!("Title {id}"),
                    english: None,
                    native: None,
                    description: None,
                    cover_image: None,
                    color: None,
                    popularity: 0,
                })
                .collect(),
            columns: vec![ColumnMetadata::new("genres_Action", "genres", ColumnType::Binary)],
            rows: ids.iter().map(|_| vec![1.0]).collect(),
        }
    }

    struct FailingLoader;

    impl SnapshotLoader for FailingLoader {
        fn load(&self) -> RecommenderResult<FeatureSnapshot> {
            Err(RecommenderError::SnapshotLoad("storage unavailable".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn test_reload_swaps_store() {
        let handle = StoreHandle::load(&snapshot(&[1, 2])).unwrap();
        let before = handle.current();

        handle.reload(&snapshot(&[1, 2, 3])).unwrap();

        // readers holding the old snapshot are unaffected
        assert_eq!(before.n_titles(), 2);
        assert_eq!(handle.current().n_titles(), 3);
    }

    #[test]
    fn test_failed_reload_keeps_current_store() {
        let handle = StoreHandle::load(&snapshot(&[1, 2])).unwrap();

        let result = handle.reload(&FailingLoader);
        assert!(matches!(result, Err(RecommenderError::SnapshotLoad(_))));
        assert_eq!(handle.current().n_titles(), 2);

        let result = handle.reload(&snapshot(&[1, 1]));
        assert!(matches!(result, Err(RecommenderError::InvalidSnapshot(_))));
        assert_eq!(handle.current().n_titles(), 2);
    }

    #[test]
    fn test_clones_share_the_store() {
        let handle = StoreHandle::load(&snapshot(&[1])).unwrap();
        let other = handle.clone();

        handle.reload(&snapshot(&[1, 2])).unwrap();
        assert_eq!(other.current().n_titles(), 2);
    }

    #[test]
    fn test_concurrent_readers_during_reload() {
        let handle = StoreHandle::load(&snapshot(&[1, 2])).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let reader = handle.clone();
                scope.spawn(move || {
                    for _ in 0..100 {
                        let n = reader.current().n_titles();
                        assert!(n == 2 || n == 3);
                    }
                });
            }
            handle.reload(&snapshot(&[1, 2, 3])).unwrap();
        });

        assert_eq!(handle.current().n_titles(), 3);
    }
}
