use std::collections::HashSet;

use crate::{
    models::{ApiMediaListCollection, ExternalId},
    services::clients::UserListClient,
};

/// List names a caller typically preselects as the reference set
///
/// Nothing falls back to these: an empty selection stays empty.
pub const DEFAULT_INCLUDED_LISTS: &[&str] = &["Completed"];

/// List names a caller typically preselects for exclusion
pub const DEFAULT_EXCLUDED_LISTS: &[&str] = &["Dropped", "Watching", "Rewatching", "Planning", "Paused"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ListEntry {
    pub id: ExternalId,
    pub score: f64,
}

/// A user's media lists, held in memory
///
/// Lists keep the order they were received in. When a title appears in several
/// selected lists, the first occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct UserLists {
    lists: Vec<(String, Vec<ListEntry>)>,
}

impl From<ApiMediaListCollection> for UserLists {
    fn from(collection: ApiMediaListCollection) -> Self {
        let lists = collection
            .lists
            .into_iter()
            .map(|list| {
                let entries = list
                    .entries
                    .into_iter()
                    .map(|entry| ListEntry {
                        id: entry.media_id,
                        score: entry.score,
                    })
                    .collect();
                (list.name, entries)
            })
            .collect();

        Self { lists }
    }
}

impl UserLists {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry to a list, creating the list if needed
    pub fn add_entry(&mut self, list: &str, id: ExternalId, score: f64) {
        let entry = ListEntry { id, score };
        if let Some((_, entries)) = self.lists.iter_mut().find(|(name, _)| name == list) {
            entries.push(entry);
        } else {
            self.lists.push((list.to_string(), vec![entry]));
        }
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.lists.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Unique entries across the named lists, in first-seen order
    pub fn entries(&self, lists: &[String]) -> Vec<ListEntry> {
        let wanted: HashSet<&str> = lists.iter().map(String::as_str).collect();
        let mut seen = HashSet::new();

        self.lists
            .iter()
            .filter(|(name, _)| wanted.contains(name.as_str()))
            .flat_map(|(_, entries)| entries.iter().copied())
            .filter(|entry| seen.insert(entry.id))
            .collect()
    }
}

impl UserListClient for UserLists {
    fn included_entries(&self, lists: &[String]) -> Vec<ExternalId> {
        self.entries(lists).into_iter().map(|entry| entry.id).collect()
    }

    fn excluded_entries(&self, lists: &[String]) -> Vec<ExternalId> {
        self.entries(lists).into_iter().map(|entry| entry.id).collect()
    }

    fn scores(&self, lists: &[String]) -> Vec<f64> {
        self.entries(lists).into_iter().map(|entry| entry.score).collect()
    }
}
