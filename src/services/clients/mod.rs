//! User data sources
//!
//! A client answers questions about one user's categorized title lists. The
//! engine never talks to a remote API itself: implementations fetch or receive
//! the user's lists up front and answer these calls from memory.

use crate::models::ExternalId;

pub mod user_lists;

pub use user_lists::{ListEntry, UserLists, DEFAULT_EXCLUDED_LISTS, DEFAULT_INCLUDED_LISTS};

/// Trait for user list sources
#[cfg_attr(test, mockall::automock)]
pub trait UserListClient: Send + Sync {
    /// External ids of the entries in the named lists, used as reference titles
    fn included_entries(&self, lists: &[String]) -> Vec<ExternalId>;

    /// External ids of the entries in the named lists, removed from the output
    fn excluded_entries(&self, lists: &[String]) -> Vec<ExternalId>;

    /// The user's score for each entry, aligned with `included_entries(lists)`
    fn scores(&self, lists: &[String]) -> Vec<f64>;
}
