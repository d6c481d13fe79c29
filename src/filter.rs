//! Which authors' squawks to show.
//!
//! The filter is derived from the user's following toggles: the test
//! account is always included, plus every author key toggled on.

use crate::contract::{COLUMN_AUTHOR_KEY, TEST_ACCOUNT_KEY};
use crate::types::Selection;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Following toggles, keyed by author key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionSet(BTreeMap<String, bool>);

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a toggle. Returns the previous value, if any.
    pub fn set(&mut self, author_key: impl Into<String>, subscribed: bool) -> Option<bool> {
        self.0.insert(author_key.into(), subscribed)
    }

    /// Whether `author_key` is toggled on. Unknown keys are off.
    pub fn is_subscribed(&self, author_key: &str) -> bool {
        self.0.get(author_key).copied().unwrap_or(false)
    }

    /// Keys currently toggled on.
    pub fn subscribed_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, on)| **on)
            .map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(key, on)| (key.as_str(), *on))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for SubscriptionSet {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// "authorKey is one of these" predicate. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorFilter {
    keys: BTreeSet<String>,
}

impl AuthorFilter {
    /// Whether a squawk by `author_key` passes the filter.
    pub fn matches(&self, author_key: &str) -> bool {
        self.keys.contains(author_key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Parameterized selection for [`SquawkStore::query`](crate::SquawkStore::query).
    pub fn to_selection(&self) -> Selection {
        let placeholders = vec!["?"; self.keys.len()].join(", ");
        Selection::new(
            format!("{} IN ({})", COLUMN_AUTHOR_KEY, placeholders),
            self.keys.iter().cloned().collect(),
        )
    }
}

impl fmt::Display for AuthorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted = self
            .keys
            .iter()
            .map(|k| format!("'{}'", k.replace('\'', "''")))
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{} IN ({})", COLUMN_AUTHOR_KEY, quoted)
    }
}

/// Build the author filter for the given toggles.
pub fn build_predicate(subscriptions: &SubscriptionSet) -> AuthorFilter {
    let mut keys: BTreeSet<String> = subscriptions
        .subscribed_keys()
        .map(str::to_string)
        .collect();
    keys.insert(TEST_ACCOUNT_KEY.to_string());
    AuthorFilter { keys }
}
