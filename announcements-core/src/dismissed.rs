//! Dismissal tracking.
//!
//! The dismissed set only ever grows. Each dismissal builds a new set from
//! the previous snapshot, so readers holding an older snapshot never observe
//! a mutation.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::store::{KeyValueStore, StoreError};

/// Storage key holding the JSON array of dismissed timestamps.
pub const DISMISSED_KEY: &str = "dismissedAnnouncements";

/// Immutable snapshot of the timestamps the viewer has closed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DismissedSet {
    timestamps: Arc<BTreeSet<String>>,
}

impl DismissedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the set persisted under [`DISMISSED_KEY`].
    ///
    /// A missing value, an unreadable store or malformed JSON all yield the
    /// empty set.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let raw = match store.get(DISMISSED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::new(),
            Err(e) => {
                tracing::error!("Failed to read dismissed announcements: {}", e);
                return Self::new();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(timestamps) => {
                tracing::debug!("Loaded {} dismissed announcements", timestamps.len());
                timestamps.into_iter().collect()
            }
            Err(e) => {
                tracing::warn!(
                    "Stored dismissed announcements are not a JSON string array, starting empty: {}",
                    e
                );
                Self::new()
            }
        }
    }

    pub fn contains(&self, timestamp: &str) -> bool {
        self.timestamps.contains(timestamp)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.timestamps.iter().map(String::as_str)
    }

    /// A new set containing every timestamp of `self` plus `timestamp`.
    pub fn with(&self, timestamp: &str) -> Self {
        if self.contains(timestamp) {
            return self.clone();
        }
        let mut timestamps = (*self.timestamps).clone();
        timestamps.insert(timestamp.to_string());
        Self {
            timestamps: Arc::new(timestamps),
        }
    }

    /// Serialize the full set under [`DISMISSED_KEY`].
    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let timestamps: Vec<&str> = self.iter().collect();
        let value = serde_json::to_string(&timestamps)?;
        store.set(DISMISSED_KEY, &value)
    }

    /// Add `timestamp` and persist the result.
    ///
    /// A storage failure is logged; the returned set includes the dismissal
    /// either way.
    pub fn dismiss(&self, store: &dyn KeyValueStore, timestamp: &str) -> Self {
        let next = self.with(timestamp);
        if let Err(e) = next.persist(store) {
            tracing::error!("Failed to persist dismissal of {}: {}", timestamp, e);
        }
        next
    }
}

impl FromIterator<String> for DismissedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            timestamps: Arc::new(iter.into_iter().collect()),
        }
    }
}
