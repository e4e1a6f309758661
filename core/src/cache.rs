//! Tag-invalidated query cache.
//!
//! A small pub/sub table: each entry is keyed by its [`Query`], remembers
//! the last successful payload and counts live subscribers. The tags an
//! entry provides come from the query itself, so invalidating a tag set is a
//! scan for intersecting entries. Active entries are marked stale and handed
//! back for refetching; inactive ones are dropped.
//!
//! The cache does no I/O. [`crate::store::ApiStore`] drives it.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::endpoints::Query;
use crate::tags::{intersects, Tag};

#[derive(Debug, Clone)]
struct Entry {
    data: Option<Arc<Value>>,
    stale: bool,
    subscribers: usize,
}

impl Entry {
    fn empty() -> Self {
        Self {
            data: None,
            stale: false,
            subscribers: 0,
        }
    }
}

/// Outcome of [`QueryCache::invalidate`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Invalidation {
    /// Entries with subscribers, now stale and due for one refetch.
    pub refetch: Vec<Query>,
    /// Entries without subscribers, removed from the cache.
    pub removed: Vec<Query>,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: HashMap<Query, Entry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached payload that has not been invalidated since it was stored.
    pub fn fresh(&self, query: &Query) -> Option<Arc<Value>> {
        self.entries
            .get(query)
            .filter(|entry| !entry.stale)
            .and_then(|entry| entry.data.clone())
    }

    /// Last stored payload, stale or not. Views keep showing it while a
    /// refetch runs or after one fails.
    pub fn data(&self, query: &Query) -> Option<Arc<Value>> {
        self.entries.get(query).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, query: &Query) -> bool {
        self.entries.get(query).is_some_and(|entry| entry.stale)
    }

    pub fn contains(&self, query: &Query) -> bool {
        self.entries.contains_key(query)
    }

    pub fn store(&mut self, query: &Query, data: Arc<Value>) {
        let entry = self.entries.entry(query.clone()).or_insert_with(Entry::empty);
        entry.data = Some(data);
        entry.stale = false;
    }

    /// Register a subscriber and return the new count.
    pub fn subscribe(&mut self, query: &Query) -> usize {
        let entry = self.entries.entry(query.clone()).or_insert_with(Entry::empty);
        entry.subscribers += 1;
        entry.subscribers
    }

    /// Drop a subscriber and return the remaining count. Inactive entries
    /// keep their data; entries that never received any are forgotten.
    pub fn unsubscribe(&mut self, query: &Query) -> usize {
        let Some(entry) = self.entries.get_mut(query) else {
            return 0;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        let remaining = entry.subscribers;
        if remaining == 0 && entry.data.is_none() {
            self.entries.remove(query);
        }
        remaining
    }

    pub fn subscribers(&self, query: &Query) -> usize {
        self.entries.get(query).map_or(0, |entry| entry.subscribers)
    }

    /// Apply a mutation's invalidated tags.
    pub fn invalidate(&mut self, tags: &[Tag]) -> Invalidation {
        let mut outcome = Invalidation::default();
        for (query, entry) in &mut self.entries {
            if !intersects(query.provides(), tags) {
                continue;
            }
            if entry.subscribers > 0 {
                entry.stale = true;
                outcome.refetch.push(query.clone());
            } else {
                outcome.removed.push(query.clone());
            }
        }
        for query in &outcome.removed {
            self.entries.remove(query);
        }
        outcome
    }

    /// Drop every cached payload. Live subscriber counts survive, so views
    /// still open across a logout stay active. Returns how many payloads
    /// were dropped.
    pub fn clear(&mut self) -> usize {
        let flushed = self.len();
        self.entries.retain(|_, entry| entry.subscribers > 0);
        for entry in self.entries.values_mut() {
            entry.data = None;
            entry.stale = false;
        }
        flushed
    }

    /// Number of entries holding a payload.
    pub fn len(&self) -> usize {
        self.entries.values().filter(|entry| entry.data.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
