//! [`InvalidationCache`] remembers recently invalidated transaction ids with
//! efficient, bounded operations.

use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use ebbtide_chain::transaction;

/// An approximate, expiring set of transaction ids.
///
/// Ids are stored under their first eight bytes, so two unrelated ids can
/// collide and [`InvalidationCache::might_contain`] can answer `true` for an
/// id that was never recorded. An id recorded within the retention window
/// and not displaced by the size bound always answers `true`.
///
/// Entries silently disappear once they are older than the expiration or
/// once the cache grows past its size hint, oldest first.
#[derive(Clone, Debug)]
pub struct InvalidationCache {
    // Maps each short key to the most recent instant it was recorded.
    unique_entries: HashMap<u64, Instant>,
    // The same keys in the order they were first recorded.
    ordered_entries: VecDeque<u64>,
    // The maximum size of `unique_entries`.
    max_size: usize,
    /// Per-entry retention window.
    /// Same as [`Config::invalidated_cache_expiration`][1].
    ///
    /// [1]: crate::Config::invalidated_cache_expiration
    expiration: Duration,
}

impl InvalidationCache {
    /// Create an empty cache with the given size hint and per-entry
    /// retention window.
    pub fn new(max_size: usize, expiration: Duration) -> Self {
        Self {
            unique_entries: Default::default(),
            ordered_entries: Default::default(),
            max_size,
            expiration,
        }
    }

    /// Record `id`, keeping track of the time it was recorded.
    ///
    /// All entries older than the expiration are removed first. Recording
    /// an id that is already present refreshes its timestamp without
    /// consuming space: `invalidate` can legitimately see the same
    /// transaction more than once.
    pub fn put(&mut self, id: &transaction::Hash) {
        self.prune_old();

        let key = Self::short_key(id);
        if !self.unique_entries.contains_key(&key) {
            if self.unique_entries.len() >= self.max_size {
                self.pop_front();
            }
            self.ordered_entries.push_back(key);
        }
        self.unique_entries.insert(key, Instant::now());
    }

    /// Checks if `id` was recorded within the retention window.
    ///
    /// False positives are possible (ids sharing a short key); false
    /// negatives are not, until the entry expires or is displaced.
    pub fn might_contain(&self, id: &transaction::Hash) -> bool {
        if let Some(recorded_at) = self.unique_entries.get(&Self::short_key(id)) {
            // The cache is pruned only in mutable methods, so expired
            // entries must be filtered here.
            if !self.has_expired(recorded_at) {
                return true;
            }
        }
        false
    }

    /// Get the number of live entries in the cache.
    pub fn len(&mut self) -> usize {
        self.prune_old();
        self.unique_entries.len()
    }

    /// Returns `true` if the cache holds no live entries.
    pub fn is_empty(&mut self) -> bool {
        self.len() == 0
    }

    /// Prune entries that were recorded longer than the retention window
    /// ago.
    pub fn prune_old(&mut self) {
        while let Some(&key) = self.ordered_entries.front() {
            match self.unique_entries.get(&key) {
                // A refreshed entry at the front keeps its queue position,
                // so it can briefly shield younger entries behind it.
                Some(recorded_at) if !self.has_expired(recorded_at) => break,
                _ => {
                    self.pop_front();
                }
            }
        }
    }

    /// Removes the oldest entry and returns its key, or `None` if the cache
    /// is empty.
    fn pop_front(&mut self) -> Option<u64> {
        let key = self.ordered_entries.pop_front()?;
        self.unique_entries.remove(&key);
        Some(key)
    }

    /// Returns if `recorded_at` is considered expired given the current time
    /// and the configured retention window.
    fn has_expired(&self, recorded_at: &Instant) -> bool {
        recorded_at.elapsed() > self.expiration
    }

    /// The approximate lookup key for `id`: its first eight bytes.
    fn short_key(id: &transaction::Hash) -> u64 {
        let mut bytes = [0; 8];
        bytes.copy_from_slice(&id.0[..8]);
        u64::from_le_bytes(bytes)
    }
}
