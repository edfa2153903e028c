//! In-memory score cache keyed by photo identity.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tracing::debug;

use crate::domain::{PhotoId, ScoreRecord};

/// Shared cache of per-photo, per-assessor scores.
///
/// Lives for one candidate-set selection; cleared wholesale when the
/// candidate set changes. A single mutex guards the whole mapping: writes are
/// batched per photo and cross-photo contention is rare, so finer sharding
/// buys nothing here. Reads and writes never block on in-flight assessment of
/// another photo — the lock is only held for the map operation itself.
#[derive(Default)]
pub struct ScoreCache {
    records: Mutex<HashMap<PhotoId, ScoreRecord>>,
}

impl ScoreCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whatever partial or complete record exists for a photo.
    #[must_use]
    pub fn get(&self, id: &PhotoId) -> Option<ScoreRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Returns the subset of `required` names with no cached score for this
    /// photo, preserving the input order.
    pub fn missing<'a>(
        &self,
        id: &PhotoId,
        required: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let record = records.get(id);
        required
            .into_iter()
            .filter(|name| record.map_or(true, |r| !r.contains_key(*name)))
            .map(str::to_owned)
            .collect()
    }

    /// Inserts or overwrites the score for a `(photo, assessor)` pair.
    ///
    /// Last writer wins; writes to different pairs never conflict.
    pub fn put(&self, id: &PhotoId, name: &str, score: f64) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id.clone())
            .or_default()
            .insert(name.to_owned(), score);
    }

    /// Drops every cached record. Used when the candidate set changes.
    pub fn clear(&self) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(photos = records.len(), "Clearing score cache");
        records.clear();
    }

    /// Number of photos with at least one cached score.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_get_missing_put_roundtrip() {
        let cache = ScoreCache::new();
        let id = PhotoId::new("p1");

        assert!(cache.get(&id).is_none());
        assert_eq!(cache.missing(&id, ["a", "b"]), vec!["a", "b"]);

        cache.put(&id, "a", 0.7);
        assert_eq!(cache.missing(&id, ["a", "b"]), vec!["b"]);

        let record = cache.get(&id).unwrap();
        assert_eq!(record.get("a"), Some(&0.7));
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_put_overwrites_last_writer_wins() {
        let cache = ScoreCache::new();
        let id = PhotoId::new("p1");
        cache.put(&id, "a", 0.2);
        cache.put(&id, "a", 0.9);
        assert_eq!(cache.get(&id).unwrap().get("a"), Some(&0.9));
    }

    #[test]
    fn test_clear_resets_everything() {
        let cache = ScoreCache::new();
        cache.put(&PhotoId::new("p1"), "a", 0.5);
        cache.put(&PhotoId::new("p2"), "a", 0.5);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_writes_to_distinct_pairs() {
        let cache = Arc::new(ScoreCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let id = PhotoId::new(format!("p{}", i % 4));
                    cache.put(&id, if i < 4 { "a" } else { "b" }, f64::from(i) / 8.0);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 4);
        for i in 0..4 {
            let record = cache.get(&PhotoId::new(format!("p{i}"))).unwrap();
            assert_eq!(record.len(), 2);
        }
    }
}
