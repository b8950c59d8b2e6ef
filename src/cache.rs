//! Bounded prediction cache (spec §5 "Resource policy"): a single-writer
//! many-reader map keyed by `(version_id, home_id, away_id, lineup_stable)`,
//! evicting the least-recently-used entry once it fills.

use std::collections::{HashMap, VecDeque};

use parking_lot::RwLock;

use crate::domain::ProbabilityTriple;

pub const DEFAULT_CAPACITY: usize = 100_000;

pub type PredictionCacheKey = (String, u64, u64, bool);

struct Inner {
    map: HashMap<PredictionCacheKey, ProbabilityTriple>,
    order: VecDeque<PredictionCacheKey>,
    capacity: usize,
}

impl Inner {
    fn touch(&mut self, key: &PredictionCacheKey) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
        self.order.push_back(key.clone());
    }
}

/// `predict(home, away)` memoization, bounded to `capacity` entries. Eviction
/// order is not semantically observable (spec §5) — callers never depend on
/// whether a given key is still resident.
pub struct PredictionCache {
    inner: RwLock<Inner>,
}

impl PredictionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(Inner {
                map: HashMap::new(),
                order: VecDeque::new(),
                capacity,
            }),
        }
    }

    pub fn get(&self, key: &PredictionCacheKey) -> Option<ProbabilityTriple> {
        let mut guard = self.inner.write();
        let hit = guard.map.get(key).copied();
        if hit.is_some() {
            guard.touch(key);
        }
        hit
    }

    pub fn insert(&self, key: PredictionCacheKey, value: ProbabilityTriple) {
        let mut guard = self.inner.write();
        if !guard.map.contains_key(&key) && guard.map.len() >= guard.capacity {
            if let Some(lru_key) = guard.order.pop_front() {
                guard.map.remove(&lru_key);
            }
        }
        guard.map.insert(key.clone(), value);
        guard.touch(&key);
    }

    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PredictionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple() -> ProbabilityTriple {
        ProbabilityTriple::new(0.5, 0.3, 0.2, 1.0, 1.0, false)
    }

    #[test]
    fn insert_then_get_round_trips() {
        let cache = PredictionCache::new(4);
        let key = ("v1".to_string(), 1, 2, true);
        cache.insert(key.clone(), triple());
        assert_eq!(cache.get(&key), Some(triple()));
    }

    #[test]
    fn evicts_least_recently_used_once_full() {
        let cache = PredictionCache::new(2);
        cache.insert(("v1".into(), 1, 2, true), triple());
        cache.insert(("v1".into(), 3, 4, true), triple());
        // touch the first so the second becomes LRU.
        cache.get(&("v1".into(), 1, 2, true));
        cache.insert(("v1".into(), 5, 6, true), triple());
        assert!(cache.get(&("v1".into(), 3, 4, true)).is_none());
        assert!(cache.get(&("v1".into(), 1, 2, true)).is_some());
        assert_eq!(cache.len(), 2);
    }
}
