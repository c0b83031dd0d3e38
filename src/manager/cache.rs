use hashbrown::HashMap as FastHashMap;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};

pub type RuleIndices = SmallVec<[usize; 4]>;

/// Per route, the rules worth trying first when creating a URL: those that
/// succeeded or only failed on params. Rules left out can never produce a
/// URL for that route.
#[derive(Debug, Default)]
pub struct RuleCache {
    map: FastHashMap<String, RuleIndices>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self, route: &str) -> Option<RuleIndices> {
        self.map.get(route).cloned()
    }

    /// Merges `indices` into the entry for `route`, keeping it sorted.
    pub fn remember(&mut self, route: &str, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        match self.map.get_mut(route) {
            Some(entry) => {
                entry.extend_from_slice(indices);
                entry.sort_unstable();
                entry.dedup();
            }
            None => {
                let mut entry: RuleIndices = indices.iter().copied().collect();
                entry.sort_unstable();
                entry.dedup();
                self.map.insert(route.to_string(), entry);
            }
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
        )
    }

    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_merges_and_sorts_indices() {
        let mut cache = RuleCache::new();
        cache.remember("post/view", &[3, 1]);
        cache.remember("post/view", &[2, 3]);

        let entry = cache.peek("post/view").expect("entry should exist");
        assert_eq!(entry.as_slice(), &[1, 2, 3]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn empty_indices_are_not_stored() {
        let mut cache = RuleCache::new();
        cache.remember("post/view", &[]);
        assert!(cache.peek("post/view").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn clear_drops_every_entry() {
        let mut cache = RuleCache::new();
        cache.remember("a", &[0]);
        cache.remember("b", &[1]);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let stats = CacheStats::default();
        stats.record_miss();
        stats.record_hit();
        stats.record_hit();
        assert_eq!(stats.snapshot(), (2, 1));
        stats.reset();
        assert_eq!(stats.snapshot(), (0, 0));
    }
}
