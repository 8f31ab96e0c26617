/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{collections::HashMap, fmt, hash::Hash};

use chessie::Move;

use crate::{tune, Score, SearchBounds};

/// A bounded key-value store that evicts its least-recently-used entry when full.
///
/// Entries live in a slab of nodes threaded into a doubly-linked recency list,
/// with a [`HashMap`] from key to slab index. Both [`MemoCache::get`] and
/// [`MemoCache::insert`] mark an entry as most recently used.
///
/// The slab grows on demand, so a large capacity costs nothing until it is used.
///
/// This type performs no synchronization and must only be touched by a single thread.
#[derive(Debug, Clone)]
pub struct MemoCache<K, V> {
    /// Maps a key to the index of its node in `nodes`.
    index: HashMap<K, usize>,

    /// Storage for every entry.
    nodes: Vec<Node<K, V>>,

    /// Most recently used node.
    head: Option<usize>,

    /// Least recently used node, first in line for eviction.
    tail: Option<usize>,

    /// Maximum number of entries.
    capacity: usize,

    /// Number of calls to `get`.
    accesses: u64,

    /// Number of calls to `get` that found an entry.
    hits: u64,

    /// Number of calls to `insert`.
    inserts: u64,

    /// Number of entries removed to make room for new ones.
    evictions: u64,
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    prev: Option<usize>,
    next: Option<usize>,
}

impl<K: Hash + Eq + Clone, V> MemoCache<K, V> {
    /// Creates an empty cache that will hold at most `capacity` entries.
    ///
    /// A capacity of `0` creates a cache that never stores anything.
    pub fn new(capacity: usize) -> Self {
        Self {
            index: HashMap::new(),
            nodes: Vec::new(),
            head: None,
            tail: None,
            capacity,
            accesses: 0,
            hits: 0,
            inserts: 0,
            evictions: 0,
        }
    }

    /// Maximum number of entries this cache will hold.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently stored.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if nothing is stored.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Returns `true` if `key` is stored, without touching recency or counters.
    #[inline(always)]
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Fetches the value stored under `key`, marking it as most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.accesses += 1;
        let idx = *self.index.get(key)?;
        self.hits += 1;

        self.detach(idx);
        self.attach_front(idx);

        Some(&self.nodes[idx].value)
    }

    /// Stores `value` under `key`, marking it as most recently used.
    ///
    /// If the cache is full and `key` is new, the least-recently-used entry is evicted first.
    pub fn insert(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }
        self.inserts += 1;

        // Overwrite in place
        if let Some(&idx) = self.index.get(&key) {
            self.nodes[idx].value = value;
            self.detach(idx);
            self.attach_front(idx);
            return;
        }

        let idx = if self.index.len() >= self.capacity {
            // Recycle the slot of the least-recently-used entry
            let Some(lru) = self.tail else {
                unreachable!("a full cache always has a tail")
            };
            self.detach(lru);
            self.index.remove(&self.nodes[lru].key);
            self.evictions += 1;

            self.nodes[lru].key = key.clone();
            self.nodes[lru].value = value;
            lru
        } else {
            self.nodes.push(Node {
                key: key.clone(),
                value,
                prev: None,
                next: None,
            });
            self.nodes.len() - 1
        };

        self.index.insert(key, idx);
        self.attach_front(idx);
    }

    /// Removes every entry and resets all counters.
    pub fn clear(&mut self) {
        *self = Self::new(self.capacity);
    }

    /// Human-readable summary of this cache's counters.
    pub fn stats(&self) -> String {
        let hit_rate = if self.accesses == 0 {
            0.0
        } else {
            self.hits as f64 / self.accesses as f64 * 100.0
        };

        format!(
            "entries {}/{} gets {} hits {} ({hit_rate:.1}%) inserts {} evictions {}",
            self.len(),
            self.capacity,
            self.accesses,
            self.hits,
            self.inserts,
            self.evictions
        )
    }

    /// Unlinks the node at `idx` from the recency list.
    fn detach(&mut self, idx: usize) {
        let Node { prev, next, .. } = self.nodes[idx];

        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }

        self.nodes[idx].prev = None;
        self.nodes[idx].next = None;
    }

    /// Links the (detached) node at `idx` in as the most recently used.
    fn attach_front(&mut self, idx: usize) {
        self.nodes[idx].next = self.head;
        if let Some(old) = self.head {
            self.nodes[old].prev = Some(idx);
        }
        self.head = Some(idx);

        if self.tail.is_none() {
            self.tail = Some(idx);
        }
    }
}

impl<K: Hash + Eq + Clone, V> fmt::Display for MemoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stats())
    }
}

/// How a cached search score relates to the true score of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// The score is exact.
    Exact,

    /// The search failed high; the true score is at least this score.
    Lower,

    /// The search failed low; the true score is at most this score.
    Upper,
}

impl Bound {
    /// Classifies `score` against the window it was searched with.
    #[inline(always)]
    pub fn new(score: Score, bounds: SearchBounds) -> Self {
        if score <= bounds.alpha {
            Self::Upper
        } else if score >= bounds.beta {
            Self::Lower
        } else {
            Self::Exact
        }
    }
}

/// A completed search of a position at some depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedSearch {
    /// The score, or the bound that was proven if the search did not end inside its window.
    pub score: Score,

    /// Best move found, if the node was not a leaf.
    pub bestmove: Option<Move>,

    /// How `score` relates to the true score.
    pub bound: Bound,
}

impl CachedSearch {
    /// Records the result of a search that was run with `bounds`.
    ///
    /// Bounded results store the window edge they were proven against,
    /// which holds regardless of how the failing subtree was pruned.
    pub fn new(score: Score, bestmove: Option<Move>, bounds: SearchBounds) -> Self {
        let bound = Bound::new(score, bounds);
        let score = match bound {
            Bound::Exact => score,
            Bound::Lower => bounds.beta,
            Bound::Upper => bounds.alpha,
        };

        Self {
            score,
            bestmove,
            bound,
        }
    }

    /// Returns a score usable in a search with `bounds`, if this entry answers it.
    #[inline(always)]
    pub fn try_score(&self, bounds: SearchBounds) -> Option<Score> {
        let usable = match self.bound {
            Bound::Exact => true,
            Bound::Lower => self.score >= bounds.beta,
            Bound::Upper => self.score <= bounds.alpha,
        };

        usable.then_some(self.score)
    }
}

/// Which of the [`Caches`] a search may read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheFlags {
    /// Memoize complete search results by position and depth.
    pub search: bool,

    /// Memoize static evaluations by position.
    pub eval: bool,

    /// Remember the best move of each searched position for move ordering.
    pub pv: bool,
}

impl CacheFlags {
    /// Every cache disabled.
    pub const NONE: Self = Self {
        search: false,
        eval: false,
        pv: false,
    };

    /// Every cache enabled.
    pub const ALL: Self = Self {
        search: true,
        eval: true,
        pv: true,
    };

    /// Returns `true` if any cache is enabled.
    #[inline(always)]
    pub const fn any(&self) -> bool {
        self.search || self.eval || self.pv
    }
}

impl Default for CacheFlags {
    fn default() -> Self {
        Self {
            pv: true,
            ..Self::NONE
        }
    }
}

/// The three memo caches used by the search.
#[derive(Debug, Clone)]
pub struct Caches {
    /// Search results keyed by `(hash, depth)`.
    pub search: MemoCache<(u64, u8), CachedSearch>,

    /// Static evaluations keyed by position hash.
    pub eval: MemoCache<u64, Score>,

    /// Best moves keyed by position hash.
    pub pv: MemoCache<u64, Move>,
}

impl Caches {
    /// Creates empty caches with the given capacities.
    pub fn new(search: usize, eval: usize, pv: usize) -> Self {
        Self {
            search: MemoCache::new(search),
            eval: MemoCache::new(eval),
            pv: MemoCache::new(pv),
        }
    }

    /// Empties all three caches.
    pub fn clear(&mut self) {
        self.search.clear();
        self.eval.clear();
        self.pv.clear();
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new(
            tune::search_cache_capacity!(),
            tune::eval_cache_capacity!(),
            tune::pv_cache_capacity!(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_inserted() {
        let mut cache = MemoCache::new(3);
        for i in 0..4 {
            cache.insert(i, i * 10);
        }

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get(&0), None);
        assert_eq!(cache.get(&1), Some(&10));
        assert_eq!(cache.get(&3), Some(&30));
    }

    #[test]
    fn test_get_refreshes_recency() {
        let mut cache = MemoCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);

        // "a" is now the most recent, so "b" goes
        assert_eq!(cache.get(&"a"), Some(&1));
        cache.insert("c", 3);

        assert!(cache.contains(&"a"));
        assert!(!cache.contains(&"b"));
        assert!(cache.contains(&"c"));
    }

    #[test]
    fn test_reinsert_refreshes_and_overwrites() {
        let mut cache = MemoCache::new(2);
        cache.insert(1, "one");
        cache.insert(2, "two");
        cache.insert(1, "uno");
        cache.insert(3, "three");

        assert_eq!(cache.get(&1), Some(&"uno"));
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_capacity_one() {
        let mut cache = MemoCache::new(1);
        cache.insert(1, 1);
        cache.insert(2, 2);
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.get(&2), Some(&2));
        cache.insert(3, 3);
        assert_eq!(cache.get(&2), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = MemoCache::new(0);
        cache.insert(1, 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
    }

    #[test]
    fn test_counters() {
        let mut cache = MemoCache::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        cache.get(&3);
        cache.get(&1);

        assert_eq!(cache.inserts, 3);
        assert_eq!(cache.evictions, 1);
        assert_eq!(cache.accesses, 2);
        assert_eq!(cache.hits, 1);
        assert!(cache.stats().contains("evictions 1"));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.inserts, 0);
        assert_eq!(cache.capacity(), 2);
    }

    #[test]
    fn test_long_churn_keeps_most_recent() {
        let capacity = 64;
        let mut cache = MemoCache::new(capacity);
        for i in 0..10_000u64 {
            cache.insert(i, i);
        }

        assert_eq!(cache.len(), capacity);
        for i in (10_000 - capacity as u64)..10_000 {
            assert_eq!(cache.get(&i), Some(&i));
        }
        assert_eq!(cache.get(&0), None);
    }

    #[test]
    fn test_cached_search_bounds() {
        let window = SearchBounds::new(Score(-50), Score(50));

        let exact = CachedSearch::new(Score(10), None, window);
        assert_eq!(exact.bound, Bound::Exact);
        assert_eq!(exact.try_score(SearchBounds::default()), Some(Score(10)));

        let high = CachedSearch::new(Score(75), None, window);
        assert_eq!(high.bound, Bound::Lower);
        assert_eq!(high.score, Score(50));
        assert_eq!(high.try_score(SearchBounds::new(Score(0), Score(40))), Some(Score(50)));
        assert_eq!(high.try_score(SearchBounds::default()), None);

        let low = CachedSearch::new(Score(-90), None, window);
        assert_eq!(low.bound, Bound::Upper);
        assert_eq!(low.try_score(SearchBounds::new(Score(-40), Score(0))), Some(Score(-50)));
        assert_eq!(low.try_score(SearchBounds::new(Score(-60), Score(0))), None);
    }
}
