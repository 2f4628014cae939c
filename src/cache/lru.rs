//! Bounded LRU cache with O(1) operations
//!
//! Stores entries in a `Vec` arena linked into a doubly-linked recency
//! list by index (head = most recent, tail = least recent), with a
//! `HashMap` for key lookup. No unsafe code. Eviction always removes
//! the tail, so the entry count never exceeds the configured capacity.

use std::collections::HashMap;
use std::hash::Hash;

/// Null link in the recency list.
const NIL: usize = usize::MAX;

/// A slot in the arena-backed recency list.
///
/// `value` is an `Option` so removal can take it out without shifting
/// the arena; vacated slots are recycled through a free list.
struct Slot<K, V> {
    key: K,
    value: Option<V>,
    prev: usize,
    next: usize,
}

/// Bounded LRU cache.
///
/// Every successful lookup or insertion refreshes the entry's recency;
/// when an insertion would exceed capacity, the least-recently-used
/// entry is evicted in the same call.
pub struct LruCache<K, V> {
    capacity: usize,
    map: HashMap<K, usize>,
    arena: Vec<Slot<K, V>>,
    /// Most-recently used slot index.
    head: usize,
    /// Least-recently used slot index.
    tail: usize,
    /// Head of the free list of vacated slots.
    free: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be > 0");
        Self {
            capacity,
            map: HashMap::with_capacity(capacity),
            arena: Vec::with_capacity(capacity),
            head: NIL,
            tail: NIL,
            free: NIL,
        }
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns true if the key is present (without refreshing recency).
    pub fn contains_key(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up a value, promoting it to most-recently used on a hit.
    ///
    /// A miss has no side effects.
    pub fn try_get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.map.get(key)?;
        self.move_to_head(idx);
        self.arena[idx].value.as_ref()
    }

    /// Insert or overwrite a key.
    ///
    /// Overwriting refreshes recency and never consumes a new slot.
    /// Returns the evicted least-recent entry when the insertion would
    /// have pushed the cache over capacity.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(&idx) = self.map.get(&key) {
            self.arena[idx].value = Some(value);
            self.move_to_head(idx);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_lru()
        } else {
            None
        };

        let idx = self.alloc(key.clone(), value);
        self.push_head(idx);
        self.map.insert(key, idx);
        evicted
    }

    /// Remove a key, returning its value if present. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = self.map.remove(key)?;
        self.unlink(idx);
        let value = self.arena[idx].value.take();
        self.release(idx);
        value
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.arena.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
    }

    /// Remove and return the least-recently-used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        if self.tail == NIL {
            return None;
        }
        let idx = self.tail;
        self.unlink(idx);
        let value = self.arena[idx].value.take();
        let key = self.arena[idx].key.clone();
        self.map.remove(&key);
        self.release(idx);
        value.map(|v| (key, v))
    }

    /// Key of the least-recently-used entry, if any.
    pub fn peek_lru_key(&self) -> Option<&K> {
        (self.tail != NIL).then(|| &self.arena[self.tail].key)
    }

    /// Take a slot from the free list or grow the arena.
    fn alloc(&mut self, key: K, value: V) -> usize {
        if self.free != NIL {
            let idx = self.free;
            self.free = self.arena[idx].next;
            self.arena[idx] = Slot {
                key,
                value: Some(value),
                prev: NIL,
                next: NIL,
            };
            idx
        } else {
            self.arena.push(Slot {
                key,
                value: Some(value),
                prev: NIL,
                next: NIL,
            });
            self.arena.len() - 1
        }
    }

    /// Return a vacated slot to the free list.
    fn release(&mut self, idx: usize) {
        self.arena[idx].next = self.free;
        self.free = idx;
    }

    /// Detach a slot from the recency list.
    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.arena[idx].prev, self.arena[idx].next);
        if prev != NIL {
            self.arena[prev].next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            self.arena[next].prev = prev;
        } else {
            self.tail = prev;
        }
        self.arena[idx].prev = NIL;
        self.arena[idx].next = NIL;
    }

    /// Link a detached slot in as most-recently used.
    fn push_head(&mut self, idx: usize) {
        self.arena[idx].prev = NIL;
        self.arena[idx].next = self.head;
        if self.head != NIL {
            self.arena[self.head].prev = idx;
        }
        self.head = idx;
        if self.tail == NIL {
            self.tail = idx;
        }
    }

    /// Promote a linked slot to most-recently used.
    fn move_to_head(&mut self, idx: usize) {
        if self.head == idx {
            return;
        }
        self.unlink(idx);
        self.push_head(idx);
    }
}
