//! Soft-hold cache for resolved thumbnails
//!
//! Wraps thumbnails in reclaimable handles so memory stays bounded
//! under scroll pressure. The LRU tracks `Weak` handles; a small
//! FIFO window of strong references keeps freshly stored values alive
//! long enough to be picked up, and the UI keeps its own `Arc` for
//! anything currently on screen. Once a value leaves the window and no
//! consumer holds it, the handle goes dead — which reads exactly like
//! a cache miss, never an error.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::cache::LruCache;
use crate::metrics::{MetricsSink, NullMetrics};
use crate::resolver::Thumbnail;
use crate::VideoId;

struct Inner {
    entries: LruCache<VideoId, Weak<Thumbnail>>,
    /// Strong references to the most recently stored values, oldest first.
    recent: VecDeque<Arc<Thumbnail>>,
    recent_cap: usize,
}

/// Thread-safe thumbnail cache with reclaimable values.
///
/// All state sits behind one coarse lock; call frequency is bounded by
/// UI scroll rate, so contention is negligible. Hit/miss counts are
/// kept in atomics and forwarded to the [`MetricsSink`] per lookup.
pub struct SoftCache {
    inner: Mutex<Inner>,
    hits: AtomicU64,
    misses: AtomicU64,
    metrics: Arc<dyn MetricsSink>,
}

impl SoftCache {
    /// Create a cache tracking at most `max_size` entries, holding the
    /// `strong_window` most recently stored values alive.
    pub fn new(max_size: usize, strong_window: usize) -> Self {
        Self::with_metrics(max_size, strong_window, Arc::new(NullMetrics))
    }

    /// As [`SoftCache::new`], reporting lookups to `metrics`.
    pub fn with_metrics(
        max_size: usize,
        strong_window: usize,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(max_size),
                recent: VecDeque::with_capacity(strong_window),
                recent_cap: strong_window.max(1),
            }),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            metrics,
        }
    }

    /// Look up a thumbnail.
    ///
    /// A handle whose value has been reclaimed counts as a miss and is
    /// dropped from the index; the caller re-resolves and stores again.
    pub fn load(&self, id: VideoId) -> Option<Arc<Thumbnail>> {
        let mut inner = self.inner.lock().unwrap();
        let value = inner.entries.try_get(&id).and_then(Weak::upgrade);
        match value {
            Some(thumb) => {
                drop(inner);
                self.hits.fetch_add(1, Ordering::Relaxed);
                self.metrics.record_hit();
                Some(thumb)
            }
            None => {
                // Either absent or a dead handle; removing is a no-op
                // for the former.
                inner.entries.remove(&id);
                drop(inner);
                self.misses.fetch_add(1, Ordering::Relaxed);
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Store a thumbnail under `id`.
    ///
    /// The cache itself only ever holds the value weakly; the strong
    /// window delays reclamation for the newest values.
    pub fn store(&self, id: VideoId, thumbnail: Arc<Thumbnail>) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.put(id, Arc::downgrade(&thumbnail));
        if inner.recent.len() >= inner.recent_cap {
            inner.recent.pop_front();
        }
        inner.recent.push_back(thumbnail);
    }

    /// Drop the entry for `id`, if any.
    pub fn remove(&self, id: VideoId) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(weak) = inner.entries.remove(&id) {
            if let Some(thumb) = weak.upgrade() {
                inner.recent.retain(|t| !Arc::ptr_eq(t, &thumb));
            }
        }
    }

    /// Drop all entries and strong holds.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.clear();
        inner.recent.clear();
    }

    /// Number of tracked entries (live or reclaimed).
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Returns true if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hit rate over all lookups so far, as a ratio in [0.0, 1.0].
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

impl std::fmt::Debug for SoftCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftCache")
            .field("len", &self.len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}
