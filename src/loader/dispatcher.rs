//! Priority-aware thumbnail load dispatcher
//!
//! A single worker thread drains two request lanes: visible items
//! always start before background items, FIFO within a lane. Producers
//! (the UI thread and visibility updates) never block. Each request
//! carries a cancellation flag checked right before it would start;
//! work already in progress is allowed to finish and its result is
//! still cached. Resolution failures and panics are contained per
//! request, and the loop itself restarts if anything escapes it.

use std::collections::{HashMap, HashSet, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::request::{CancelHandle, LoadRequest, ThumbnailLoaded};
use crate::cache::SoftCache;
use crate::config::ThumbnailConfig;
use crate::metrics::{MetricsSink, NullMetrics};
use crate::resolver::ThumbnailResolver;
use crate::VideoId;

struct QueueState {
    visible: VecDeque<LoadRequest>,
    background: VecDeque<LoadRequest>,
    /// At most one in-flight or queued request per video id.
    pending: HashMap<VideoId, CancelHandle>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    available: Condvar,
    cache: Arc<SoftCache>,
    metrics: Arc<dyn MetricsSink>,
    max_queue_len: usize,
}

impl Shared {
    /// Lock the queue state, recovering from poisoning so a restarted
    /// worker loop can keep serving requests.
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Asynchronous thumbnail loader for the video library list.
///
/// Requests are enqueued non-blockingly, resolved on a background
/// worker, stored in the [`SoftCache`], and announced over an event
/// channel the UI polls.
pub struct ThumbnailLoader {
    shared: Arc<Shared>,
    events_tx: Sender<ThumbnailLoaded>,
    events_rx: Receiver<ThumbnailLoaded>,
    worker: Option<JoinHandle<()>>,
}

impl ThumbnailLoader {
    /// Create a loader over an existing cache.
    pub fn new(
        cache: Arc<SoftCache>,
        resolver: Arc<dyn ThumbnailResolver>,
        metrics: Arc<dyn MetricsSink>,
        max_queue_len: usize,
    ) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                visible: VecDeque::new(),
                background: VecDeque::new(),
                pending: HashMap::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
            cache,
            metrics,
            max_queue_len: max_queue_len.max(1),
        });

        let (events_tx, events_rx) = mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker_tx = events_tx.clone();
        let worker = thread::Builder::new()
            .name("vtl-thumbnail-worker".to_string())
            .spawn(move || loop {
                let run = panic::catch_unwind(AssertUnwindSafe(|| {
                    worker_loop(&worker_shared, resolver.as_ref(), &worker_tx)
                }));
                match run {
                    Ok(()) => break, // shutdown
                    Err(_) => {
                        tracing::error!("thumbnail worker loop panicked; restarting");
                    }
                }
            })
            .expect("failed to spawn thumbnail worker thread");

        Self {
            shared,
            events_tx,
            events_rx,
            worker: Some(worker),
        }
    }

    /// Build a cache and loader pair from configuration.
    pub fn from_config(
        config: &ThumbnailConfig,
        resolver: Arc<dyn ThumbnailResolver>,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Self {
        let metrics = metrics.unwrap_or_else(|| Arc::new(NullMetrics));
        let cache = Arc::new(SoftCache::with_metrics(
            config.cache_max_size,
            config.strong_window_size,
            Arc::clone(&metrics),
        ));
        Self::new(cache, resolver, metrics, config.max_queue_len)
    }

    /// The cache this loader stores results into.
    pub fn cache(&self) -> &Arc<SoftCache> {
        &self.shared.cache
    }

    /// Request a thumbnail for `video_id` (non-blocking).
    ///
    /// On a cache hit the notification is delivered immediately and
    /// nothing is queued. A second enqueue for the same id supersedes
    /// the first: the earlier request is canceled and replaced. When
    /// both lanes are at capacity the request is dropped with a
    /// warning rather than blocking the caller.
    pub fn enqueue(&self, video_id: VideoId, path: impl Into<PathBuf>, visible: bool) {
        if let Some(thumb) = self.shared.cache.load(video_id) {
            // Ignore send errors (UI side may have gone away)
            let _ = self.events_tx.send(ThumbnailLoaded {
                video_id,
                image_path: Some(thumb.image_path.clone()),
            });
            return;
        }

        let path = path.into();
        let mut state = self.shared.lock();
        if state.shutdown {
            return;
        }
        if state.visible.len() + state.background.len() >= self.shared.max_queue_len {
            tracing::warn!(video_id, "thumbnail request queue full, dropping request");
            return;
        }

        let cancel = CancelHandle::new();
        if let Some(prev) = state.pending.insert(video_id, cancel.clone()) {
            prev.cancel();
            state.visible.retain(|r| r.video_id != video_id);
            state.background.retain(|r| r.video_id != video_id);
        }

        let request = LoadRequest {
            video_id,
            path,
            visible,
            cancel,
        };
        if visible {
            state.visible.push_back(request);
        } else {
            state.background.push_back(request);
        }
        drop(state);
        self.shared.available.notify_one();
    }

    /// Enqueue several background requests at once, e.g. for rows just
    /// off the edge of the viewport.
    pub fn prefetch(&self, items: &[(VideoId, PathBuf)]) {
        for (video_id, path) in items {
            self.enqueue(*video_id, path.clone(), false);
        }
    }

    /// Reconcile queued work with the set of currently visible videos.
    ///
    /// Queued requests that were visible but left the set are canceled;
    /// queued background requests whose id entered the set move to the
    /// visible lane. Requests that were background all along stay put,
    /// and in-flight work is never canceled — its result is still
    /// applied when it returns.
    pub fn update_visible(&self, visible_ids: &HashSet<VideoId>) {
        let mut state = self.shared.lock();

        // Cancel queued visible requests that scrolled off screen.
        let mut kept = VecDeque::with_capacity(state.visible.len());
        while let Some(request) = state.visible.pop_front() {
            if visible_ids.contains(&request.video_id) {
                kept.push_back(request);
            } else {
                request.cancel.cancel();
                if let Some(handle) = state.pending.get(&request.video_id) {
                    if handle.same(&request.cancel) {
                        state.pending.remove(&request.video_id);
                    }
                }
                tracing::trace!(request.video_id, "canceled off-screen thumbnail request");
            }
        }
        state.visible = kept;

        // Promote background requests that scrolled into view.
        let mut still_background = VecDeque::with_capacity(state.background.len());
        while let Some(mut request) = state.background.pop_front() {
            if visible_ids.contains(&request.video_id) && !request.cancel.is_canceled() {
                request.visible = true;
                state.visible.push_back(request);
            } else {
                still_background.push_back(request);
            }
        }
        state.background = still_background;
    }

    /// Drop any cached value and queued request for `video_id`.
    ///
    /// The thumbnail will be re-resolved on the next enqueue, e.g.
    /// after the file changed on disk.
    pub fn invalidate(&self, video_id: VideoId) {
        self.shared.cache.remove(video_id);
        let mut state = self.shared.lock();
        if let Some(handle) = state.pending.remove(&video_id) {
            handle.cancel();
        }
        state.visible.retain(|r| r.video_id != video_id);
        state.background.retain(|r| r.video_id != video_id);
    }

    /// Whether a request for `video_id` is queued or in flight.
    pub fn is_pending(&self, video_id: VideoId) -> bool {
        self.shared.lock().pending.contains_key(&video_id)
    }

    /// Drain all notifications that have arrived so far (non-blocking).
    pub fn poll_loaded(&self) -> Vec<ThumbnailLoaded> {
        let mut loaded = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            loaded.push(event);
        }
        loaded
    }

    /// Wait up to `timeout` for the next notification.
    pub fn recv_loaded(&self, timeout: Duration) -> Option<ThumbnailLoaded> {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for ThumbnailLoader {
    fn drop(&mut self) {
        self.shared.lock().shutdown = true;
        self.shared.available.notify_all();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Drain the lanes until shutdown, visible lane first.
fn worker_loop(shared: &Shared, resolver: &dyn ThumbnailResolver, events: &Sender<ThumbnailLoaded>) {
    loop {
        let request = {
            let mut state = shared.lock();
            loop {
                if state.shutdown {
                    return;
                }
                if let Some(request) = state
                    .visible
                    .pop_front()
                    .or_else(|| state.background.pop_front())
                {
                    break request;
                }
                state = shared
                    .available
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        };

        if request.cancel.is_canceled() {
            finish_request(shared, &request);
            continue;
        }

        let start = Instant::now();
        // A panicking resolver is contained as a per-request failure.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(&request.path)));
        // Un-index before notifying so a consumer reacting to the event
        // never sees the finished request as still pending.
        finish_request(shared, &request);
        match outcome {
            Ok(Ok(thumbnail)) => {
                let thumbnail = Arc::new(thumbnail);
                shared.cache.store(request.video_id, Arc::clone(&thumbnail));
                shared
                    .metrics
                    .record_timing("thumbnail.resolve", start.elapsed());
                // Ignore send errors (UI side may have gone away)
                let _ = events.send(ThumbnailLoaded {
                    video_id: request.video_id,
                    image_path: Some(thumbnail.image_path.clone()),
                });
            }
            Ok(Err(err)) => {
                tracing::debug!(
                    request.video_id,
                    error = %err,
                    "thumbnail resolution failed"
                );
            }
            Err(_) => {
                tracing::error!(request.video_id, "thumbnail resolver panicked");
            }
        }
    }
}

/// Remove the request's index entry unless a newer request for the same
/// id has already superseded it.
fn finish_request(shared: &Shared, request: &LoadRequest) {
    let mut state = shared.lock();
    let superseded = match state.pending.get(&request.video_id) {
        Some(handle) => !handle.same(&request.cancel),
        None => true,
    };
    if !superseded {
        state.pending.remove(&request.video_id);
    }
}
