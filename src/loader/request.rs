//! Load request types shared between producers and the worker.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::VideoId;

/// Cooperative cancellation flag for one load request.
///
/// Cancellation only prevents unstarted work: the worker checks the
/// flag right before it would begin resolving, and never preempts work
/// already in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the request as canceled.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether the request has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Whether two handles refer to the same request.
    ///
    /// Used to keep a superseding enqueue's index entry intact when the
    /// superseded request finishes.
    pub fn same(&self, other: &CancelHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A queued thumbnail load. Lives for exactly one resolution attempt.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub video_id: VideoId,
    pub path: PathBuf,
    pub visible: bool,
    pub cancel: CancelHandle,
}

/// Notification that a thumbnail finished loading.
///
/// Delivered from the worker thread over the loader's event channel;
/// the UI drains it on its own thread. `image_path` is `None` only
/// when the UI should leave whatever it currently displays unchanged —
/// it is never an error signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailLoaded {
    pub video_id: VideoId,
    pub image_path: Option<PathBuf>,
}
