//! Shared helpers for loader integration tests

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use vtl::resolver::{ResolveError, ResolveResult, ThumbnailResolver};
use vtl::{SoftCache, Thumbnail, ThumbnailLoader, VideoId};

/// Parse the video id encoded in a request path like `/videos/7.jpg`.
pub fn id_from_path(path: &Path) -> VideoId {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse().ok())
        .expect("test paths encode the video id as the file stem")
}

/// Path encoding a video id, for use with [`id_from_path`].
pub fn path_for(id: VideoId) -> PathBuf {
    PathBuf::from(format!("/videos/{id}.jpg"))
}

/// Resolver that records the order requests *start* in, then blocks
/// each resolution until the test releases a token.
///
/// Occupying the worker with one gated request lets a test enqueue
/// several more and observe the order the worker picks them up in.
pub struct GatedResolver {
    starts: Arc<Mutex<Vec<VideoId>>>,
    tokens: Mutex<Receiver<()>>,
}

impl GatedResolver {
    /// Returns the resolver, the shared start log, and the token sender.
    pub fn new() -> (Self, Arc<Mutex<Vec<VideoId>>>, Sender<()>) {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = channel();
        let resolver = Self {
            starts: Arc::clone(&starts),
            tokens: Mutex::new(rx),
        };
        (resolver, starts, tx)
    }
}

impl ThumbnailResolver for GatedResolver {
    fn resolve(&self, path: &Path) -> ResolveResult {
        let id = id_from_path(path);
        self.starts.lock().unwrap().push(id);
        // Block until the test hands out a token; a closed channel
        // releases everything.
        let _ = self.tokens.lock().unwrap().recv();
        Ok(Thumbnail {
            source: path.to_path_buf(),
            image_path: path.to_path_buf(),
        })
    }
}

/// Resolver that fails for paths containing "missing" and panics for
/// paths containing "panic"; succeeds otherwise.
pub struct FlakyResolver;

impl ThumbnailResolver for FlakyResolver {
    fn resolve(&self, path: &Path) -> ResolveResult {
        let text = path.to_string_lossy();
        if text.contains("panic") {
            panic!("resolver blew up for {text}");
        }
        if text.contains("missing") {
            return Err(ResolveError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Ok(Thumbnail {
            source: path.to_path_buf(),
            image_path: path.to_path_buf(),
        })
    }
}

/// Loader over `resolver` with a roomy cache and queue.
pub fn loader_with(resolver: impl ThumbnailResolver + 'static) -> ThumbnailLoader {
    let cache = Arc::new(SoftCache::new(100, 16));
    ThumbnailLoader::new(
        cache,
        Arc::new(resolver),
        Arc::new(vtl::NullMetrics),
        64,
    )
}

/// Wait until `predicate` holds or `timeout` elapses; returns whether
/// it held.
pub fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    predicate()
}

/// Collect loaded video ids until `timeout` passes without a new event.
pub fn drain_loaded(loader: &ThumbnailLoader, timeout: Duration) -> Vec<VideoId> {
    let mut ids = Vec::new();
    while let Some(event) = loader.recv_loaded(timeout) {
        ids.push(event.video_id);
    }
    ids
}
