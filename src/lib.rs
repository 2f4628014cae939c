//! Video Thumbnail Loader (VTL) Library
//!
//! Thumbnail caching and prioritized asynchronous loading for a
//! desktop video-library manager. Keeps image retrieval off the UI
//! thread, bounds memory in arbitrarily large libraries, favors
//! on-screen items, and cancels stale work when the viewport moves.

pub mod cache;
pub mod config;
pub mod loader;
pub mod metrics;
pub mod resolver;

/// Identifier of a video in the library.
pub type VideoId = i64;

pub use cache::{LruCache, SoftCache};
pub use config::ThumbnailConfig;
pub use loader::{ThumbnailLoaded, ThumbnailLoader};
pub use metrics::{MetricsSink, NullMetrics};
pub use resolver::{FsResolver, ResolveError, Thumbnail, ThumbnailResolver};
