//! Prioritized asynchronous thumbnail loading
//!
//! The [`ThumbnailLoader`] keeps resolution off the UI thread: requests
//! go into a visible or background lane, a single worker drains them
//! visible-first, and results come back over an event channel.

mod dispatcher;
mod request;

pub use dispatcher::ThumbnailLoader;
pub use request::{CancelHandle, LoadRequest, ThumbnailLoaded};
