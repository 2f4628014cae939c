//! Thumbnail caching
//!
//! Two layers: a bounded LRU ([`LruCache`]) giving deterministic
//! eviction, and a soft-hold wrapper ([`SoftCache`]) that lets values
//! for off-screen items be reclaimed while the LRU keeps tracking
//! their logical presence and recency.

mod lru;
mod soft;

pub use lru::LruCache;
pub use soft::SoftCache;
