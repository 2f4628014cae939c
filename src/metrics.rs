//! Metrics collaborator interface.
//!
//! The cache and loader report hits, misses, and timings to a
//! [`MetricsSink`]. Reporting is best-effort: sinks are called
//! fire-and-forget and nothing in the caching or loading path depends
//! on their effects. The hit *ratio* is derivable from the hit/miss
//! stream, and [`SoftCache::hit_rate`](crate::cache::SoftCache::hit_rate)
//! exposes it directly.

use std::time::Duration;

/// Trait for metrics collectors.
///
/// Implementors must be thread-safe (the worker thread reports timings
/// while the UI thread reports cache lookups) and must not panic.
pub trait MetricsSink: Send + Sync {
    /// A cache lookup found a usable value.
    fn record_hit(&self);

    /// A cache lookup found nothing (including reclaimed handles).
    fn record_miss(&self);

    /// A named operation took `duration`.
    fn record_timing(&self, name: &str, duration: Duration);
}

/// Sink that discards everything. The default when no collector is wired up.
#[derive(Debug, Default)]
pub struct NullMetrics;

impl MetricsSink for NullMetrics {
    fn record_hit(&self) {}

    fn record_miss(&self) {}

    fn record_timing(&self, _name: &str, _duration: Duration) {}
}
