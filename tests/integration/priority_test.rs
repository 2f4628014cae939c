//! Scheduling-order and cancellation tests for the thumbnail loader
//!
//! These tests occupy the worker with a gated request so that
//! subsequently enqueued requests pile up in the lanes, then release
//! the gate and observe the order the worker started them in.

use std::collections::HashSet;
use std::time::Duration;

use super::helpers::{drain_loaded, loader_with, path_for, wait_until, GatedResolver};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn visible_lane_starts_before_background_lane() {
    let (resolver, starts, tokens) = GatedResolver::new();
    let loader = loader_with(resolver);

    // Occupy the worker so the next three requests stay queued.
    loader.enqueue(0, path_for(0), true);
    assert!(wait_until(WAIT, || starts.lock().unwrap().len() == 1));

    loader.enqueue(1, path_for(1), true);
    loader.enqueue(2, path_for(2), false);
    loader.enqueue(3, path_for(3), true);

    for _ in 0..4 {
        tokens.send(()).unwrap();
    }

    assert!(wait_until(WAIT, || starts.lock().unwrap().len() == 4));
    assert_eq!(*starts.lock().unwrap(), vec![0, 1, 3, 2]);
}

#[test]
fn visibility_change_cancels_unstarted_and_promotes() {
    let (resolver, starts, tokens) = GatedResolver::new();
    let loader = loader_with(resolver);

    loader.enqueue(0, path_for(0), true);
    assert!(wait_until(WAIT, || starts.lock().unwrap().len() == 1));

    // 4 is visible but will scroll away; 5 is background and will
    // scroll into view.
    loader.enqueue(4, path_for(4), true);
    loader.enqueue(5, path_for(5), false);

    let visible: HashSet<_> = [5].into_iter().collect();
    loader.update_visible(&visible);

    drop(tokens); // release everything

    let loaded = drain_loaded(&loader, Duration::from_millis(300));
    assert!(loaded.contains(&5), "promoted request should complete");
    assert!(!loaded.contains(&4), "canceled request must not notify");
    assert!(
        !starts.lock().unwrap().contains(&4),
        "canceled request must never start"
    );
}

#[test]
fn background_from_the_start_is_not_canceled_by_visibility_updates() {
    let (resolver, _starts, tokens) = GatedResolver::new();
    let loader = loader_with(resolver);

    loader.enqueue(0, path_for(0), true);
    loader.enqueue(7, path_for(7), false);

    // 7 was never visible; an update that does not include it must
    // leave it queued rather than cancel it.
    let visible: HashSet<_> = [9].into_iter().collect();
    loader.update_visible(&visible);

    drop(tokens);

    let loaded = drain_loaded(&loader, Duration::from_millis(300));
    assert!(loaded.contains(&7), "background request should still load");
}

#[test]
fn reenqueue_supersedes_and_notifies_once() {
    let (resolver, starts, tokens) = GatedResolver::new();
    let loader = loader_with(resolver);

    loader.enqueue(0, path_for(0), true);
    assert!(wait_until(WAIT, || starts.lock().unwrap().len() == 1));

    // Two enqueues for the same id: the first queued instance is
    // superseded before it can start.
    loader.enqueue(8, path_for(8), false);
    loader.enqueue(8, path_for(8), true);

    drop(tokens);

    let loaded = drain_loaded(&loader, Duration::from_millis(300));
    let count = loaded.iter().filter(|id| **id == 8).count();
    assert_eq!(count, 1, "exactly one notification per id, got {loaded:?}");
    assert_eq!(
        starts.lock().unwrap().iter().filter(|id| **id == 8).count(),
        1,
        "the superseded request must not start"
    );
    assert!(!loader.is_pending(8));
}

#[test]
fn in_flight_request_survives_losing_visibility() {
    let (resolver, starts, tokens) = GatedResolver::new();
    let loader = loader_with(resolver);

    loader.enqueue(6, path_for(6), true);
    assert!(wait_until(WAIT, || starts.lock().unwrap().len() == 1));

    // 6 is already in flight; dropping it from the visible set must not
    // abandon the work.
    loader.update_visible(&HashSet::new());
    tokens.send(()).unwrap();

    let loaded = drain_loaded(&loader, WAIT);
    assert!(loaded.contains(&6), "in-flight work completes and notifies");
    assert!(
        loader.cache().load(6).is_some(),
        "completed work still populates the cache"
    );
}
