//! Metrics sink handed to the pool at construction.

use std::time::Duration;

/// Hooks invoked as work is routed and executed.
///
/// `on_routed` runs on the submitting thread, `on_executed` on the lane
/// thread between items. Implementations must be cheap.
pub trait DispatchObserver: Send + Sync {
    /// An item was accepted by `lane`'s queue.
    fn on_routed(&self, _lane: usize, _routing_key: &str) {}

    /// `lane` finished executing an item for `routing_key`.
    fn on_executed(&self, lane: usize, routing_key: &str, elapsed: Duration);
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DispatchObserver for NoopObserver {
    fn on_executed(&self, _lane: usize, _routing_key: &str, _elapsed: Duration) {}
}
