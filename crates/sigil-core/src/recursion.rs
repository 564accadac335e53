//! Hard ceilings and the process-wide recursion gauge

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Maximum recursion depth for any session.
pub const MAX_RECURSION_DEPTH: usize = 10;

/// Maximum paradox detections registered by one analysis call.
pub const MAX_PARADOX_DETECTIONS: usize = 10;

/// Process-wide recursion depth, shared by the orchestrator and any engine
/// that must refuse work while a recursion is in flight.
#[derive(Clone, Debug, Default)]
pub struct RecursionGauge(Arc<AtomicUsize>);

impl RecursionGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn at_ceiling(&self) -> bool {
        self.current() >= MAX_RECURSION_DEPTH
    }

    /// Raise the gauge by `by`. The returned guard lowers it again on drop.
    pub fn raise(&self, by: usize) -> GaugeGuard {
        self.0.fetch_add(by, Ordering::SeqCst);
        GaugeGuard {
            gauge: self.clone(),
            by,
        }
    }
}

#[must_use = "dropping the guard immediately lowers the gauge"]
#[derive(Debug)]
pub struct GaugeGuard {
    gauge: RecursionGauge,
    by: usize,
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        self.gauge.0.fetch_sub(self.by, Ordering::SeqCst);
    }
}
