//! Per-session recursion counters
//!
//! One entry per `(session, user)` key while a chain is executing for it.
//! Entries are created at chain start and removed when the scope guard
//! drops, on every exit path. Same-key concurrent chains share one entry;
//! callers serialize requests per session.

use dashmap::DashMap;
use sigil_core::recursion::GaugeGuard;
use sigil_core::{RecursionGauge, SessionKey, MAX_RECURSION_DEPTH};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct SessionDepths {
    depths: Arc<DashMap<SessionKey, usize>>,
}

impl SessionDepths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self, key: &SessionKey) -> Option<usize> {
        self.depths.get(key).map(|d| *d)
    }

    pub fn active(&self) -> usize {
        self.depths.len()
    }

    /// Start a chain for `key` with its counter at zero.
    pub fn enter(&self, key: SessionKey) -> SessionScope {
        self.depths.insert(key.clone(), 0);
        debug!("Session {} counter opened", key);
        SessionScope {
            depths: self.clone(),
            key,
        }
    }
}

/// Removes the session's counter on drop.
#[must_use = "dropping the scope immediately removes the session counter"]
#[derive(Debug)]
pub struct SessionScope {
    depths: SessionDepths,
    key: SessionKey,
}

impl SessionScope {
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn depth(&self) -> usize {
        self.depths.depth(&self.key).unwrap_or(0)
    }

    pub fn at_ceiling(&self) -> bool {
        self.depth() >= MAX_RECURSION_DEPTH
    }

    /// Raise this session's counter (and the process-wide gauge) by `by`,
    /// unless that would pass the ceiling. The returned guard restores both
    /// to their previous values when dropped.
    pub fn try_raise(&self, by: usize, gauge: &RecursionGauge) -> Option<DepthGuard> {
        let previous = self.depth();
        let next = previous.checked_add(by)?;
        if next > MAX_RECURSION_DEPTH {
            return None;
        }
        self.depths.depths.insert(self.key.clone(), next);
        Some(DepthGuard {
            depths: self.depths.clone(),
            key: self.key.clone(),
            previous,
            _gauge: gauge.raise(by),
        })
    }
}

impl Drop for SessionScope {
    fn drop(&mut self) {
        self.depths.depths.remove(&self.key);
        debug!("Session {} counter removed", self.key);
    }
}

/// Restores a session counter to its pre-recursion value on drop.
#[must_use = "dropping the guard immediately restores the counter"]
#[derive(Debug)]
pub struct DepthGuard {
    depths: SessionDepths,
    key: SessionKey,
    previous: usize,
    _gauge: GaugeGuard,
}

impl DepthGuard {
    pub fn previous(&self) -> usize {
        self.previous
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        // The scope may already be gone if it dropped first; don't resurrect it.
        if let Some(mut depth) = self.depths.depths.get_mut(&self.key) {
            *depth = self.previous;
        }
    }
}
