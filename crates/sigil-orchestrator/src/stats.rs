//! Per-engine runtime counters, owned and updated by the orchestrator

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineRuntimeState {
    pub invocations: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub avg_latency_ms: f64,
    /// Rolling fraction of invocations that returned Ok.
    pub success_rate: f64,
    /// Rolling output volume in characters per second.
    pub output_rate: f64,
}

impl EngineRuntimeState {
    /// Fold one invocation into the running averages:
    /// `new = (old * (n - 1) + sample) / n` with `n` the post-increment count.
    pub fn record(&mut self, latency: Duration, success: bool, output_chars: usize) {
        self.invocations += 1;
        self.last_used = Some(Utc::now());

        let n = self.invocations as f64;
        let latency_ms = latency.as_secs_f64() * 1000.0;
        let secs = latency.as_secs_f64().max(1e-6);
        let rate = output_chars as f64 / secs;

        self.avg_latency_ms = running_average(self.avg_latency_ms, latency_ms, n);
        self.success_rate = running_average(self.success_rate, if success { 1.0 } else { 0.0 }, n);
        self.output_rate = running_average(self.output_rate, rate, n);
    }
}

pub fn running_average(old: f64, sample: f64, n: f64) -> f64 {
    (old * (n - 1.0) + sample) / n
}

#[derive(Debug, Default)]
pub struct RuntimeStats {
    engines: DashMap<String, EngineRuntimeState>,
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, engine: &str, latency: Duration, success: bool, output_chars: usize) -> EngineRuntimeState {
        let mut entry = self.engines.entry(engine.to_string()).or_default();
        entry.record(latency, success, output_chars);
        entry.clone()
    }

    pub fn get(&self, engine: &str) -> Option<EngineRuntimeState> {
        self.engines.get(engine).map(|s| s.clone())
    }

    /// All engines' counters, sorted by engine name.
    pub fn snapshot(&self) -> Vec<(String, EngineRuntimeState)> {
        let mut all: Vec<(String, EngineRuntimeState)> = self
            .engines
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}
