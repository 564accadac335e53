//! Paradox engine - detection, threads, dimensional refraction, exploration
//!
//! The paradox registry and the dimension registry are process-wide and
//! shared across sessions, each behind its own mutex. Lock order when both
//! the paradox table and the random source are needed: paradoxes, then rng.
//!
//! The engine never returns `Err`: "not found", "unknown dimension" and the
//! recursion safety halt are informational outputs.

pub mod detect;
pub mod model;

pub use model::{complexity, resolution_probability, Dimension, DimensionExploration, ParadoxKind, ParadoxRecord};

use crate::registry::Engine;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use sigil_core::{EngineInput, EngineLayer, EngineOutput, RecursionGauge, Result};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

pub const PARADOX_SYMBOL: &str = "∞";
const RESOLVED_GLYPH: &str = "✧";
const OVERLOAD_MARKER: &str = "⚠ PARADOX OVERLOAD";

/// What one invocation asks for, in dispatch precedence order.
#[derive(Debug, Clone, PartialEq)]
enum Request {
    Thread(String),
    Resolve(String),
    Explore(String),
    Analyze,
}

impl Request {
    fn from_input(input: &EngineInput) -> Self {
        let params = &input.params;
        // Under THREAD/RESOLVE/DIMENSION the keyword's own field (or a bare
        // value) carries the argument.
        let keyed = |keyword: &str, field: &str| {
            if input.keyword_is(keyword) {
                params.text(field).or_else(|| params.text(sigil_core::directive::BARE_PARAM))
            } else {
                None
            }
        };

        if let Some(name) = params.text("THREAD").or_else(|| keyed("THREAD", "NAME")) {
            return Self::Thread(name);
        }
        if let Some(id) = params.text("RESOLVE").or_else(|| keyed("RESOLVE", "ID")) {
            return Self::Resolve(id.trim().to_string());
        }
        if let Some(name) = params.text("DIMENSION").or_else(|| keyed("DIMENSION", "NAME")) {
            return Self::Explore(name);
        }
        Self::Analyze
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct ParadoxEngine {
    paradoxes: Mutex<HashMap<String, ParadoxRecord>>,
    explorations: Mutex<HashMap<Dimension, DimensionExploration>>,
    rng: Mutex<StdRng>,
    gauge: RecursionGauge,
}

impl Default for ParadoxEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ParadoxEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic draws, for reproducible runs and tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            paradoxes: Mutex::new(HashMap::new()),
            explorations: Mutex::new(HashMap::new()),
            rng: Mutex::new(rng),
            gauge: RecursionGauge::new(),
        }
    }

    /// Share the orchestrator's process-wide recursion gauge.
    pub fn with_gauge(mut self, gauge: RecursionGauge) -> Self {
        self.gauge = gauge;
        self
    }

    pub fn paradox_count(&self) -> usize {
        lock(&self.paradoxes).len()
    }

    pub fn paradox(&self, id: &str) -> Option<ParadoxRecord> {
        lock(&self.paradoxes).get(id).cloned()
    }

    /// Open paradoxes, oldest first.
    pub fn open_paradoxes(&self) -> Vec<ParadoxRecord> {
        let mut records: Vec<ParadoxRecord> = lock(&self.paradoxes).values().cloned().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        records
    }

    pub fn exploration(&self, dimension: Dimension) -> Option<DimensionExploration> {
        lock(&self.explorations).get(&dimension).cloned()
    }

    /// Build a record with a fresh id and 2-3 random dimensions. Does not
    /// register it.
    fn synthesize(&self, kind: ParadoxKind, description: String, source: &str) -> ParadoxRecord {
        let mut rng = lock(&self.rng);
        let bytes: [u8; 16] = rng.gen();
        let id = uuid::Builder::from_random_bytes(bytes).into_uuid().simple().to_string();
        let count = rng.gen_range(2..=3);
        let dimensions: Vec<Dimension> = Dimension::ALL
            .choose_multiple(&mut *rng, count)
            .copied()
            .collect();

        ParadoxRecord {
            id: format!("px-{}", &id[..12]),
            kind,
            description,
            dimensions,
            attempts: 0,
            complexity: complexity(source),
            created_at: Utc::now(),
            last_attempt: None,
        }
    }

    fn register(&self, record: ParadoxRecord) {
        debug!("Paradox {} registered ({})", record.id, record.kind.as_str());
        lock(&self.paradoxes).insert(record.id.clone(), record);
    }

    fn open_thread(&self, name: &str) -> EngineOutput {
        let record = self.synthesize(
            ParadoxKind::Symbolic,
            format!("paradox thread '{}'", name),
            name,
        );
        let id = record.id.clone();
        let dimensions: Vec<&str> = record.dimensions.iter().map(|d| d.as_str()).collect();
        let text = format!(
            "{} paradox thread '{}' opened as {}\n  dimensions: {}\n  complexity: {:.2}",
            PARADOX_SYMBOL,
            name,
            id,
            dimensions.join(", "),
            record.complexity
        );
        let metadata = json!({
            "action": "thread",
            "id": id,
            "dimensions": dimensions,
            "complexity": record.complexity,
        });
        info!("Opened paradox thread '{}' as {}", name, id);
        self.register(record);

        EngineOutput::text(text)
            .with_glyph(PARADOX_SYMBOL)
            .with_paradoxes([id])
            .with_metadata(metadata)
    }

    fn resolve(&self, id: &str) -> EngineOutput {
        let mut paradoxes = lock(&self.paradoxes);
        let Some(record) = paradoxes.get_mut(id) else {
            return EngineOutput::text(format!(
                "{} paradox {} not found; nothing to resolve",
                PARADOX_SYMBOL, id
            ))
            .with_metadata(json!({ "action": "resolve", "status": "not_found", "id": id }));
        };

        if self.gauge.at_ceiling() {
            warn!("Resolution of {} halted: recursion gauge at ceiling", id);
            return EngineOutput::text(format!(
                "⚠ recursion ceiling reached; resolution of {} halted for safety",
                id
            ))
            .with_paradoxes([id.to_string()])
            .with_metadata(json!({ "action": "resolve", "status": "halted", "id": id }));
        }

        record.attempts += 1;
        record.last_attempt = Some(Utc::now());
        let attempts = record.attempts;
        let probability = record.resolution_probability();
        let dimensions = record.dimensions.clone();

        let mut path = Vec::new();
        let mut resolved = false;
        {
            let mut rng = lock(&self.rng);
            for dimension in dimensions {
                path.push(dimension.as_str());
                if rng.gen::<f64>() < probability {
                    resolved = true;
                    break;
                }
            }
        }
        let route = path.join(" → ");

        if resolved {
            paradoxes.remove(id);
            info!("Paradox {} resolved via {} (attempt {})", id, route, attempts);
            return EngineOutput::text(format!(
                "{} paradox {} resolved through dimensional refraction: {} (attempt {})",
                RESOLVED_GLYPH, id, route, attempts
            ))
            .with_glyph(RESOLVED_GLYPH)
            .with_metadata(json!({
                "action": "resolve",
                "status": "resolved",
                "id": id,
                "path": path,
                "attempts": attempts,
                "probability": probability,
            }));
        }

        debug!("Paradox {} unresolved after attempt {} (p={:.2})", id, attempts, probability);
        EngineOutput::text(format!(
            "{} refraction of {} failed along {} (attempt {}, p={:.2}); the paradox persists",
            PARADOX_SYMBOL, id, route, attempts, probability
        ))
        .with_glyph(PARADOX_SYMBOL)
        .with_paradoxes([id.to_string()])
        .with_metadata(json!({
            "action": "resolve",
            "status": "unresolved",
            "id": id,
            "path": path,
            "attempts": attempts,
            "probability": probability,
        }))
    }

    fn explore(&self, name: &str, input: &EngineInput) -> EngineOutput {
        let dimension = match name.parse::<Dimension>() {
            Ok(dimension) => dimension,
            Err(e) => {
                let catalog = Dimension::catalog_names();
                return EngineOutput::text(format!("{}; valid dimensions: {}", e, catalog.join(", "))).with_metadata(
                    json!({
                        "action": "dimension",
                        "status": "unknown_dimension",
                        "dimension": name,
                        "catalog": catalog,
                    }),
                );
            }
        };

        let assigned: BTreeSet<String> = lock(&self.paradoxes)
            .values()
            .filter(|r| r.dimensions.contains(&dimension))
            .map(|r| r.id.clone())
            .collect();

        let length = input.text.chars().count() as f64;
        let energy = (length * 0.5 * input.context.mode.multiplier() * dimension.multiplier()).min(100.0);

        let lowered = input.text.to_lowercase();
        let hits = dimension
            .keywords()
            .iter()
            .filter(|k| lowered.contains(*k))
            .count();
        let resonance = (20.0 * hits as f64 + 10.0 * assigned.len() as f64).min(100.0);

        let record = DimensionExploration {
            dimension,
            symbol: dimension.symbol().to_string(),
            energy,
            resonance,
            paradoxes: assigned.clone(),
            explored_at: Utc::now(),
        };
        lock(&self.explorations).insert(dimension, record);

        debug!("Explored {}: energy {:.1}, resonance {:.1}", dimension, energy, resonance);
        EngineOutput::text(format!(
            "{} dimension {} explored: energy {:.1}, resonance {:.1}, {} paradox(es) anchored",
            dimension.symbol(),
            dimension,
            energy,
            resonance,
            assigned.len()
        ))
        .with_glyph(dimension.symbol())
        .with_paradoxes(assigned.iter().cloned())
        .with_metadata(json!({
            "action": "dimension",
            "status": "explored",
            "dimension": dimension.as_str(),
            "energy": energy,
            "resonance": resonance,
        }))
    }

    fn analyze(&self, text: &str) -> EngineOutput {
        let (detections, overloaded) = detect::scan(text);
        if detections.is_empty() {
            return EngineOutput::text("No paradoxes detected in the input.")
                .with_metadata(json!({ "action": "analyze", "detected": 0, "overloaded": false }));
        }

        let mut lines = vec![format!(
            "{} {} paradox signal(s) detected:",
            PARADOX_SYMBOL,
            detections.len()
        )];
        let mut ids = Vec::with_capacity(detections.len());
        for detection in detections {
            let record = self.synthesize(detection.kind, detection.description, &detection.excerpt);
            lines.push(format!("  - [{}] {}: {}", record.kind.as_str(), record.id, record.description));
            ids.push(record.id.clone());
            self.register(record);
        }
        if overloaded {
            warn!("Paradox detection cap reached");
            lines.push(format!(
                "{}: detection cap of {} reached",
                OVERLOAD_MARKER,
                sigil_core::MAX_PARADOX_DETECTIONS
            ));
        }

        info!("Registered {} paradox(es) from analysis", ids.len());
        EngineOutput::text(lines.join("\n"))
            .with_glyph(PARADOX_SYMBOL)
            .with_archetype("The Trickster")
            .with_metadata(json!({ "action": "analyze", "detected": ids.len(), "overloaded": overloaded }))
            .with_paradoxes(ids)
    }
}

#[async_trait::async_trait]
impl Engine for ParadoxEngine {
    fn name(&self) -> &str {
        "paradox"
    }

    fn version(&self) -> &str {
        "2.1.0"
    }

    fn symbol(&self) -> &str {
        PARADOX_SYMBOL
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Meta
    }

    fn description(&self) -> &str {
        "Detects paradox signals, opens paradox threads, explores dimensions, \
         and attempts resolution by dimensional refraction."
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["core"]
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["PARADOX", "THREAD", "RESOLVE", "DIMENSION"]
    }

    fn config_snapshot(&self) -> Value {
        json!({
            "open_paradoxes": self.paradox_count(),
            "dimensions": Dimension::catalog_names(),
            "max_detections": sigil_core::MAX_PARADOX_DETECTIONS,
        })
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let output = match Request::from_input(&input) {
            Request::Thread(name) => self.open_thread(&name),
            Request::Resolve(id) => self.resolve(&id),
            Request::Explore(name) => self.explore(&name, &input),
            Request::Analyze => self.analyze(&input.text),
        };
        Ok(output)
    }
}
