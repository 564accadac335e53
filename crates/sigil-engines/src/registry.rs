//! Engine registry and trait definitions
//!
//! Each engine is a self-contained module implementing the Engine trait.
//! Engines are registered once at startup; the registry is read-only after
//! that. Only an engine's private working state changes per call.

use serde::Serialize;
use serde_json::{json, Value};
use sigil_core::{EngineInput, EngineLayer, EngineOutput, Error, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The Engine trait: implement this to add a capability provider.
///
/// Dependencies are declared for integrity checking only; the registry
/// never invokes them on an engine's behalf.
#[async_trait::async_trait]
pub trait Engine: Send + Sync {
    /// Unique engine name (e.g. "core", "paradox").
    fn name(&self) -> &str;

    fn version(&self) -> &str {
        "1.0.0"
    }

    /// Symbol emitted by this engine; indexed for lookup.
    fn symbol(&self) -> &str;

    fn layer(&self) -> EngineLayer;

    /// Human-readable description for help surfaces.
    fn description(&self) -> &str;

    /// Names of engines this one expects to be registered.
    fn dependencies(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Directive keywords this engine services.
    fn keywords(&self) -> Vec<&str>;

    /// Free-form configuration snapshot reported in response metadata.
    fn config_snapshot(&self) -> Value {
        json!({})
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput>;
}

/// One `(engine, dependency)` pair that does not resolve.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MissingDependency {
    pub engine: String,
    pub dependency: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DependencyReport {
    pub missing: Vec<MissingDependency>,
}

impl DependencyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            return Ok(());
        }
        let detail = self
            .missing
            .iter()
            .map(|m| Error::missing_dependency(&m.engine, &m.dependency).to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::configuration(detail))
    }
}

impl std::fmt::Display for DependencyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_ok() {
            return f.write_str("all engine dependencies resolve");
        }
        for m in &self.missing {
            writeln!(f, "{} -> {} (missing)", m.engine, m.dependency)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct EngineRegistry {
    engines: Vec<Arc<dyn Engine>>,
    by_name: HashMap<String, usize>,
    by_symbol: HashMap<String, usize>,
    by_keyword: HashMap<String, usize>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine. Returns false if the name is already taken; the
    /// first registration is kept.
    pub fn register(&mut self, engine: impl Engine + 'static) -> bool {
        self.register_shared(Arc::new(engine))
    }

    /// Register an engine the caller keeps a handle to.
    pub fn register_shared<E: Engine + 'static>(&mut self, engine: Arc<E>) -> bool {
        let name = engine.name().to_string();
        if self.by_name.contains_key(&name) {
            warn!("Engine '{}' already registered, ignoring duplicate", name);
            return false;
        }

        let idx = self.engines.len();
        self.by_name.insert(name.clone(), idx);
        self.by_symbol.entry(engine.symbol().to_string()).or_insert(idx);
        for keyword in engine.keywords() {
            let keyword = keyword.to_ascii_uppercase();
            if let Some(&owner) = self.by_keyword.get(&keyword) {
                debug!(
                    "Keyword #{} already serviced by '{}', '{}' not indexed",
                    keyword,
                    self.engines[owner].name(),
                    name
                );
                continue;
            }
            self.by_keyword.insert(keyword, idx);
        }

        debug!("Registered engine '{}' ({})", name, engine.layer().as_str());
        self.engines.push(engine);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Engine>> {
        self.by_name.get(name).map(|&i| self.engines[i].clone())
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<Arc<dyn Engine>> {
        self.by_symbol.get(symbol).map(|&i| self.engines[i].clone())
    }

    pub fn for_keyword(&self, keyword: &str) -> Option<Arc<dyn Engine>> {
        self.by_keyword
            .get(&keyword.to_ascii_uppercase())
            .map(|&i| self.engines[i].clone())
    }

    pub fn list_by_layer(&self, layer: EngineLayer) -> Vec<Arc<dyn Engine>> {
        self.engines
            .iter()
            .filter(|e| e.layer() == layer)
            .cloned()
            .collect()
    }

    /// Declared dependencies of a registered engine.
    pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
        self.by_name.get(name).map(|&i| {
            self.engines[i]
                .dependencies()
                .into_iter()
                .map(String::from)
                .collect()
        })
    }

    /// Engine names in registration order.
    pub fn list(&self) -> Vec<&str> {
        self.engines.iter().map(|e| e.name()).collect()
    }

    /// Every indexed keyword, sorted.
    pub fn keywords(&self) -> Vec<&str> {
        let mut keywords: Vec<&str> = self.by_keyword.keys().map(|k| k.as_str()).collect();
        keywords.sort_unstable();
        keywords
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Walk every declared dependency and report the ones that do not
    /// resolve, each `(engine, dependency)` pair once.
    pub fn check_dependencies(&self) -> DependencyReport {
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        for engine in &self.engines {
            for dep in engine.dependencies() {
                if self.by_name.contains_key(dep) {
                    continue;
                }
                let entry = MissingDependency {
                    engine: engine.name().to_string(),
                    dependency: dep.to_string(),
                };
                if seen.insert(entry.clone()) {
                    missing.push(entry);
                }
            }
        }
        DependencyReport { missing }
    }

    /// Startup gate: a registry with unresolved dependencies must not serve.
    pub fn ensure_integrity(&self) -> Result<()> {
        let report = self.check_dependencies();
        if report.is_ok() {
            info!("Engine registry ready: {} engines, {} keywords", self.len(), self.by_keyword.len());
        } else {
            for m in &report.missing {
                tracing::error!("Engine '{}' depends on unregistered '{}'", m.engine, m.dependency);
            }
        }
        report.into_result()
    }
}
