//! The orchestrator: picks a default engine when the text carries no
//! directives, otherwise runs the directive chain in priority order.
//!
//! Every failure except a startup configuration fault comes back as a
//! `Response` with `success = false`; `process_input` itself never errors.

use crate::chain::DirectiveChain;
use crate::config::SigilConfig;
use crate::response::Response;
use crate::session::{SessionDepths, SessionScope};
use crate::stats::{EngineRuntimeState, RuntimeStats};
use serde_json::json;
use sigil_core::{
    parser, BrainwaveMode, ChainContext, Directive, EngineInput, EngineLayer, EngineOutput, Error, RecursionGauge,
    Result, SessionKey, MAX_RECURSION_DEPTH,
};
use sigil_engines::{DependencyReport, Engine, EngineRegistry, ParadoxEngine};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Engine that receives RECURSE passes.
pub const RECURSION_TARGET: &str = "core";

pub struct Orchestrator {
    registry: Arc<EngineRegistry>,
    config: SigilConfig,
    gauge: RecursionGauge,
    stats: RuntimeStats,
    sessions: SessionDepths,
    paradox: Option<Arc<ParadoxEngine>>,
}

impl Orchestrator {
    /// Wrap a populated registry. Fails if any engine dependency or any
    /// mode → engine mapping does not resolve.
    pub fn new(registry: EngineRegistry, config: SigilConfig) -> Result<Self> {
        Self::with_gauge(registry, config, RecursionGauge::new())
    }

    /// Like `new`, sharing `gauge` with engines that watch recursion.
    pub fn with_gauge(registry: EngineRegistry, config: SigilConfig, gauge: RecursionGauge) -> Result<Self> {
        registry.ensure_integrity()?;
        config.modes.ensure_resolves(&registry.list())?;
        info!(
            "Orchestrator ready: {} engines, default mode {}",
            registry.len(),
            config.orchestrator.default_mode
        );
        Ok(Self {
            registry: Arc::new(registry),
            config,
            gauge,
            stats: RuntimeStats::new(),
            sessions: SessionDepths::new(),
            paradox: None,
        })
    }

    /// Builtin engines, with the paradox engine seeded from config and
    /// sharing this orchestrator's recursion gauge.
    pub fn from_config(config: SigilConfig) -> Result<Self> {
        let gauge = RecursionGauge::new();
        let paradox = match config.paradox.seed {
            Some(seed) => ParadoxEngine::seeded(seed),
            None => ParadoxEngine::new(),
        };
        let paradox = Arc::new(paradox.with_gauge(gauge.clone()));
        let registry = sigil_engines::create_default_registry_with_paradox(paradox.clone());

        let mut orchestrator = Self::with_gauge(registry, config, gauge)?;
        orchestrator.paradox = Some(paradox);
        Ok(orchestrator)
    }

    pub fn config(&self) -> &SigilConfig {
        &self.config
    }

    pub fn registry(&self) -> &EngineRegistry {
        &self.registry
    }

    pub fn gauge(&self) -> &RecursionGauge {
        &self.gauge
    }

    /// The builtin paradox engine, when built via `from_config`.
    pub fn paradox_engine(&self) -> Option<&Arc<ParadoxEngine>> {
        self.paradox.as_ref()
    }

    // ============================================================
    // Processing
    // ============================================================

    pub async fn process_input(
        &self,
        text: &str,
        session_id: &str,
        user_id: &str,
        mode: Option<BrainwaveMode>,
    ) -> Response {
        let mode = mode.unwrap_or(self.config.orchestrator.default_mode);

        if !parser::has_directives(text) {
            return self.process_default(text, session_id, user_id, mode).await;
        }

        let chain = DirectiveChain::build(text, &self.registry);
        if !chain.is_valid() {
            let summary = chain.error_summary();
            warn!("Chain rejected: {}", summary);
            let mut response = Response::rejected(mode, summary);
            response.metadata.warnings = chain.warnings();
            return response;
        }

        let scope = self.sessions.enter(SessionKey::for_user(session_id, user_id));
        info!("Executing chain [{}] for {}", chain.keywords().join(", "), scope.key());
        self.execute_chain(&chain, text, session_id, user_id, mode, &scope).await
    }

    async fn process_default(&self, text: &str, session_id: &str, user_id: &str, mode: BrainwaveMode) -> Response {
        let engine_name = self.config.modes.engine_for(mode);
        let mut response = Response::new(mode);

        // Mappings are checked at construction; this only trips if the
        // registry and config were swapped out from under us.
        let Some(engine) = self.registry.get(engine_name) else {
            response.fail(Error::configuration(format!("mode '{}' has no engine '{}'", mode, engine_name)).to_string());
            return response;
        };
        debug!("No directives; routing to '{}' for mode {}", engine_name, mode);

        let input = EngineInput {
            text: text.to_string(),
            keyword: None,
            params: Default::default(),
            context: ChainContext {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                mode,
                ..Default::default()
            },
        };

        match self.invoke(engine.as_ref(), input).await {
            Ok(output) => {
                response.absorb(output, "");
            }
            Err(e) => {
                error!("Default engine '{}' failed: {}", engine_name, e);
                response.fail(e.to_string());
            }
        }
        self.describe(&mut response, engine.as_ref());
        response
    }

    async fn execute_chain(
        &self,
        chain: &DirectiveChain,
        original: &str,
        session_id: &str,
        user_id: &str,
        mode: BrainwaveMode,
        scope: &SessionScope,
    ) -> Response {
        let separator = self.config.orchestrator.separator.as_str();
        let budget = self.config.orchestrator.chain_budget_ms.map(Duration::from_millis);
        let started = Instant::now();

        let mut response = Response::new(mode);
        response.metadata.warnings = chain.warnings();
        let mut current = original.to_string();
        let mut last: Option<Arc<dyn Engine>> = None;

        for directive in &chain.directives {
            let Some(engine) = self.resolve(directive) else {
                warn!("No engine services #{}; skipping", directive.keyword);
                response.metadata.skipped.push(directive.keyword.clone());
                continue;
            };

            if scope.at_ceiling() {
                warn!("Recursion ceiling reached for {}; stopping chain", scope.key());
                response.metadata.halted = Some(format!("recursion ceiling of {} reached", MAX_RECURSION_DEPTH));
                break;
            }
            if let Some(budget) = budget {
                if started.elapsed() >= budget {
                    warn!("Chain budget of {:?} spent before #{}; stopping", budget, directive.keyword);
                    response.metadata.halted = Some(format!("chain budget of {}ms exhausted", budget.as_millis()));
                    break;
                }
            }

            let input = self.chain_input(&current, directive, &response, session_id, user_id, mode, scope.depth());
            response.metadata.chain.push(directive.keyword.clone());

            let result = self.invoke(engine.as_ref(), input).await;
            last = Some(engine.clone());
            match result {
                Ok(output) => {
                    current = output.text.clone();
                    response.absorb(output, separator);
                }
                Err(e) => {
                    error!("Engine '{}' failed on #{}: {}", engine.name(), directive.keyword, e);
                    response.fail(e.to_string());
                    break;
                }
            }

            if directive.keyword == "RECURSE" {
                if let Err(e) = self.recurse(directive, &mut response, session_id, user_id, mode, scope).await {
                    response.fail(e.to_string());
                    break;
                }
            }
        }

        if let Some(engine) = last {
            self.describe(&mut response, engine.as_ref());
        }
        info!(
            "Chain for {} finished: success={} ({} ms)",
            scope.key(),
            response.success,
            started.elapsed().as_millis()
        );
        response
    }

    /// One RECURSE pass: raise the session counter by the requested depth
    /// and run the recursion target over everything accumulated so far.
    /// The counter is restored when the guard drops, on every path.
    async fn recurse(
        &self,
        directive: &Directive,
        response: &mut Response,
        session_id: &str,
        user_id: &str,
        mode: BrainwaveMode,
        scope: &SessionScope,
    ) -> Result<()> {
        let requested = requested_depth(directive);
        let Some(guard) = scope.try_raise(requested, &self.gauge) else {
            warn!(
                "RECURSE by {} from depth {} would pass the ceiling; refused",
                requested,
                scope.depth()
            );
            response
                .metadata
                .warnings
                .push(format!("recursion by {} refused at depth {}", requested, scope.depth()));
            return Ok(());
        };

        let Some(target) = self.registry.get(RECURSION_TARGET) else {
            warn!("Recursion target '{}' is not registered; skipping pass", RECURSION_TARGET);
            response.metadata.skipped.push(RECURSION_TARGET.to_string());
            return Ok(());
        };

        debug!("Recursing from depth {} to {}", guard.previous(), scope.depth());
        let accumulated = response.text.clone();
        let input = self.chain_input(&accumulated, directive, response, session_id, user_id, mode, scope.depth());
        let output = self.invoke(target.as_ref(), input).await.map_err(|e| {
            error!("Recursion pass failed: {}", e);
            e
        })?;
        response.absorb(output, &self.config.orchestrator.separator);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn chain_input(
        &self,
        text: &str,
        directive: &Directive,
        response: &Response,
        session_id: &str,
        user_id: &str,
        mode: BrainwaveMode,
        depth: usize,
    ) -> EngineInput {
        EngineInput {
            text: text.to_string(),
            keyword: Some(directive.keyword.clone()),
            params: directive.params.clone(),
            context: ChainContext {
                session_id: session_id.to_string(),
                user_id: user_id.to_string(),
                mode,
                glyphs: response.glyphs.clone(),
                archetypes: response.archetypes.clone(),
                paradoxes: response.paradoxes.clone(),
                depth,
            },
        }
    }

    /// Engine by the directive's declared engine name, then by keyword.
    fn resolve(&self, directive: &Directive) -> Option<Arc<dyn Engine>> {
        directive
            .engine
            .as_deref()
            .and_then(|name| self.registry.get(name))
            .or_else(|| self.registry.for_keyword(&directive.keyword))
    }

    /// Invoke and record runtime stats. Errors are tagged with the engine.
    async fn invoke(&self, engine: &dyn Engine, input: EngineInput) -> Result<EngineOutput> {
        let started = Instant::now();
        let result = engine.invoke(input).await;
        let elapsed = started.elapsed();

        let chars = result.as_ref().map(|o| o.text.chars().count()).unwrap_or(0);
        let state = self.stats.record(engine.name(), elapsed, result.is_ok(), chars);
        debug!(
            "'{}' took {:?} (avg {:.2}ms over {})",
            engine.name(),
            elapsed,
            state.avg_latency_ms,
            state.invocations
        );

        result.map_err(|e| match e {
            Error::EngineFault { .. } => e,
            other => Error::engine_fault(engine.name(), other.to_string()),
        })
    }

    fn describe(&self, response: &mut Response, engine: &dyn Engine) {
        let performance = self.stats.get(engine.name()).unwrap_or_default();
        let meta = &mut response.metadata;
        meta.engine = Some(engine.name().to_string());
        meta.version = Some(engine.version().to_string());
        meta.usage_count = performance.invocations;
        meta.performance = performance;
        meta.config = engine.config_snapshot();
    }

    // ============================================================
    // Introspection
    // ============================================================

    pub fn keywords(&self) -> Vec<&str> {
        self.registry.keywords()
    }

    /// One-line help for a keyword, if any engine services it.
    pub fn keyword_help(&self, keyword: &str) -> Option<String> {
        let keyword = keyword.trim().trim_start_matches('#').to_ascii_uppercase();
        self.registry.for_keyword(&keyword)?;
        parser::keyword_help(&keyword)
    }

    pub fn engines_by_layer(&self, layer: EngineLayer) -> Vec<Arc<dyn Engine>> {
        self.registry.list_by_layer(layer)
    }

    pub fn runtime_state(&self, engine: &str) -> Option<EngineRuntimeState> {
        self.stats.get(engine)
    }

    pub fn runtime_snapshot(&self) -> Vec<(String, EngineRuntimeState)> {
        self.stats.snapshot()
    }

    pub fn dependency_report(&self) -> DependencyReport {
        self.registry.check_dependencies()
    }

    /// Current recursion depth of an executing chain; `None` when the
    /// session has no chain in flight.
    pub fn session_depth(&self, session_id: &str, user_id: &str) -> Option<usize> {
        self.sessions.depth(&SessionKey::for_user(session_id, user_id))
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.active()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "engines": self.registry.list(),
            "keywords": self.keywords(),
            "recursion": self.gauge.current(),
            "active_sessions": self.active_sessions(),
            "runtime": self.runtime_snapshot().into_iter().collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

/// Requested RECURSE depth, clamped to `1..=MAX_RECURSION_DEPTH`.
fn requested_depth(directive: &Directive) -> usize {
    let raw = directive
        .param_or_bare("DEPTH")
        .and_then(|v| v.as_number().or_else(|| v.as_text().and_then(|t| t.trim().parse().ok())))
        .unwrap_or(1.0);
    if !raw.is_finite() || raw < 1.0 {
        return 1;
    }
    raw.min(MAX_RECURSION_DEPTH as f64) as usize
}
