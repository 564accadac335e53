//! Sigil Engines - capability providers and their registry
//!
//! Each engine is a self-contained file in src/engines/.
//! To add an engine: create the file, implement the Engine trait, register below.

pub mod engines;
pub mod registry;

pub use engines::paradox::ParadoxEngine;
pub use registry::{DependencyReport, Engine, EngineRegistry, MissingDependency};

use sigil_core::RecursionGauge;
use std::sync::Arc;

/// Create the default engine registry with all builtin engines.
///
/// The paradox engine gets a fresh entropy-seeded random source and shares
/// `gauge` with the orchestrator.
pub fn create_default_registry(gauge: RecursionGauge) -> EngineRegistry {
    create_default_registry_with_paradox(Arc::new(ParadoxEngine::new().with_gauge(gauge)))
}

/// Create the default registry around a paradox engine the caller keeps a
/// handle to (for inspecting open paradoxes, or pinning its seed).
pub fn create_default_registry_with_paradox(paradox: Arc<ParadoxEngine>) -> EngineRegistry {
    let mut registry = EngineRegistry::new();

    // --- Primary ---
    registry.register(engines::core_engine::CoreEngine::new());

    // --- Secondary ---
    registry.register(engines::glyph::GlyphEngine::new());
    registry.register(engines::archetype::ArchetypeEngine::new());
    registry.register(engines::flame::FlameEngine::new());

    // --- Meta ---
    registry.register(engines::mirror::MirrorEngine::new());
    registry.register_shared(paradox);

    registry
}
