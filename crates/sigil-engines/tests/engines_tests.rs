//! Tests for sigil-engines: EngineRegistry, builtin engines, and the paradox lifecycle

use serde_json::json;
use sigil_core::{
    BrainwaveMode, EngineInput, EngineLayer, EngineOutput, ParamValue, RecursionGauge, Result,
    MAX_PARADOX_DETECTIONS, MAX_RECURSION_DEPTH,
};
use sigil_engines::engines::paradox::{resolution_probability, Dimension};
use sigil_engines::*;
use std::sync::Arc;

fn text(s: &str) -> ParamValue {
    ParamValue::Text(s.into())
}

struct StubEngine {
    name: &'static str,
    symbol: &'static str,
    deps: Vec<&'static str>,
    keywords: Vec<&'static str>,
}

impl StubEngine {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            symbol: "?",
            deps: Vec::new(),
            keywords: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl Engine for StubEngine {
    fn name(&self) -> &str {
        self.name
    }
    fn symbol(&self) -> &str {
        self.symbol
    }
    fn layer(&self) -> EngineLayer {
        EngineLayer::Secondary
    }
    fn description(&self) -> &str {
        "stub"
    }
    fn dependencies(&self) -> Vec<&str> {
        self.deps.clone()
    }
    fn keywords(&self) -> Vec<&str> {
        self.keywords.clone()
    }
    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        Ok(EngineOutput::text(format!("stub:{}", input.text)))
    }
}

// ===========================================================================
// EngineRegistry
// ===========================================================================

#[test]
fn registry_default_is_empty() {
    let reg = EngineRegistry::new();
    assert!(reg.is_empty());
    assert!(reg.list().is_empty());
    assert!(reg.check_dependencies().is_ok());
}

#[test]
fn default_registry_has_all_engines() {
    let reg = create_default_registry(RecursionGauge::new());
    assert_eq!(reg.list(), vec!["core", "glyph", "archetype", "flame", "mirror", "paradox"]);
    assert!(reg.ensure_integrity().is_ok());
}

#[test]
fn lookup_by_name_symbol_and_keyword() {
    let reg = create_default_registry(RecursionGauge::new());
    assert_eq!(reg.get("glyph").unwrap().symbol(), "✶");
    assert_eq!(reg.by_symbol("∞").unwrap().name(), "paradox");
    assert_eq!(reg.for_keyword("thread").unwrap().name(), "paradox");
    assert_eq!(reg.for_keyword("RECURSE").unwrap().name(), "core");
    assert!(reg.get("nope").is_none());
    assert!(reg.for_keyword("NOPE").is_none());
}

#[test]
fn list_by_layer() {
    let reg = create_default_registry(RecursionGauge::new());
    let meta: Vec<String> = reg
        .list_by_layer(EngineLayer::Meta)
        .iter()
        .map(|e| e.name().to_string())
        .collect();
    assert_eq!(meta, vec!["mirror", "paradox"]);
    assert_eq!(reg.list_by_layer(EngineLayer::Primary).len(), 1);
}

#[test]
fn dependencies_of_engine() {
    let reg = create_default_registry(RecursionGauge::new());
    assert_eq!(reg.dependencies_of("mirror").unwrap(), vec!["core", "glyph"]);
    assert!(reg.dependencies_of("core").unwrap().is_empty());
    assert!(reg.dependencies_of("ghost").is_none());
}

#[test]
fn first_keyword_registration_wins() {
    let mut reg = create_default_registry(RecursionGauge::new());
    let mut alt = StubEngine::new("alt-glyph");
    alt.keywords = vec!["GLYPH", "SHADOWGLYPH"];
    assert!(reg.register(alt));
    assert_eq!(reg.for_keyword("GLYPH").unwrap().name(), "glyph");
    assert_eq!(reg.for_keyword("SHADOWGLYPH").unwrap().name(), "alt-glyph");
}

#[test]
fn duplicate_name_is_ignored() {
    let mut reg = EngineRegistry::new();
    let mut first = StubEngine::new("dup");
    first.symbol = "1";
    let mut second = StubEngine::new("dup");
    second.symbol = "2";
    assert!(reg.register(first));
    assert!(!reg.register(second));
    assert_eq!(reg.len(), 1);
    assert_eq!(reg.get("dup").unwrap().symbol(), "1");
}

#[test]
fn dependency_report_lists_each_missing_pair_once() {
    let mut reg = EngineRegistry::new();
    reg.register(StubEngine::new("core"));
    let mut a = StubEngine::new("a");
    a.deps = vec!["ghost", "core", "ghost", "phantom"];
    let mut b = StubEngine::new("b");
    b.deps = vec!["ghost", "a"];
    reg.register(a);
    reg.register(b);

    let report = reg.check_dependencies();
    let pairs: Vec<(&str, &str)> = report
        .missing
        .iter()
        .map(|m| (m.engine.as_str(), m.dependency.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "ghost"), ("a", "phantom"), ("b", "ghost")]);

    let err = reg.ensure_integrity().unwrap_err();
    assert!(err.is_fatal());
    assert!(err.to_string().contains("phantom"));
}

// ===========================================================================
// Builtin engines
// ===========================================================================

#[tokio::test]
async fn core_engine_focus() {
    let reg = create_default_registry(RecursionGauge::new());
    let out = reg
        .get("core")
        .unwrap()
        .invoke(EngineInput::new("hello world").with_param("FOCUS", text("light")))
        .await
        .unwrap();
    assert!(out.text.contains("focused on 'light'"));
    assert!(out.text.ends_with("hello world"));
    assert_eq!(out.glyphs, vec!["◉"]);
    assert_eq!(out.metadata["words"], json!(2));
}

#[tokio::test]
async fn glyph_engine_known_and_unknown() {
    let reg = create_default_registry(RecursionGauge::new());
    let glyph = reg.get("glyph").unwrap();

    let out = glyph.invoke(EngineInput::new("x").with_param("NAME", text("spiral"))).await.unwrap();
    assert_eq!(out.glyphs, vec!["🌀"]);

    let out = glyph.invoke(EngineInput::new("x").with_param("NAME", text("blorp"))).await.unwrap();
    assert_eq!(out.glyphs, vec!["✧"]);
    assert_eq!(out.metadata["known"], json!(false));

    // No NAME: drawn from the mode.
    let out = glyph.invoke(EngineInput::new("x").with_mode(BrainwaveMode::Delta)).await.unwrap();
    assert_eq!(out.glyphs, vec!["☽"]);
}

#[tokio::test]
async fn archetype_engine_unknown_is_wanderer() {
    let reg = create_default_registry(RecursionGauge::new());
    let out = reg
        .get("archetype")
        .unwrap()
        .invoke(EngineInput::new("x").with_param("NAME", text("plumber")))
        .await
        .unwrap();
    assert_eq!(out.archetypes, vec!["The Wanderer"]);
}

#[tokio::test]
async fn flame_engine_burns_at_high_intensity() {
    let reg = create_default_registry(RecursionGauge::new());
    let out = reg
        .get("flame")
        .unwrap()
        .invoke(EngineInput::new("rise").with_param("INTENSITY", ParamValue::Number(9.0)))
        .await
        .unwrap();
    assert!(out.text.ends_with("RISE"));
    assert_eq!(out.metadata["intensity"], json!(9));
}

#[tokio::test]
async fn mirror_engine_words_and_letters() {
    let reg = create_default_registry(RecursionGauge::new());
    let mirror = reg.get("mirror").unwrap();
    let out = mirror.invoke(EngineInput::new("one two three")).await.unwrap();
    assert_eq!(out.text, "⟲ three two one");
    let out = mirror
        .invoke(EngineInput::new("abc").with_param("MODE", text("letters")))
        .await
        .unwrap();
    assert_eq!(out.text, "⟲ cba");
}

#[tokio::test]
async fn bare_values_fill_the_single_optional_field() {
    let reg = create_default_registry(RecursionGauge::new());

    let out = reg
        .get("flame")
        .unwrap()
        .invoke(EngineInput::new("rise").with_keyword("FLAME").with_param("value", ParamValue::Number(9.0)))
        .await
        .unwrap();
    assert!(out.text.ends_with("RISE"));
    assert_eq!(out.metadata["intensity"], json!(9));

    let out = reg
        .get("mirror")
        .unwrap()
        .invoke(EngineInput::new("abc").with_keyword("MIRROR").with_param("value", text("letters")))
        .await
        .unwrap();
    assert_eq!(out.text, "⟲ cba");

    let out = reg
        .get("core")
        .unwrap()
        .invoke(EngineInput::new("calm").with_keyword("CORE").with_param("value", text("stillness")))
        .await
        .unwrap();
    assert!(out.text.contains("focused on 'stillness'"));
}

#[tokio::test]
async fn bare_recurse_depth_is_not_a_focus() {
    let reg = create_default_registry(RecursionGauge::new());
    let out = reg
        .get("core")
        .unwrap()
        .invoke(EngineInput::new("calm").with_keyword("RECURSE").with_param("value", ParamValue::Number(3.0)))
        .await
        .unwrap();
    assert!(!out.text.contains("focused on"));
}

// ===========================================================================
// Paradox engine: analysis
// ===========================================================================

#[tokio::test]
async fn contradiction_is_detected_and_registered() {
    let engine = ParadoxEngine::seeded(1);
    let out = engine
        .invoke(EngineInput::new("The sky is blue. The sky is not blue."))
        .await
        .unwrap();
    assert!(!out.paradoxes.is_empty());
    assert!(engine.paradox_count() >= 1);
    assert!(out.text.contains("contradiction"));
}

#[tokio::test]
async fn simple_text_has_no_paradoxes() {
    let engine = ParadoxEngine::seeded(1);
    let out = engine
        .invoke(EngineInput::new("Simple text without contradictions."))
        .await
        .unwrap();
    assert!(out.paradoxes.is_empty());
    assert!(out.text.contains("No paradoxes detected"));
    assert_eq!(engine.paradox_count(), 0);
}

#[tokio::test]
async fn long_text_without_contradictions_analyzes_quickly() {
    let engine = ParadoxEngine::seeded(1);
    let input: String = (0..3000).map(|i| format!("Line number {} says hello. ", i)).collect();
    let started = std::time::Instant::now();
    let out = engine.invoke(EngineInput::new(input)).await.unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(2), "took {:?}", started.elapsed());
    assert!(out.paradoxes.is_empty());
    assert_eq!(engine.paradox_count(), 0);
}

#[tokio::test]
async fn detection_cap_adds_overload_marker() {
    let engine = ParadoxEngine::seeded(1);
    let input = "This statement is false. I am lying. ".repeat(10);
    let out = engine.invoke(EngineInput::new(input)).await.unwrap();
    assert_eq!(out.paradoxes.len(), MAX_PARADOX_DETECTIONS);
    assert_eq!(engine.paradox_count(), MAX_PARADOX_DETECTIONS);
    assert_eq!(out.text.matches("PARADOX OVERLOAD").count(), 1);
}

#[tokio::test]
async fn detected_kinds_are_inferred() {
    let engine = ParadoxEngine::seeded(3);
    let out = engine.invoke(EngineInput::new("This statement is false.")).await.unwrap();
    let record = engine.paradox(&out.paradoxes[0]).unwrap();
    assert_eq!(record.kind.as_str(), "symbolic");
}

// ===========================================================================
// Paradox engine: threads and resolution
// ===========================================================================

async fn open_thread(engine: &ParadoxEngine, name: &str) -> String {
    let out = engine
        .invoke(EngineInput::new("").with_keyword("PARADOX").with_param("THREAD", text(name)))
        .await
        .unwrap();
    assert_eq!(out.paradoxes.len(), 1);
    assert!(out.text.contains(&out.paradoxes[0]));
    out.paradoxes[0].clone()
}

#[tokio::test]
async fn thread_creates_exactly_one_symbolic_record() {
    let engine = ParadoxEngine::seeded(11);
    let id = open_thread(&engine, "t1").await;
    assert_eq!(engine.paradox_count(), 1);
    let record = engine.paradox(&id).unwrap();
    assert_eq!(record.kind.as_str(), "symbolic");
    assert!((2..=3).contains(&record.dimensions.len()));
    assert_eq!(record.attempts, 0);
    assert!((record.complexity - 0.2).abs() < 1e-9);
}

#[tokio::test]
async fn resolving_unknown_id_is_idempotent() {
    let engine = ParadoxEngine::seeded(5);
    open_thread(&engine, "keep").await;
    let resolve = || {
        engine.invoke(
            EngineInput::new("")
                .with_keyword("RESOLVE")
                .with_param("ID", text("px-doesnotexist")),
        )
    };
    let first = resolve().await.unwrap();
    let second = resolve().await.unwrap();
    assert_eq!(first, second);
    assert!(first.paradoxes.is_empty());
    assert!(first.text.contains("not found"));
    assert_eq!(engine.paradox_count(), 1);
}

#[tokio::test]
async fn repeated_resolution_eventually_succeeds_with_decaying_odds() {
    let engine = ParadoxEngine::seeded(42);
    let id = open_thread(&engine, "t1").await;

    let mut last_attempts = 0;
    let mut last_probability = f64::INFINITY;
    for _ in 0..200 {
        let before = engine.paradox_count();
        let out = engine
            .invoke(EngineInput::new("").with_param("RESOLVE", text(&id)))
            .await
            .unwrap();

        match engine.paradox(&id) {
            Some(record) => {
                assert_eq!(engine.paradox_count(), before);
                assert!(record.attempts > last_attempts);
                let p = record.resolution_probability();
                assert!(p <= last_probability);
                last_attempts = record.attempts;
                last_probability = p;
                assert_eq!(out.paradoxes, vec![id.clone()]);
                assert!(out.text.contains("persists"));
            }
            None => {
                assert_eq!(engine.paradox_count(), before - 1);
                assert!(out.text.contains("dimensional refraction"));
                let path = out.metadata["path"].as_array().unwrap();
                assert!(!path.is_empty());
                assert!(out.paradoxes.is_empty());
                return;
            }
        }
    }
    panic!("paradox {} never resolved", id);
}

#[tokio::test]
async fn recursion_ceiling_halts_resolution_without_mutation() {
    let gauge = RecursionGauge::new();
    let engine = ParadoxEngine::seeded(9).with_gauge(gauge.clone());
    let id = open_thread(&engine, "held").await;

    let _guard = gauge.raise(MAX_RECURSION_DEPTH);
    let out = engine
        .invoke(EngineInput::new("").with_param("RESOLVE", text(&id)))
        .await
        .unwrap();
    assert!(out.text.contains("halted"));
    assert_eq!(out.metadata["status"], json!("halted"));
    let record = engine.paradox(&id).unwrap();
    assert_eq!(record.attempts, 0);
    assert!(record.last_attempt.is_none());
}

#[test]
fn probability_floor_and_decay() {
    assert!((resolution_probability(0.0, 0) - 0.3).abs() < 1e-9);
    assert!((resolution_probability(0.2, 1) - 0.184).abs() < 1e-9);
    assert_eq!(resolution_probability(10.0, 5), 0.05);
    assert!(resolution_probability(1.0, 2) <= resolution_probability(1.0, 1));
}

// ===========================================================================
// Paradox engine: dimensions
// ===========================================================================

#[tokio::test]
async fn unknown_dimension_lists_catalog() {
    let engine = ParadoxEngine::seeded(2);
    let out = engine
        .invoke(EngineInput::new("x").with_param("DIMENSION", text("not-a-real-dimension")))
        .await
        .unwrap();
    assert!(out.text.contains("unknown dimension"));
    for name in Dimension::catalog_names() {
        assert!(out.text.contains(name), "missing {}", name);
    }
    assert_eq!(out.metadata["catalog"].as_array().unwrap().len(), 10);
    assert!(out.paradoxes.is_empty());
}

#[test]
fn dimension_parse_names_the_unknown_input() {
    assert_eq!(" Temporal ".parse::<Dimension>().unwrap(), Dimension::Temporal);
    let err = "hyperspace".parse::<Dimension>().unwrap_err();
    assert!(matches!(err, sigil_core::Error::UnknownDimension(ref name) if name == "hyperspace"));
    assert_eq!(err.to_string(), "unknown dimension: hyperspace");
    assert!(!err.is_fatal());
}

#[tokio::test]
async fn exploration_reports_assigned_paradoxes() {
    let engine = ParadoxEngine::seeded(4);
    let id = open_thread(&engine, "anchor").await;
    let dimension = engine.paradox(&id).unwrap().dimensions[0];

    let out = engine
        .invoke(
            EngineInput::new("time before and after")
                .with_keyword("DIMENSION")
                .with_param("NAME", text(dimension.as_str())),
        )
        .await
        .unwrap();
    assert!(out.paradoxes.contains(&id));

    let exploration = engine.exploration(dimension).unwrap();
    assert!(exploration.paradoxes.contains(&id));
    assert!(exploration.energy <= 100.0);
    assert!(exploration.resonance <= 100.0);
    assert!(exploration.resonance >= 10.0);
}

#[tokio::test]
async fn exploration_energy_scales_with_mode_and_overwrites() {
    let engine = ParadoxEngine::seeded(4);
    let explore = |mode| {
        engine.invoke(
            EngineInput::new("time")
                .with_mode(mode)
                .with_param("DIMENSION", text("temporal")),
        )
    };

    explore(BrainwaveMode::Alpha).await.unwrap();
    let alpha = engine.exploration(Dimension::Temporal).unwrap();
    assert!((alpha.energy - 2.0).abs() < 1e-9);
    assert!((alpha.resonance - 20.0).abs() < 1e-9);

    explore(BrainwaveMode::Emergence).await.unwrap();
    let emergence = engine.exploration(Dimension::Temporal).unwrap();
    assert!((emergence.energy - 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn energy_is_capped() {
    let engine = ParadoxEngine::seeded(4);
    engine
        .invoke(
            EngineInput::new("x".repeat(10_000))
                .with_mode(BrainwaveMode::Emergence)
                .with_param("DIMENSION", text("quantum")),
        )
        .await
        .unwrap();
    assert_eq!(engine.exploration(Dimension::Quantum).unwrap().energy, 100.0);
}

#[tokio::test]
async fn shared_engine_handle_sees_registry_calls() {
    let paradox = Arc::new(ParadoxEngine::seeded(8));
    let reg = create_default_registry_with_paradox(paradox.clone());
    reg.for_keyword("THREAD")
        .unwrap()
        .invoke(EngineInput::new("").with_keyword("THREAD").with_param("value", text("t9")))
        .await
        .unwrap();
    assert_eq!(paradox.paradox_count(), 1);
    assert_eq!(paradox.open_paradoxes().len(), 1);
}
