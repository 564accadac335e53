//! Tests for sigil-core: parser, keyword catalog, validation, types, errors

use sigil_core::directive::{catalog, lookup, BARE_PARAM, UNKNOWN_PRIORITY};
use sigil_core::parser::{self, has_directives, known_keywords, keyword_help, raw_directives};
use sigil_core::*;

// ===========================================================================
// Parser: pre-check
// ===========================================================================

#[test]
fn plain_text_has_no_directives() {
    assert!(!has_directives("Simple text without contradictions."));
    assert!(!has_directives("a # hash and [brackets] apart"));
    assert!(!has_directives("#lower[case]"));
    assert!(!has_directives("#OPEN[never closed"));
}

#[test]
fn precheck_finds_embedded_directive() {
    assert!(has_directives("before #GLYPH[NAME:x] after"));
    assert!(has_directives("#CORE[]"));
}

// ===========================================================================
// Parser: extraction
// ===========================================================================

#[test]
fn glyph_name_parses_to_single_directive() {
    let directives = parser::parse("#GLYPH[NAME:x]");
    assert_eq!(directives.len(), 1);
    let d = &directives[0];
    assert_eq!(d.keyword, "GLYPH");
    assert_eq!(d.params.get("NAME"), Some(&ParamValue::Text("x".into())));
    assert_eq!(d.engine.as_deref(), Some("glyph"));
    assert_eq!(d.raw, "#GLYPH[NAME:x]");
    assert_eq!(d.position, 0);
}

#[test]
fn equals_separator_and_quotes() {
    let d = &parser::parse(r#"#PARADOX[THREAD="t1"]"#)[0];
    assert_eq!(d.params.get("THREAD"), Some(&ParamValue::Text("t1".into())));
}

#[test]
fn bare_body_becomes_value_param() {
    let d = &parser::parse("#RECURSE[3]")[0];
    assert_eq!(d.params.len(), 1);
    assert_eq!(d.params.get(BARE_PARAM), Some(&ParamValue::Number(3.0)));
    assert_eq!(d.param_or_bare("DEPTH"), Some(&ParamValue::Number(3.0)));
}

#[test]
fn values_are_coerced() {
    let ds = parser::parse("#PARADOX[ANALYZE:True] #FLAME[INTENSITY:7] #GLYPH[NAME:'spiral']");
    assert_eq!(ds[0].params.get("ANALYZE"), Some(&ParamValue::Bool(true)));
    assert_eq!(ds[1].params.get("INTENSITY"), Some(&ParamValue::Number(7.0)));
    assert_eq!(ds[2].params.get("NAME"), Some(&ParamValue::Text("spiral".into())));
}

#[test]
fn directives_emitted_in_scan_order() {
    let ds = parser::parse("#FLAME[INTENSITY:2] text #CORE[FOCUS:a] more #GLYPH[NAME:b]");
    let keywords: Vec<&str> = ds.iter().map(|d| d.keyword.as_str()).collect();
    assert_eq!(keywords, vec!["FLAME", "CORE", "GLYPH"]);
    assert!(ds[0].position < ds[1].position && ds[1].position < ds[2].position);
}

#[test]
fn unknown_keyword_still_parses_without_engine() {
    let d = &parser::parse("#WHISPER[later]")[0];
    assert_eq!(d.keyword, "WHISPER");
    assert!(d.engine.is_none());
    assert_eq!(d.priority, UNKNOWN_PRIORITY);
    assert!(d.rules.is_empty());
}

#[test]
fn malformed_fragments_are_ignored() {
    let ds = parser::parse("#Glyph[NAME:x] #[NAME:x] #GLYPH(NAME:x) #GLYPH[NAME:y]");
    assert_eq!(ds.len(), 1);
    assert_eq!(ds[0].params.get("name"), Some(&ParamValue::Text("y".into())));
}

#[test]
fn raw_directive_substrings() {
    let raws = raw_directives("x #CORE[] y #GLYPH[NAME:z]");
    assert_eq!(raws, vec!["#CORE[]", "#GLYPH[NAME:z]"]);
}

// ===========================================================================
// Catalog and help
// ===========================================================================

#[test]
fn catalog_keywords_are_unique_uppercase() {
    let keywords = known_keywords();
    assert_eq!(keywords.len(), catalog().len());
    for k in &keywords {
        assert!(k.chars().all(|c| c.is_ascii_uppercase()), "{}", k);
        assert_eq!(keywords.iter().filter(|o| *o == k).count(), 1);
    }
}

#[test]
fn core_outranks_flame() {
    assert!(lookup("CORE").unwrap().priority < lookup("FLAME").unwrap().priority);
}

#[test]
fn keyword_help_is_case_insensitive() {
    let help = keyword_help("#glyph").unwrap();
    assert!(help.contains("#GLYPH[NAME:spiral]"));
    assert!(help.contains("engine: glyph"));
    assert!(keyword_help("NOPE").is_none());
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn missing_required_parameter_fails() {
    for keyword in ["GLYPH", "ARCHETYPE", "THREAD", "RESOLVE", "DIMENSION", "RECURSE"] {
        let d = Directive::new(keyword, Params::new());
        let result = d.validate();
        assert!(!result.is_valid, "{} should fail without params", keyword);
        assert!(!result.errors.is_empty());
        assert_eq!(result.keyword, keyword);
    }
}

#[test]
fn required_parameter_present_passes() {
    let d = &parser::parse("#GLYPH[NAME:x]")[0];
    let result = d.validate();
    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn bare_value_satisfies_primary_field() {
    assert!(parser::parse("#THREAD[t1]")[0].validate().is_valid);
    assert!(parser::parse("#RESOLVE[px-1]")[0].validate().is_valid);
}

#[test]
fn bare_value_fills_single_optional_field() {
    for input in ["#FLAME[9]", "#MIRROR[letters]", "#CORE[stillness]"] {
        let result = parser::parse(input)[0].validate();
        assert!(result.is_valid, "{}: {:?}", input, result.errors);
        assert!(result.warnings.is_empty(), "{}: {:?}", input, result.warnings);
    }

    // The bare value goes through the same predicate as the named field.
    let result = parser::parse("#FLAME[42]")[0].validate();
    assert!(!result.is_valid);
    assert!(result.errors[0].contains("42"));
    assert!(!parser::parse("#MIRROR[sideways]")[0].validate().is_valid);

    // PARADOX has several optional fields, so a bare body names none of them.
    let result = parser::parse("#PARADOX[maybe]")[0].validate();
    assert!(result.warnings.iter().any(|w| w.contains("'value'")));
}

#[test]
fn empty_body_carries_no_params() {
    let d = &parser::parse("#CORE[]")[0];
    assert!(d.params.is_empty());
    let result = d.validate();
    assert!(result.is_valid);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let result = parser::parse("#GLYPH[ ]")[0].validate();
    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["GLYPH requires a NAME"]);
}

#[test]
fn predicate_failure_reports_value() {
    let result = parser::parse("#RECURSE[DEPTH:zero]")[0].validate();
    assert!(!result.is_valid);
    assert!(result.errors[0].contains("zero"));

    let result = parser::parse("#FLAME[INTENSITY:11]")[0].validate();
    assert!(!result.is_valid);
}

#[test]
fn empty_name_fails() {
    let result = parser::parse("#GLYPH[NAME:\"\"]")[0].validate();
    assert!(!result.is_valid);
}

#[test]
fn oversized_recursion_depth_warns_but_passes() {
    let result = parser::parse("#RECURSE[DEPTH:999]")[0].validate();
    assert!(result.is_valid);
    assert!(result.warnings.iter().any(|w| w.contains("clamped")));
}

#[test]
fn unknown_parameter_and_keyword_warn() {
    let result = parser::parse("#GLYPH[COLOR:red]")[0].validate();
    assert!(!result.is_valid);
    assert!(result.warnings.iter().any(|w| w.contains("COLOR")));

    let result = parser::parse("#WHISPER[later]")[0].validate();
    assert!(result.is_valid);
    assert!(result.warnings.iter().any(|w| w.contains("not a known directive")));
}

// ===========================================================================
// Types
// ===========================================================================

#[test]
fn session_key_joins_session_and_user() {
    let key = SessionKey::for_user("s1", "u1");
    assert_eq!(key.as_str(), "s1:u1");
    assert_eq!(format!("{}", key), "s1:u1");
}

#[test]
fn brainwave_mode_parse_and_serde() {
    assert_eq!("Gamma".parse::<BrainwaveMode>().unwrap(), BrainwaveMode::Gamma);
    assert!("omega".parse::<BrainwaveMode>().is_err());
    assert_eq!(serde_json::to_string(&BrainwaveMode::Emergence).unwrap(), r#""emergence""#);
    assert_eq!(BrainwaveMode::default(), BrainwaveMode::Alpha);
}

#[test]
fn param_value_display() {
    assert_eq!(ParamValue::Number(3.0).to_string(), "3");
    assert_eq!(ParamValue::Number(2.5).to_string(), "2.5");
    assert_eq!(ParamValue::Bool(false).to_string(), "false");
}

#[test]
fn params_lookup_ignores_case() {
    let params = Params::new().with("Name", ParamValue::Text("x".into()));
    assert!(params.contains("NAME"));
    assert_eq!(params.text("name").as_deref(), Some("x"));
}

#[test]
fn engine_output_builder() {
    let out = EngineOutput::text("hi")
        .with_glyph("✶")
        .with_archetype("The Sage")
        .with_paradoxes(vec!["px-1".to_string()]);
    assert_eq!(out.glyphs, vec!["✶"]);
    assert_eq!(out.archetypes, vec!["The Sage"]);
    assert_eq!(out.paradoxes, vec!["px-1"]);
}

// ===========================================================================
// Recursion gauge
// ===========================================================================

#[test]
fn gauge_guard_restores_on_drop() {
    let gauge = RecursionGauge::new();
    {
        let _outer = gauge.raise(4);
        assert_eq!(gauge.current(), 4);
        {
            let _inner = gauge.raise(6);
            assert!(gauge.at_ceiling());
        }
        assert_eq!(gauge.current(), 4);
    }
    assert_eq!(gauge.current(), 0);
}

#[test]
fn gauge_clones_share_state() {
    let gauge = RecursionGauge::new();
    let shared = gauge.clone();
    let _g = gauge.raise(MAX_RECURSION_DEPTH);
    assert!(shared.at_ceiling());
}

// ===========================================================================
// Errors
// ===========================================================================

#[test]
fn error_display_and_fatality() {
    let e = Error::missing_dependency("mirror", "ghost");
    assert_eq!(e.to_string(), "engine 'mirror' depends on unregistered engine 'ghost'");
    assert!(e.is_fatal());

    let e = Error::engine_fault("flame", "overheated");
    assert_eq!(e.to_string(), "engine fault: flame - overheated");
    assert!(!e.is_fatal());
}
