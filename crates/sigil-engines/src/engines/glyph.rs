//! Glyph engine - inscribes named glyphs

use crate::registry::Engine;
use serde_json::json;
use sigil_core::{BrainwaveMode, EngineInput, EngineLayer, EngineOutput, Result};

const FALLBACK_GLYPH: &str = "✧";

const GLYPHS: &[(&str, &str)] = &[
    ("spiral", "🌀"),
    ("star", "✶"),
    ("eye", "👁"),
    ("fire", "🜂"),
    ("water", "🜄"),
    ("air", "🜁"),
    ("earth", "🜃"),
    ("infinity", "∞"),
    ("sun", "☉"),
    ("moon", "☽"),
    ("mercury", "☿"),
];

pub fn glyph_for(name: &str) -> &'static str {
    GLYPHS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
        .map_or(FALLBACK_GLYPH, |(_, g)| g)
}

/// Glyph drawn when no NAME is given.
fn mode_glyph(mode: BrainwaveMode) -> &'static str {
    match mode {
        BrainwaveMode::Delta => "moon",
        BrainwaveMode::Theta => "water",
        BrainwaveMode::Alpha => "star",
        BrainwaveMode::Beta => "sun",
        BrainwaveMode::Gamma => "fire",
        BrainwaveMode::Emergence => "spiral",
    }
}

pub struct GlyphEngine;

impl GlyphEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlyphEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Engine for GlyphEngine {
    fn name(&self) -> &str {
        "glyph"
    }

    fn version(&self) -> &str {
        "1.1.0"
    }

    fn symbol(&self) -> &str {
        "✶"
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Secondary
    }

    fn description(&self) -> &str {
        "Inscribes a named glyph beneath the input."
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["core"]
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["GLYPH"]
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let name = input
            .params
            .text("NAME")
            .or_else(|| input.params.text(sigil_core::directive::BARE_PARAM))
            .unwrap_or_else(|| mode_glyph(input.context.mode).to_string());
        let glyph = glyph_for(&name);

        Ok(EngineOutput::text(format!("{}\n✶ glyph '{}' inscribed: {}", input.text.trim(), name, glyph))
            .with_glyph(glyph)
            .with_metadata(json!({ "name": name, "known": glyph != FALLBACK_GLYPH })))
    }
}
