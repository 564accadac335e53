//! Mirror engine - reflects the input by words or letters

use crate::registry::Engine;
use sigil_core::{EngineInput, EngineLayer, EngineOutput, Result};

pub struct MirrorEngine;

impl MirrorEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MirrorEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Engine for MirrorEngine {
    fn name(&self) -> &str {
        "mirror"
    }

    fn symbol(&self) -> &str {
        "⟲"
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Meta
    }

    fn description(&self) -> &str {
        "Reflects the input: word order by default, letter order with MODE:letters."
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["core", "glyph"]
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["MIRROR"]
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let letters = input
            .params
            .get("MODE")
            .or_else(|| input.params.get(sigil_core::directive::BARE_PARAM))
            .and_then(|v| v.as_text())
            .is_some_and(|m| m.eq_ignore_ascii_case("letters"));

        let text = input.text.trim();
        let reflected = if letters {
            text.chars().rev().collect::<String>()
        } else {
            text.split_whitespace().rev().collect::<Vec<_>>().join(" ")
        };

        Ok(EngineOutput::text(format!("⟲ {}", reflected)).with_glyph("⟲"))
    }
}
