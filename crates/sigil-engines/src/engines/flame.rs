//! Flame engine - intensifies the input

use crate::registry::Engine;
use serde_json::json;
use sigil_core::{EngineInput, EngineLayer, EngineOutput, Result};

pub const FLAME_SYMBOL: &str = "🜂";
const DEFAULT_INTENSITY: u8 = 5;

pub struct FlameEngine;

impl FlameEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FlameEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Engine for FlameEngine {
    fn name(&self) -> &str {
        "flame"
    }

    fn symbol(&self) -> &str {
        FLAME_SYMBOL
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Secondary
    }

    fn description(&self) -> &str {
        "Intensifies the input; at intensity 8 and above the text burns in capitals."
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["core"]
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["FLAME"]
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let intensity = input
            .params
            .get("INTENSITY")
            .or_else(|| input.params.get(sigil_core::directive::BARE_PARAM))
            .and_then(|v| v.as_number())
            .map_or(DEFAULT_INTENSITY, |n| n.clamp(1.0, 10.0) as u8);

        let body = input.text.trim();
        let body = if intensity >= 8 { body.to_uppercase() } else { body.to_string() };
        let flames = FLAME_SYMBOL.repeat(usize::from(intensity.div_ceil(3)));

        Ok(EngineOutput::text(format!("{} {}", flames, body))
            .with_glyph(FLAME_SYMBOL)
            .with_metadata(json!({ "intensity": intensity })))
    }
}
