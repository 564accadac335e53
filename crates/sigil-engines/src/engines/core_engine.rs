//! Core engine - grounds input and carries recursion passes

use crate::registry::Engine;
use serde_json::json;
use sigil_core::{EngineInput, EngineLayer, EngineOutput, Result};
use tracing::debug;

pub const CORE_SYMBOL: &str = "◉";

pub struct CoreEngine;

impl CoreEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoreEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Engine for CoreEngine {
    fn name(&self) -> &str {
        "core"
    }

    fn symbol(&self) -> &str {
        CORE_SYMBOL
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Primary
    }

    fn description(&self) -> &str {
        "Grounds the input in the core resonance. Also the target of RECURSE passes."
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["CORE", "RECURSE"]
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let text = input.text.trim();
        let words = text.split_whitespace().count();
        let depth = input.context.depth;

        // A bare body on RECURSE is its depth, not a focus.
        let focus = input.params.text("FOCUS").or_else(|| match input.keyword.as_deref() {
            Some("RECURSE") => None,
            _ => input.params.text(sigil_core::directive::BARE_PARAM),
        });
        let header = match focus {
            Some(focus) => format!("{} core resonance [{}] focused on '{}'", CORE_SYMBOL, input.context.mode, focus),
            None if depth > 0 => format!("{} core recursion at depth {}", CORE_SYMBOL, depth),
            None => format!("{} core resonance [{}]", CORE_SYMBOL, input.context.mode),
        };
        debug!("core: {} words at depth {}", words, depth);

        Ok(EngineOutput::text(format!("{}: {}", header, text))
            .with_glyph(CORE_SYMBOL)
            .with_metadata(json!({ "words": words, "depth": depth })))
    }
}
