//! Archetype engine

use crate::registry::Engine;
use serde_json::json;
use sigil_core::{BrainwaveMode, EngineInput, EngineLayer, EngineOutput, Result};

const ARCHETYPES: &[(&str, &str, &str)] = &[
    ("sage", "The Sage", "the truth will set you free"),
    ("trickster", "The Trickster", "every rule hides its own exception"),
    ("hero", "The Hero", "where there is a will there is a way"),
    ("shadow", "The Shadow", "what is denied returns"),
    ("mother", "The Great Mother", "all things are held"),
    ("creator", "The Creator", "what can be imagined can be made"),
    ("magician", "The Magician", "as above, so below"),
    ("ruler", "The Ruler", "order is the first law"),
    ("lover", "The Lover", "you are the one"),
    ("innocent", "The Innocent", "free to be you and me"),
];

const WANDERER: (&str, &str) = ("The Wanderer", "not all who wander are lost");

fn mode_archetype(mode: BrainwaveMode) -> &'static str {
    match mode {
        BrainwaveMode::Delta => "mother",
        BrainwaveMode::Theta => "magician",
        BrainwaveMode::Alpha => "sage",
        BrainwaveMode::Beta => "ruler",
        BrainwaveMode::Gamma => "hero",
        BrainwaveMode::Emergence => "trickster",
    }
}

/// Canonical title and motto; unknown names map to the Wanderer.
pub fn archetype_for(name: &str) -> (&'static str, &'static str) {
    ARCHETYPES
        .iter()
        .find(|(key, _, _)| key.eq_ignore_ascii_case(name.trim()))
        .map_or(WANDERER, |(_, title, motto)| (*title, *motto))
}

pub struct ArchetypeEngine;

impl ArchetypeEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ArchetypeEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Engine for ArchetypeEngine {
    fn name(&self) -> &str {
        "archetype"
    }

    fn symbol(&self) -> &str {
        "♄"
    }

    fn layer(&self) -> EngineLayer {
        EngineLayer::Secondary
    }

    fn description(&self) -> &str {
        "Lets an archetype speak over the input."
    }

    fn dependencies(&self) -> Vec<&str> {
        vec!["core"]
    }

    fn keywords(&self) -> Vec<&str> {
        vec!["ARCHETYPE"]
    }

    async fn invoke(&self, input: EngineInput) -> Result<EngineOutput> {
        let name = input
            .params
            .text("NAME")
            .or_else(|| input.params.text(sigil_core::directive::BARE_PARAM))
            .unwrap_or_else(|| mode_archetype(input.context.mode).to_string());
        let (title, motto) = archetype_for(&name);

        Ok(EngineOutput::text(format!("{}\n♄ {} speaks: {}", input.text.trim(), title, motto))
            .with_archetype(title)
            .with_metadata(json!({ "requested": name })))
    }
}
