//! Structured result of one `process_input` call

use crate::stats::EngineRuntimeState;
use serde::Serialize;
use serde_json::Value;
use sigil_core::{BrainwaveMode, EngineOutput};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Response {
    pub text: String,
    pub glyphs: Vec<String>,
    pub archetypes: Vec<String>,
    pub paradoxes: Vec<String>,
    pub metadata: ResponseMetadata,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Describes the last engine that ran, plus how the chain went.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponseMetadata {
    pub engine: Option<String>,
    pub version: Option<String>,
    pub usage_count: u64,
    pub performance: EngineRuntimeState,
    pub config: Value,
    pub mode: BrainwaveMode,
    /// Keywords in execution order. Empty on the default-mode path.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
    /// Keywords skipped for lack of a registered engine.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    /// Why the chain stopped before its last directive, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,
}

impl Response {
    pub(crate) fn new(mode: BrainwaveMode) -> Self {
        Self {
            success: true,
            metadata: ResponseMetadata {
                mode,
                config: Value::Object(Default::default()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validation or setup failure: nothing ran.
    pub(crate) fn rejected(mode: BrainwaveMode, error: impl Into<String>) -> Self {
        let mut response = Self::new(mode);
        response.success = false;
        response.error = Some(error.into());
        response
    }

    /// Fold one engine's output into the accumulator.
    pub(crate) fn absorb(&mut self, output: EngineOutput, separator: &str) {
        self.text.push_str(&output.text);
        self.text.push_str(separator);
        self.glyphs.extend(output.glyphs);
        self.archetypes.extend(output.archetypes);
        for id in output.paradoxes {
            if !self.paradoxes.contains(&id) {
                self.paradoxes.push(id);
            }
        }
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) {
        self.success = false;
        self.error = Some(error.into());
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
