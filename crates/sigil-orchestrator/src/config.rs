//! Orchestrator configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists. The recursion ceiling
//! and the detection cap are hard constants and are not configurable.

use serde::{Deserialize, Serialize};
use sigil_core::{BrainwaveMode, Error, Result};
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SigilConfig {
    pub orchestrator: OrchestratorConfig,
    /// Default engine per brainwave mode.
    pub modes: ModeConfig,
    pub paradox: ParadoxConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Mode used when the caller passes none.
    pub default_mode: BrainwaveMode,
    /// Appended after each engine's output in the accumulated response.
    pub separator: String,
    /// Wall-clock budget per chain in milliseconds. Directives not started
    /// before the budget runs out are skipped.
    pub chain_budget_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub delta: String,
    pub theta: String,
    pub alpha: String,
    pub beta: String,
    pub gamma: String,
    pub emergence: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParadoxConfig {
    /// Seed for resolution draws. Unset: seeded from entropy.
    pub seed: Option<u64>,
}

// ============================================================
// Defaults
// ============================================================

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_mode: BrainwaveMode::Alpha,
            separator: "\n\n".into(),
            chain_budget_ms: None,
        }
    }
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            delta: "core".into(),
            theta: "archetype".into(),
            alpha: "glyph".into(),
            beta: "core".into(),
            gamma: "flame".into(),
            emergence: "paradox".into(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl SigilConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}; using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}; using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Strict variant of `load`: a missing or malformed file is an error.
    pub fn load_strict(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

impl ModeConfig {
    pub fn engine_for(&self, mode: BrainwaveMode) -> &str {
        match mode {
            BrainwaveMode::Delta => &self.delta,
            BrainwaveMode::Theta => &self.theta,
            BrainwaveMode::Alpha => &self.alpha,
            BrainwaveMode::Beta => &self.beta,
            BrainwaveMode::Gamma => &self.gamma,
            BrainwaveMode::Emergence => &self.emergence,
        }
    }

    /// Every mode whose engine is not in `known`.
    pub fn unresolved<'a>(&'a self, known: &[&str]) -> Vec<(BrainwaveMode, &'a str)> {
        BrainwaveMode::ALL
            .into_iter()
            .map(|m| (m, self.engine_for(m)))
            .filter(|(_, engine)| !known.contains(engine))
            .collect()
    }

    pub fn ensure_resolves(&self, known: &[&str]) -> Result<()> {
        let unresolved = self.unresolved(known);
        if unresolved.is_empty() {
            return Ok(());
        }
        let detail = unresolved
            .iter()
            .map(|(mode, engine)| format!("mode '{}' maps to unregistered engine '{}'", mode, engine))
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::configuration(detail))
    }
}
