//! Core types for Sigil

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

/// Recursion bookkeeping key: `<session_id>:<user_id>`. Cheaply cloneable.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SessionKey(Arc<str>);

impl SessionKey {
    pub fn new(s: impl Into<String>) -> Self {
        Self(Arc::from(s.into()))
    }

    pub fn for_user(session_id: &str, user_id: &str) -> Self {
        Self::new(format!("{}:{}", session_id, user_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Brainwave mode: selects the default engine and scoring multipliers.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BrainwaveMode {
    Delta,
    Theta,
    #[default]
    Alpha,
    Beta,
    Gamma,
    Emergence,
}

impl BrainwaveMode {
    pub const ALL: [BrainwaveMode; 6] = [
        Self::Delta,
        Self::Theta,
        Self::Alpha,
        Self::Beta,
        Self::Gamma,
        Self::Emergence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delta => "delta",
            Self::Theta => "theta",
            Self::Alpha => "alpha",
            Self::Beta => "beta",
            Self::Gamma => "gamma",
            Self::Emergence => "emergence",
        }
    }

    /// Energy multiplier applied by dimension exploration.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Delta => 0.5,
            Self::Theta => 0.8,
            Self::Alpha => 1.0,
            Self::Beta => 1.2,
            Self::Gamma => 1.5,
            Self::Emergence => 2.0,
        }
    }
}

impl std::fmt::Display for BrainwaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrainwaveMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::Error::UnknownMode(s.to_string()))
    }
}

/// Informational layer classification of an engine.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EngineLayer {
    Primary,
    Secondary,
    Meta,
}

impl EngineLayer {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Meta => "meta",
        }
    }
}

impl FromStr for EngineLayer {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "meta" => Ok(Self::Meta),
            other => Err(crate::Error::configuration(format!("unknown layer: {}", other))),
        }
    }
}

/// A typed directive parameter value.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Directive parameters. Lookups ignore ASCII case.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.0.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Text form of a parameter; numbers and booleans are rendered.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(|v| v.to_string())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// What has accumulated across a chain so far, handed to every engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChainContext {
    pub session_id: String,
    pub user_id: String,
    pub mode: BrainwaveMode,
    pub glyphs: Vec<String>,
    pub archetypes: Vec<String>,
    pub paradoxes: Vec<String>,
    /// Session recursion depth at the time of the call.
    pub depth: usize,
}

/// Input handed to an engine's `invoke`.
#[derive(Clone, Debug, Default)]
pub struct EngineInput {
    pub text: String,
    /// Directive keyword that routed the call; `None` for mode-default calls.
    pub keyword: Option<String>,
    pub params: Params,
    pub context: ChainContext,
}

impl EngineInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn with_mode(mut self, mode: BrainwaveMode) -> Self {
        self.context.mode = mode;
        self
    }

    pub fn keyword_is(&self, keyword: &str) -> bool {
        self.keyword.as_deref() == Some(keyword)
    }
}

/// Result of one engine invocation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    pub text: String,
    pub glyphs: Vec<String>,
    pub archetypes: Vec<String>,
    pub paradoxes: Vec<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl EngineOutput {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            text: s.into(),
            ..Default::default()
        }
    }

    pub fn with_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.glyphs.push(glyph.into());
        self
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetypes.push(archetype.into());
        self
    }

    pub fn with_paradoxes(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        self.paradoxes.extend(ids);
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}
