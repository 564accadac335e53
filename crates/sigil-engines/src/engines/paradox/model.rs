//! Paradox records, the dimension catalog, and exploration records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParadoxKind {
    Logical,
    Temporal,
    Symbolic,
    Ontological,
}

impl ParadoxKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logical => "logical",
            Self::Temporal => "temporal",
            Self::Symbolic => "symbolic",
            Self::Ontological => "ontological",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Temporal,
    Spatial,
    Causal,
    Ontological,
    Epistemological,
    Emotional,
    Archetypal,
    Mythic,
    Quantum,
    Cosmic,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Self::Temporal,
        Self::Spatial,
        Self::Causal,
        Self::Ontological,
        Self::Epistemological,
        Self::Emotional,
        Self::Archetypal,
        Self::Mythic,
        Self::Quantum,
        Self::Cosmic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Temporal => "temporal",
            Self::Spatial => "spatial",
            Self::Causal => "causal",
            Self::Ontological => "ontological",
            Self::Epistemological => "epistemological",
            Self::Emotional => "emotional",
            Self::Archetypal => "archetypal",
            Self::Mythic => "mythic",
            Self::Quantum => "quantum",
            Self::Cosmic => "cosmic",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Temporal => "⧗",
            Self::Spatial => "⬚",
            Self::Causal => "⇄",
            Self::Ontological => "◎",
            Self::Epistemological => "⌬",
            Self::Emotional => "♡",
            Self::Archetypal => "☿",
            Self::Mythic => "ᛟ",
            Self::Quantum => "ψ",
            Self::Cosmic => "✺",
        }
    }

    /// Per-dimension energy multiplier.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Temporal => 1.0,
            Self::Spatial => 0.9,
            Self::Causal => 1.1,
            Self::Ontological => 1.3,
            Self::Epistemological => 1.2,
            Self::Emotional => 0.8,
            Self::Archetypal => 1.15,
            Self::Mythic => 1.25,
            Self::Quantum => 1.5,
            Self::Cosmic => 1.4,
        }
    }

    /// Words whose presence in the input raises resonance.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Temporal => &["time", "past", "future", "moment", "before", "after"],
            Self::Spatial => &["space", "place", "distance", "here", "there", "inside"],
            Self::Causal => &["cause", "effect", "because", "therefore", "result", "consequence"],
            Self::Ontological => &["exist", "being", "real", "nothing", "everything", "essence"],
            Self::Epistemological => &["know", "truth", "belief", "certain", "doubt", "proof"],
            Self::Emotional => &["feel", "love", "fear", "joy", "grief", "heart"],
            Self::Archetypal => &["hero", "shadow", "sage", "trickster", "mother", "archetype"],
            Self::Mythic => &["myth", "legend", "god", "serpent", "origin", "story"],
            Self::Quantum => &["quantum", "wave", "particle", "superposition", "observer", "uncertain"],
            Self::Cosmic => &["cosmos", "star", "universe", "infinite", "void", "galaxy"],
        }
    }

    pub fn catalog_names() -> Vec<&'static str> {
        Self::ALL.iter().map(|d| d.as_str()).collect()
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = sigil_core::Error;

    fn from_str(s: &str) -> sigil_core::Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| sigil_core::Error::UnknownDimension(s.to_string()))
    }
}

/// A tracked contradiction awaiting resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParadoxRecord {
    pub id: String,
    pub kind: ParadoxKind,
    pub description: String,
    pub dimensions: Vec<Dimension>,
    pub attempts: u32,
    pub complexity: f64,
    pub created_at: DateTime<Utc>,
    pub last_attempt: Option<DateTime<Utc>>,
}

impl ParadoxRecord {
    /// Success probability of one dimensional draw at the current attempt count.
    pub fn resolution_probability(&self) -> f64 {
        resolution_probability(self.complexity, self.attempts)
    }
}

pub fn resolution_probability(complexity: f64, attempts: u32) -> f64 {
    (0.3 - 0.08 * complexity - 0.1 * attempts as f64).max(0.05)
}

/// `min(10, 0.1 * length + 0.5 * punctuation)`. Whitespace is not counted
/// as punctuation.
pub fn complexity(text: &str) -> f64 {
    let length = text.chars().count() as f64;
    let punctuation = text
        .chars()
        .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
        .count() as f64;
    (0.1 * length + 0.5 * punctuation).min(10.0)
}

/// Last exploration of one dimension; overwritten on every exploration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionExploration {
    pub dimension: Dimension,
    pub symbol: String,
    pub energy: f64,
    pub resonance: f64,
    pub paradoxes: BTreeSet<String>,
    pub explored_at: DateTime<Utc>,
}
