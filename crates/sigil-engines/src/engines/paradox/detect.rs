//! Paradox signal detection: fixed regex signals plus a sentence
//! contradiction check. Detection is a heuristic, not understanding.

use super::model::ParadoxKind;
use once_cell::sync::Lazy;
use regex::Regex;
use sigil_core::MAX_PARADOX_DETECTIONS;
use std::collections::HashMap;

static SIGNALS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (
            r"(?i)\bthis (?:statement|sentence) is (?:false|a lie|not true)\b",
            "self-referential falsehood",
        ),
        (r"(?i)\bi am (?:lying|a liar)\b", "liar construction"),
        (
            r"(?i)\b(?:always|never)\b[^.!?]*\bsometimes\b|\bsometimes\b[^.!?]*\b(?:always|never)\b",
            "always/never against sometimes",
        ),
        (
            r"(?i)\b(?:exists?|is real)\b[^.!?]*\b(?:does not|doesn't|cannot|can't) exist\b|\bnothing exists\b",
            "existence negation",
        ),
        (
            r"(?i)\bthe only (?:constant|certainty|rule|truth) is\b",
            "self-undermining absolute",
        ),
        (r"(?i)\b(?:i|we) know (?:that )?(?:i|we) know nothing\b", "knowing nothing"),
        (r"(?i)\bless is more\b|\bmore is less\b", "inverted magnitude"),
        (r"(?i)\bimpossible\b[^.!?]*\bpossible\b", "possibility inversion"),
    ]
    .into_iter()
    .filter_map(|(pattern, label)| Regex::new(pattern).ok().map(|re| (re, label)))
    .collect()
});

const NEGATIONS: &[&str] = &["not", "no", "never", "cannot"];
/// Qualifiers dropped before comparing sentences, so that "always X" and
/// "never X" compare equal up to negation.
const QUALIFIERS: &[&str] = &["always", "ever", "indeed", "really"];

const TEMPORAL_WORDS: &[&str] = &[
    "time", "when", "before", "after", "always", "never", "sometimes", "yesterday", "tomorrow",
    "future", "past", "moment", "forever", "now",
];
const SYMBOLIC_WORDS: &[&str] = &[
    "symbol", "meaning", "sign", "word", "words", "glyph", "metaphor", "statement", "sentence",
    "language",
];
const ONTOLOGICAL_WORDS: &[&str] = &[
    "exist", "exists", "existence", "being", "real", "reality", "nothing", "everything",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub description: String,
    /// Text the detection was drawn from.
    pub excerpt: String,
    pub kind: ParadoxKind,
}

/// Scan text for paradox signals. Returns at most `MAX_PARADOX_DETECTIONS`
/// detections and whether the cap was reached.
pub fn scan(text: &str) -> (Vec<Detection>, bool) {
    let mut detections = Vec::new();

    'signals: for (re, label) in SIGNALS.iter() {
        for m in re.find_iter(text) {
            if detections.len() >= MAX_PARADOX_DETECTIONS {
                break 'signals;
            }
            let excerpt = m.as_str().trim().to_string();
            detections.push(Detection {
                description: format!("{}: \"{}\"", label, excerpt),
                kind: classify(&excerpt),
                excerpt,
            });
        }
    }

    if detections.len() < MAX_PARADOX_DETECTIONS {
        let sentences = sentences(text);
        let forms: Vec<(Vec<String>, bool)> = sentences.iter().map(|s| negation_form(s)).collect();

        // First sentence seen per stem, indexed by negation parity.
        let mut seen: HashMap<&[String], [Option<usize>; 2]> = HashMap::new();
        for (j, (stem, negated)) in forms.iter().enumerate() {
            if detections.len() >= MAX_PARADOX_DETECTIONS {
                break;
            }
            if stem.is_empty() {
                continue;
            }
            let slots = seen.entry(stem.as_slice()).or_default();
            if let Some(i) = slots[usize::from(!*negated)] {
                let excerpt = format!("{}. {}.", sentences[i], sentences[j]);
                detections.push(Detection {
                    description: format!("contradiction between \"{}\" and \"{}\"", sentences[i], sentences[j]),
                    kind: classify(&excerpt),
                    excerpt,
                });
            }
            slots[usize::from(*negated)].get_or_insert(j);
        }
    }

    let overloaded = detections.len() >= MAX_PARADOX_DETECTIONS;
    (detections, overloaded)
}

fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Two sentences contradict when they say the same thing with opposite
/// negation parity ("the sky is blue" / "the sky is not blue").
pub fn contradicts(a: &str, b: &str) -> bool {
    let (stem_a, neg_a) = negation_form(a);
    let (stem_b, neg_b) = negation_form(b);
    !stem_a.is_empty() && stem_a == stem_b && neg_a != neg_b
}

fn negation_form(sentence: &str) -> (Vec<String>, bool) {
    let mut negations = 0usize;
    let mut stem = Vec::new();

    for raw in sentence.split_whitespace() {
        let word: String = raw
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '\'')
            .collect::<String>()
            .to_lowercase();
        if word.is_empty() {
            continue;
        }
        if NEGATIONS.contains(&word.as_str()) {
            negations += 1;
            if word == "cannot" {
                stem.push("can".to_string());
            }
            continue;
        }
        if let Some(base) = word.strip_suffix("n't") {
            negations += 1;
            let base = match base {
                "wo" => "will",
                "ca" => "can",
                other => other,
            };
            stem.push(base.to_string());
            continue;
        }
        if QUALIFIERS.contains(&word.as_str()) {
            continue;
        }
        stem.push(word);
    }

    (stem, negations % 2 == 1)
}

/// Kind inferred from keyword content: temporal, then symbolic, then
/// ontological, else logical.
pub fn classify(text: &str) -> ParadoxKind {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();
    let has_any = |list: &[&str]| words.iter().any(|w| list.contains(&w.as_str()));

    if has_any(TEMPORAL_WORDS) {
        ParadoxKind::Temporal
    } else if has_any(SYMBOLIC_WORDS) {
        ParadoxKind::Symbolic
    } else if has_any(ONTOLOGICAL_WORDS) {
        ParadoxKind::Ontological
    } else {
        ParadoxKind::Logical
    }
}
