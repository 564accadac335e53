//! Directives, the static keyword catalog, and per-keyword validation rules

use crate::types::{ParamValue, Params};
use crate::MAX_RECURSION_DEPTH;
use serde::Serialize;

/// Priority given to keywords with no catalog entry (runs last).
pub const UNKNOWN_PRIORITY: u8 = u8::MAX;

/// Name of the parameter produced by a body without a `:` or `=`.
pub const BARE_PARAM: &str = "value";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

/// One check applied to a directive parameter.
#[derive(Clone, Copy, Debug)]
pub struct ValidationRule {
    pub field: &'static str,
    pub requirement: Requirement,
    pub predicate: fn(&ParamValue) -> bool,
    pub message: &'static str,
    /// The bare `value` parameter satisfies this field.
    pub accepts_bare: bool,
}

impl ValidationRule {
    const fn required(field: &'static str, predicate: fn(&ParamValue) -> bool, message: &'static str) -> Self {
        Self {
            field,
            requirement: Requirement::Required,
            predicate,
            message,
            accepts_bare: true,
        }
    }

    const fn optional(field: &'static str, predicate: fn(&ParamValue) -> bool, message: &'static str) -> Self {
        Self {
            field,
            requirement: Requirement::Optional,
            predicate,
            message,
            accepts_bare: false,
        }
    }

    /// Optional field that a bare body such as `#FLAME[9]` also fills.
    const fn optional_bare(field: &'static str, predicate: fn(&ParamValue) -> bool, message: &'static str) -> Self {
        Self {
            accepts_bare: true,
            ..Self::optional(field, predicate, message)
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub keyword: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Static description of one directive keyword.
#[derive(Debug)]
pub struct KeywordSpec {
    pub keyword: &'static str,
    pub engine: &'static str,
    pub priority: u8,
    pub usage: &'static str,
    pub summary: &'static str,
    pub params: &'static [&'static str],
    pub rules: &'static [ValidationRule],
}

impl KeywordSpec {
    pub fn help(&self) -> String {
        format!(
            "{} - {} (engine: {}, priority {})",
            self.usage, self.summary, self.engine, self.priority
        )
    }
}

fn non_empty(v: &ParamValue) -> bool {
    !v.is_blank()
}

fn positive_number(v: &ParamValue) -> bool {
    v.as_number().is_some_and(|n| n >= 1.0)
}

fn intensity(v: &ParamValue) -> bool {
    v.as_number().is_some_and(|n| (1.0..=10.0).contains(&n))
}

fn mirror_mode(v: &ParamValue) -> bool {
    matches!(v.as_text(), Some(m) if m.eq_ignore_ascii_case("words") || m.eq_ignore_ascii_case("letters"))
}

fn any(_: &ParamValue) -> bool {
    true
}

static CATALOG: &[KeywordSpec] = &[
    KeywordSpec {
        keyword: "CORE",
        engine: "core",
        priority: 1,
        usage: "#CORE[FOCUS:text] or #CORE[text]",
        summary: "ground the input in the core resonance",
        params: &["FOCUS"],
        rules: &[ValidationRule::optional_bare("FOCUS", non_empty, "CORE FOCUS must not be empty")],
    },
    KeywordSpec {
        keyword: "RECURSE",
        engine: "core",
        priority: 2,
        usage: "#RECURSE[DEPTH:3]",
        summary: "feed the accumulated output back through the core engine",
        params: &["DEPTH"],
        rules: &[ValidationRule::required(
            "DEPTH",
            positive_number,
            "RECURSE requires a numeric DEPTH of at least 1",
        )],
    },
    KeywordSpec {
        keyword: "PARADOX",
        engine: "paradox",
        priority: 3,
        usage: "#PARADOX[THREAD|RESOLVE|DIMENSION|ANALYZE:value]",
        summary: "open, resolve, explore, or analyze paradoxes",
        params: &["THREAD", "RESOLVE", "DIMENSION", "ANALYZE"],
        rules: &[
            ValidationRule::optional("THREAD", non_empty, "PARADOX THREAD must not be empty"),
            ValidationRule::optional("RESOLVE", non_empty, "PARADOX RESOLVE must name a paradox id"),
            ValidationRule::optional("DIMENSION", non_empty, "PARADOX DIMENSION must not be empty"),
            ValidationRule::optional("ANALYZE", any, ""),
        ],
    },
    KeywordSpec {
        keyword: "THREAD",
        engine: "paradox",
        priority: 3,
        usage: "#THREAD[NAME:t1]",
        summary: "open a named paradox thread",
        params: &["NAME"],
        rules: &[ValidationRule::required("NAME", non_empty, "THREAD requires a NAME")],
    },
    KeywordSpec {
        keyword: "RESOLVE",
        engine: "paradox",
        priority: 3,
        usage: "#RESOLVE[ID:px-1a2b3c4d]",
        summary: "attempt dimensional refraction of an open paradox",
        params: &["ID"],
        rules: &[ValidationRule::required("ID", non_empty, "RESOLVE requires a paradox ID")],
    },
    KeywordSpec {
        keyword: "DIMENSION",
        engine: "paradox",
        priority: 3,
        usage: "#DIMENSION[NAME:temporal]",
        summary: "explore one of the ten symbolic dimensions",
        params: &["NAME"],
        rules: &[ValidationRule::required("NAME", non_empty, "DIMENSION requires a NAME")],
    },
    KeywordSpec {
        keyword: "ARCHETYPE",
        engine: "archetype",
        priority: 4,
        usage: "#ARCHETYPE[NAME:sage]",
        summary: "invoke an archetype over the input",
        params: &["NAME"],
        rules: &[ValidationRule::required("NAME", non_empty, "ARCHETYPE requires a NAME")],
    },
    KeywordSpec {
        keyword: "GLYPH",
        engine: "glyph",
        priority: 5,
        usage: "#GLYPH[NAME:spiral]",
        summary: "inscribe a named glyph",
        params: &["NAME"],
        rules: &[ValidationRule::required("NAME", non_empty, "GLYPH requires a NAME")],
    },
    KeywordSpec {
        keyword: "MIRROR",
        engine: "mirror",
        priority: 6,
        usage: "#MIRROR[MODE:words] or #MIRROR[letters]",
        summary: "reflect the input by words or letters",
        params: &["MODE"],
        rules: &[ValidationRule::optional_bare("MODE", mirror_mode, "MIRROR MODE must be 'words' or 'letters'")],
    },
    KeywordSpec {
        keyword: "FLAME",
        engine: "flame",
        priority: 7,
        usage: "#FLAME[INTENSITY:5] or #FLAME[5]",
        summary: "intensify the input",
        params: &["INTENSITY"],
        rules: &[ValidationRule::optional_bare("INTENSITY", intensity, "FLAME INTENSITY must be a number from 1 to 10")],
    },
];

pub fn catalog() -> &'static [KeywordSpec] {
    CATALOG
}

pub fn lookup(keyword: &str) -> Option<&'static KeywordSpec> {
    CATALOG.iter().find(|s| s.keyword == keyword)
}

/// One parsed `#KEYWORD[...]` command.
#[derive(Clone, Debug, Serialize)]
pub struct Directive {
    pub keyword: String,
    pub params: Params,
    /// Engine named by the catalog; `None` for unknown keywords.
    pub engine: Option<String>,
    pub priority: u8,
    #[serde(skip)]
    pub rules: &'static [ValidationRule],
    /// The matched source text, e.g. `#GLYPH[NAME:x]`.
    pub raw: String,
    /// Byte offset of the match in the scanned text.
    pub position: usize,
}

impl Directive {
    pub fn new(keyword: impl Into<String>, params: Params) -> Self {
        let keyword = keyword.into();
        let spec = lookup(&keyword);
        Self {
            engine: spec.map(|s| s.engine.to_string()),
            priority: spec.map_or(UNKNOWN_PRIORITY, |s| s.priority),
            rules: spec.map(|s| s.rules).unwrap_or(&[]),
            raw: String::new(),
            position: 0,
            keyword,
            params,
        }
    }

    pub fn spec(&self) -> Option<&'static KeywordSpec> {
        lookup(&self.keyword)
    }

    /// Parameter lookup that falls back to the bare `value` parameter.
    pub fn param_or_bare(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name).or_else(|| self.params.get(BARE_PARAM))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for rule in self.rules {
            let value = self.params.get(rule.field).or_else(|| {
                if rule.accepts_bare {
                    self.params.get(BARE_PARAM)
                } else {
                    None
                }
            });
            match value {
                None if rule.requirement == Requirement::Required => errors.push(rule.message.to_string()),
                None => {}
                Some(v) if !(rule.predicate)(v) => errors.push(format!("{} (got '{}')", rule.message, v)),
                Some(_) => {}
            }
        }

        match self.spec() {
            Some(spec) => {
                let bare_ok = spec.rules.iter().any(|r| r.accepts_bare);
                for name in self.params.names() {
                    let known = spec.params.iter().any(|p| p.eq_ignore_ascii_case(name))
                        || (bare_ok && name == BARE_PARAM);
                    if !known {
                        warnings.push(format!("unknown parameter '{}' for #{}", name, self.keyword));
                    }
                }
            }
            None => warnings.push(format!("#{} is not a known directive", self.keyword)),
        }

        if self.keyword == "RECURSE" {
            if let Some(depth) = self.param_or_bare("DEPTH").and_then(ParamValue::as_number) {
                if depth > MAX_RECURSION_DEPTH as f64 {
                    warnings.push(format!(
                        "RECURSE DEPTH {} exceeds ceiling {}; clamped",
                        depth, MAX_RECURSION_DEPTH
                    ));
                }
            }
        }

        ValidationResult {
            keyword: self.keyword.clone(),
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}
