//! Directive chain: parsed directives in priority order, annotated with
//! their engines' declared dependencies, plus one validation result each.

use serde::Serialize;
use sigil_core::parser;
use sigil_core::{Directive, ValidationResult};
use sigil_engines::EngineRegistry;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize)]
pub struct DirectiveChain {
    /// Ascending priority (lower number runs first); scan order among equals.
    pub directives: Vec<Directive>,
    /// Directive keyword → dependency names declared by its engine.
    pub dependencies: HashMap<String, Vec<String>>,
    pub validations: Vec<ValidationResult>,
}

impl DirectiveChain {
    pub fn build(text: &str, registry: &EngineRegistry) -> Self {
        let mut directives = parser::parse(text);
        // Stable: equal priorities keep their scan order.
        directives.sort_by_key(|d| d.priority);

        let mut dependencies = HashMap::new();
        for directive in &directives {
            let deps = directive
                .engine
                .as_deref()
                .and_then(|name| registry.dependencies_of(name))
                .or_else(|| {
                    registry
                        .for_keyword(&directive.keyword)
                        .and_then(|engine| registry.dependencies_of(engine.name()))
                })
                .unwrap_or_default();
            dependencies.entry(directive.keyword.clone()).or_insert(deps);
        }

        let validations: Vec<ValidationResult> = directives.iter().map(Directive::validate).collect();

        debug!(
            "Built chain [{}] ({} invalid)",
            directives.iter().map(|d| d.keyword.as_str()).collect::<Vec<_>>().join(", "),
            validations.iter().filter(|v| !v.is_valid).count()
        );

        Self {
            directives,
            dependencies,
            validations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_valid(&self) -> bool {
        self.validations.iter().all(|v| v.is_valid)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ValidationResult> {
        self.validations.iter().filter(|v| !v.is_valid)
    }

    /// Every validation error in chain order, joined into one message.
    pub fn error_summary(&self) -> String {
        self.failures()
            .flat_map(|v| v.errors.iter().map(move |e| format!("#{}: {}", v.keyword, e)))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn warnings(&self) -> Vec<String> {
        self.validations
            .iter()
            .flat_map(|v| v.warnings.iter().cloned())
            .collect()
    }

    pub fn keywords(&self) -> Vec<&str> {
        self.directives.iter().map(|d| d.keyword.as_str()).collect()
    }
}
