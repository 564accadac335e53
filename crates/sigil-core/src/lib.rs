//! Sigil Core - directive grammar, shared types, and error handling

pub mod directive;
pub mod error;
pub mod parser;
pub mod recursion;
pub mod types;

pub use directive::{Directive, KeywordSpec, Requirement, ValidationResult, ValidationRule};
pub use error::{Error, Result};
pub use recursion::{RecursionGauge, MAX_PARADOX_DETECTIONS, MAX_RECURSION_DEPTH};
pub use types::*;
