//! Individual engine implementations.
//!
//! Each engine is a self-contained module. To add a new engine:
//! 1. Create a new file in this directory
//! 2. Implement the Engine trait
//! 3. Add `pub mod <name>;` here
//! 4. Register it in create_default_registry() in ../lib.rs
//! 5. Add its keywords to the catalog in sigil-core

pub mod archetype;
pub mod core_engine;
pub mod flame;
pub mod glyph;
pub mod mirror;
pub mod paradox;
