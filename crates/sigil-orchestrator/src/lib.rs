//! Sigil Orchestrator - directive chains, session recursion, runtime stats

pub mod chain;
pub mod config;
pub mod orchestrator;
pub mod response;
pub mod session;
pub mod stats;

pub use chain::DirectiveChain;
pub use config::{ModeConfig, OrchestratorConfig, ParadoxConfig, SigilConfig};
pub use orchestrator::{Orchestrator, RECURSION_TARGET};
pub use response::{Response, ResponseMetadata};
pub use session::{DepthGuard, SessionDepths, SessionScope};
pub use stats::{EngineRuntimeState, RuntimeStats};
