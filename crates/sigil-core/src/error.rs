//! Error types for Sigil

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config error: {0}")]
    Configuration(String),

    #[error("engine '{engine}' depends on unregistered engine '{dependency}'")]
    MissingDependency { engine: String, dependency: String },

    #[error("engine fault: {engine} - {message}")]
    EngineFault { engine: String, message: String },

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn missing_dependency(engine: impl Into<String>, dependency: impl Into<String>) -> Self {
        Self::MissingDependency {
            engine: engine.into(),
            dependency: dependency.into(),
        }
    }

    pub fn engine_fault(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EngineFault {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// True for errors that must stop the process at boot.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::MissingDependency { .. })
    }
}
