//! Error types for the animation engine
//!
//! Configuration problems are surfaced before the loop starts. Source
//! problems (missing or malformed pseudo-files) are fatal once the loop runs.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the engine
#[derive(Debug, Error)]
pub enum PetError {
    /// Invalid configuration detected at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// A metric source could not be read
    #[error("failed to read {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metric source was read but its content could not be parsed
    #[error("malformed content in {}: {detail}", path.display())]
    Malformed { path: PathBuf, detail: String },

    /// Unit suffix not understood by the bandwidth parser
    #[error("unknown bandwidth unit '{0}'")]
    UnknownUnit(String),

    /// A frame could not be written to the status bar
    #[error("failed to write frame: {0}")]
    Output(#[from] std::io::Error),
}

impl PetError {
    pub fn config(message: impl Into<String>) -> Self {
        PetError::Config(message.into())
    }

    pub fn malformed(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        PetError::Malformed {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Returns true for errors raised before the loop starts
    pub fn is_config(&self) -> bool {
        matches!(self, PetError::Config(_))
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PetError>;
