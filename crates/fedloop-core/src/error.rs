//! Error types for fedloop.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Aggregation failed: {0}")]
    Aggregation(String),

    #[error("Failed to publish version to {}: {source}", path.display())]
    Publish {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
