//! fedloop Core — configuration, error types, model version identifiers.

pub mod config;
pub mod error;
pub mod version;

pub use config::{FedloopConfig, QueueLayout};
pub use error::{Error, Result};
pub use version::ModelVersion;
