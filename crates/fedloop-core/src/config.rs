//! Configuration and data directory layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Default minimum number of parsed updates before a cycle trains.
pub const DEFAULT_MIN_UPDATES: usize = 1;
/// Default delay between scheduled cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// Default duration of the simulated aggregation step.
pub const DEFAULT_TRAIN_DELAY_MS: u64 = 2000;

/// Default on-disk layout under a data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueLayout {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Pending update artifacts (`data/fl_updates/`).
    pub queue: PathBuf,
    /// Base model artifact (`data/models/pancreas.tflite`).
    pub model: PathBuf,
    /// Published version marker (`data/models/version.txt`).
    pub version: PathBuf,
}

impl QueueLayout {
    /// Derive the layout from a root directory. Touches nothing on disk.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            queue: root.join("fl_updates"),
            model: root.join("models").join("pancreas.tflite"),
            version: root.join("models").join("version.txt"),
            root,
        }
    }
}

/// Top-level fedloop configuration.
///
/// Passed explicitly into every component; nothing reads the environment
/// after startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FedloopConfig {
    /// Directory scanned for pending update artifacts.
    pub queue_path: PathBuf,
    /// Base model artifact handed to the aggregator.
    pub model_path: PathBuf,
    /// Text file holding the currently published version.
    pub version_path: PathBuf,
    /// A cycle trains only when at least this many artifacts parse.
    pub min_updates_to_train: usize,
    /// Wall-clock delay between scheduled cycles.
    pub poll_interval: Duration,
    /// How long the simulated aggregator pretends to train.
    pub train_delay: Duration,
}

impl FedloopConfig {
    /// Configuration with default thresholds for the standard layout.
    pub fn with_layout(layout: &QueueLayout) -> Self {
        Self {
            queue_path: layout.queue.clone(),
            model_path: layout.model.clone(),
            version_path: layout.version.clone(),
            min_updates_to_train: DEFAULT_MIN_UPDATES,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            train_delay: Duration::from_millis(DEFAULT_TRAIN_DELAY_MS),
        }
    }

    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source.
    pub fn from_lookup<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let layout = QueueLayout::new(data_dir);
        let mut config = Self::with_layout(&layout);

        if let Some(dir) = lookup("FEDLOOP_QUEUE_DIR") {
            config.queue_path = PathBuf::from(dir);
        }
        if let Some(path) = lookup("FEDLOOP_MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("FEDLOOP_VERSION_PATH") {
            config.version_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("FEDLOOP_MIN_UPDATES") {
            config.min_updates_to_train = parse_number("FEDLOOP_MIN_UPDATES", &raw)? as usize;
        }
        if let Some(raw) = lookup("FEDLOOP_POLL_INTERVAL_SECS") {
            config.poll_interval =
                Duration::from_secs(parse_number("FEDLOOP_POLL_INTERVAL_SECS", &raw)?);
        }
        if let Some(raw) = lookup("FEDLOOP_TRAIN_DELAY_MS") {
            config.train_delay =
                Duration::from_millis(parse_number("FEDLOOP_TRAIN_DELAY_MS", &raw)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.min_updates_to_train == 0 {
            return Err(Error::Config(
                "min_updates_to_train must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll_interval must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Create the queue directory and the parents of the model and version
    /// files. Called once at startup.
    pub fn prepare_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.queue_path)?;
        for file in [&self.model_path, &self.version_path] {
            if let Some(parent) = file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| Error::Config(format!("{key}={raw:?} is not a valid number: {e}")))
}
