//! Command-line surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use fedloop_core::FedloopConfig;

#[derive(Debug, Parser)]
#[command(name = "fedloop", version, about = "Federated update aggregation server")]
pub struct Cli {
    /// Data directory holding `fl_updates/` and `models/`.
    #[arg(long, global = true, env = "FEDLOOP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Seconds between scheduled cycles.
    #[arg(long, global = true)]
    pub interval_secs: Option<u64>,

    /// Minimum parsed updates required before training.
    #[arg(long, global = true)]
    pub min_updates: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a single cycle and exit.
    Once,
    /// Run cycles on a fixed interval until Ctrl-C.
    Serve,
    /// Queue one update for the next cycle.
    Submit {
        /// Identifier of the submitting client.
        #[arg(long, default_value = "unknown")]
        client_id: String,
        /// JSON file with the update; reads stdin when omitted or `-`.
        file: Option<PathBuf>,
    },
    /// Print queue and version status as JSON.
    Status,
}

impl Cli {
    /// Apply command-line overrides on top of environment configuration.
    pub fn apply_overrides(&self, config: &mut FedloopConfig) -> fedloop_core::Result<()> {
        if let Some(secs) = self.interval_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(min) = self.min_updates {
            config.min_updates_to_train = min;
        }
        config.validate()
    }
}

/// Resolve the data directory: flag/env, then `../data` beside the
/// executable, then `./data`.
pub fn resolve_data_dir(explicit: Option<&PathBuf>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.clone();
    }
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));
    if let Some(dir) = exe_dir {
        let parent_data = dir.join("../data");
        if parent_data.exists() {
            return parent_data;
        }
    }
    PathBuf::from("data")
}
