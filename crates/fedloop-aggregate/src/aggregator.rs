//! Aggregation trait and implementations.
//!
//! The `Aggregator` trait abstracts over the training step.
//! Implementations:
//! - `SimulatedAggregator`: fixed delay, always succeeds
//! - Real trainers: consume the batch and the base model, write a new model

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use fedloop_ingest::UpdateBatch;

/// Base model artifact handed to the aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct BaseModelRef {
    pub path: PathBuf,
    /// Whether the file existed when the cycle checked. A missing base
    /// model is not fatal; aggregators fall back to a fresh model.
    pub present: bool,
}

impl BaseModelRef {
    /// Check the base model path once.
    pub fn probe(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            present: path.is_file(),
        }
    }
}

/// Acknowledgement of a completed aggregation.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationAck {
    /// Number of updates folded into the model.
    #[serde(rename = "updatesAggregated")]
    pub updates_aggregated: usize,
    /// Whether a base model was used as the starting point.
    #[serde(rename = "fromBaseModel")]
    pub from_base_model: bool,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
}

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("empty batch")]
    EmptyBatch,

    #[error("training failed: {0}")]
    Training(String),
}

/// Trait for aggregation backends.
pub trait Aggregator: Send + Sync {
    /// Fold a batch of updates into the global model.
    fn aggregate(
        &self,
        batch: &UpdateBatch,
        base_model: &BaseModelRef,
    ) -> Result<AggregationAck, AggregationError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Placeholder trainer: waits a fixed delay, then reports success.
pub struct SimulatedAggregator {
    delay: Duration,
}

impl SimulatedAggregator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Aggregator for SimulatedAggregator {
    fn aggregate(
        &self,
        batch: &UpdateBatch,
        base_model: &BaseModelRef,
    ) -> Result<AggregationAck, AggregationError> {
        if batch.is_empty() {
            return Err(AggregationError::EmptyBatch);
        }

        let start = Instant::now();
        info!(
            "Simulating aggregation of {} update(s) for {}ms",
            batch.len(),
            self.delay.as_millis()
        );
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        Ok(AggregationAck {
            updates_aggregated: batch.len(),
            from_base_model: base_model.present,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
