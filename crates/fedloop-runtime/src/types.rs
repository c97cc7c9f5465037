//! Runtime types.

use std::path::PathBuf;

use serde::Serialize;

use fedloop_aggregate::AggregationAck;
use fedloop_core::ModelVersion;

/// How a cycle ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleOutcome {
    /// Enough updates: aggregated, drained, published.
    Trained,
    /// Below threshold; nothing touched.
    Skipped,
}

/// A queue entry that could not be removed after aggregation. It stays in
/// the queue and is collected again next cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DrainFailure {
    pub source: String,
    pub reason: String,
}

/// Result of deleting a consumed batch from the queue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DrainReport {
    pub removed: Vec<String>,
    pub failed: Vec<DrainFailure>,
}

impl DrainReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Summary of a single cycle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleReport {
    pub outcome: CycleOutcome,
    /// Artifacts that parsed and entered the batch.
    pub collected: usize,
    /// Queue entries skipped at intake.
    pub rejected: usize,
    /// Threshold in force for this cycle.
    pub required: usize,
    pub aggregation: Option<AggregationAck>,
    pub drain: DrainReport,
    pub version: Option<ModelVersion>,
    pub duration_ms: u64,
}

/// Cumulative counters across cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleMetrics {
    pub cycles_run: u64,
    pub cycles_trained: u64,
    pub cycles_skipped: u64,
    pub cycles_failed: u64,
    pub artifacts_aggregated: u64,
    pub artifacts_rejected: u64,
    /// Deletions that failed after aggregation; each one means the artifact
    /// will be aggregated again.
    pub drain_failures: u64,
}

/// Runtime status information.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    pub queue_path: PathBuf,
    pub pending_updates: usize,
    pub current_version: ModelVersion,
    pub base_model_present: bool,
    pub min_updates_to_train: usize,
    pub poll_interval_secs: u64,
    pub metrics: CycleMetrics,
}
