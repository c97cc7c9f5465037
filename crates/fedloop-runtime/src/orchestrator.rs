//! Orchestrator — one collect → gate → aggregate → drain → publish cycle.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use tracing::{info, warn};

use fedloop_aggregate::{Aggregator, BaseModelRef};
use fedloop_core::{Error, FedloopConfig, ModelVersion, Result};
use fedloop_ingest::{UpdateIntake, UpdateQueue};

use crate::drain::drain_batch;
use crate::publish::{current_version, VersionPublisher};
use crate::types::*;

/// Runs aggregation cycles against the configured queue.
///
/// Nothing carries over between cycles except the counters in
/// `CycleMetrics` and the version marker on disk.
pub struct CycleOrchestrator {
    config: FedloopConfig,
    intake: UpdateIntake,
    aggregator: Arc<dyn Aggregator>,
    publisher: VersionPublisher,
    metrics: RwLock<CycleMetrics>,
}

impl CycleOrchestrator {
    pub fn new(config: FedloopConfig, aggregator: Arc<dyn Aggregator>) -> Self {
        info!(
            "Orchestrator initialized: queue={}, min_updates={}, aggregator={}",
            config.queue_path.display(),
            config.min_updates_to_train,
            aggregator.name()
        );

        Self {
            intake: UpdateIntake::new(&config),
            publisher: VersionPublisher::new(&config),
            config,
            aggregator,
            metrics: RwLock::new(CycleMetrics::default()),
        }
    }

    pub fn config(&self) -> &FedloopConfig {
        &self.config
    }

    /// Snapshot of the cumulative counters.
    pub fn metrics(&self) -> CycleMetrics {
        self.metrics.read().clone()
    }

    /// Run one cycle to completion.
    ///
    /// Per-artifact problems (unparseable updates, failed deletions) are
    /// logged and reflected in the report. Only aggregation or publish
    /// failures fail the cycle.
    pub fn run_cycle(&self) -> Result<CycleReport> {
        let result = self.execute();

        let mut metrics = self.metrics.write();
        metrics.cycles_run += 1;
        match &result {
            Ok(report) if report.outcome == CycleOutcome::Trained => metrics.cycles_trained += 1,
            Ok(_) => metrics.cycles_skipped += 1,
            Err(_) => metrics.cycles_failed += 1,
        }
        result
    }

    /// Count a cycle that died without returning, e.g. a panic caught by
    /// the scheduler.
    pub fn record_aborted_cycle(&self) {
        let mut metrics = self.metrics.write();
        metrics.cycles_run += 1;
        metrics.cycles_failed += 1;
    }

    fn execute(&self) -> Result<CycleReport> {
        let start = Instant::now();
        let required = self.config.min_updates_to_train;

        // Stage 1: Collect
        let batch = self.intake.collect();
        self.metrics.write().artifacts_rejected += batch.rejected.len() as u64;

        let mut report = CycleReport {
            outcome: CycleOutcome::Skipped,
            collected: batch.len(),
            rejected: batch.rejected.len(),
            required,
            aggregation: None,
            drain: DrainReport::default(),
            version: None,
            duration_ms: 0,
        };

        // Stage 2: Threshold gate
        if batch.len() < required {
            info!(
                "Skipping cycle: {} update(s) collected, {} required",
                batch.len(),
                required
            );
            report.duration_ms = start.elapsed().as_millis() as u64;
            return Ok(report);
        }

        // Stage 3: Aggregate
        let base_model = BaseModelRef::probe(&self.config.model_path);
        if !base_model.present {
            warn!(
                "Base model {} not found; aggregating from a fresh model",
                base_model.path.display()
            );
        }
        info!("Training on {} update(s)", batch.len());
        let ack = self
            .aggregator
            .aggregate(&batch, &base_model)
            .map_err(|e| Error::Aggregation(e.to_string()))?;
        self.metrics.write().artifacts_aggregated += ack.updates_aggregated as u64;

        // Stage 4: Drain
        report.drain = drain_batch(&batch);
        self.metrics.write().drain_failures += report.drain.failed.len() as u64;

        // Stage 5: Publish
        let version = self.publisher.publish()?;

        report.outcome = CycleOutcome::Trained;
        report.aggregation = Some(ack);
        report.version = Some(version);
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Cycle complete: trained on {} update(s), version={}, duration={}ms",
            report.collected, version, report.duration_ms
        );
        Ok(report)
    }

    /// Current queue, version, and counter snapshot.
    ///
    /// An unreadable version marker is reported as `ModelVersion::INITIAL`
    /// so the queue summary is still available.
    pub fn status(&self) -> Result<RuntimeStatus> {
        let version_path = self.publisher.version_path();
        let current_version = match current_version(version_path) {
            Ok(version) => version,
            Err(e) => {
                warn!(
                    "Ignoring unreadable version marker {}: {}",
                    version_path.display(),
                    e
                );
                ModelVersion::INITIAL
            }
        };
        Ok(RuntimeStatus {
            queue_path: self.config.queue_path.clone(),
            pending_updates: UpdateQueue::new(&self.config).pending_count(),
            current_version,
            base_model_present: BaseModelRef::probe(&self.config.model_path).present,
            min_updates_to_train: self.config.min_updates_to_train,
            poll_interval_secs: self.config.poll_interval.as_secs(),
            metrics: self.metrics(),
        })
    }
}
