//! fedloop Aggregate — the training/aggregation step.
//!
//! Provides the `Aggregator` trait the orchestrator drives once a batch
//! clears the threshold. `SimulatedAggregator` sleeps for a fixed delay and
//! always succeeds; a real trainer plugs in behind the same trait.

pub mod aggregator;

pub use aggregator::{AggregationAck, AggregationError, Aggregator, BaseModelRef, SimulatedAggregator};

use std::sync::Arc;

use fedloop_core::FedloopConfig;

/// Create the aggregator used by the binary.
pub fn create_aggregator(config: &FedloopConfig) -> Arc<dyn Aggregator> {
    tracing::info!(
        "Using simulated aggregator (delay={}ms)",
        config.train_delay.as_millis()
    );
    Arc::new(SimulatedAggregator::new(config.train_delay))
}
