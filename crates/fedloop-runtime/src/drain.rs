//! Queue drain — removes aggregated artifacts.
//!
//! Best effort per artifact: one failed deletion is reported and the rest
//! continue. Whatever could not be removed is collected again next cycle,
//! so an update may be aggregated more than once but is never lost.

use std::io::ErrorKind;

use tracing::{debug, error, info};

use crate::types::{DrainFailure, DrainReport};
use fedloop_ingest::UpdateBatch;

/// Delete every member of `batch` from the queue.
pub fn drain_batch(batch: &UpdateBatch) -> DrainReport {
    let mut report = DrainReport::default();

    for artifact in batch {
        match std::fs::remove_file(&artifact.path) {
            Ok(()) => report.removed.push(artifact.source.clone()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Update {} already gone from queue", artifact.source);
                report.removed.push(artifact.source.clone());
            }
            Err(e) => {
                error!("Failed to remove update {}: {}", artifact.source, e);
                report.failed.push(DrainFailure {
                    source: artifact.source.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if report.is_complete() {
        info!("Drained {} update(s) from queue", report.removed.len());
    } else {
        info!(
            "Drained {} update(s); {} left in queue for the next cycle",
            report.removed.len(),
            report.failed.len()
        );
    }
    report
}
