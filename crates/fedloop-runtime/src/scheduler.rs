//! Fixed-interval cycle scheduler.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::orchestrator::CycleOrchestrator;
use crate::types::CycleReport;

/// Repeats `CycleOrchestrator::run_cycle` until told to stop.
///
/// The stop signal is only checked between cycles; a running cycle always
/// finishes. A failed or panicking cycle is logged and the loop goes on.
pub struct Scheduler {
    orchestrator: Arc<CycleOrchestrator>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<CycleOrchestrator>) -> Self {
        let interval = orchestrator.config().poll_interval;
        Self {
            orchestrator,
            interval,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run cycles until `shutdown` turns true or its sender is dropped.
    /// Returns the number of cycles started.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        info!(
            "Scheduler started: interval={}s",
            self.interval.as_secs_f64()
        );
        let mut cycles = 0u64;

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            cycles += 1;
            info!("Cycle {}: checking for updates", cycles);
            self.run_once().await;

            let m = self.orchestrator.metrics();
            info!(
                "Totals: trained={}, skipped={}, failed={}, drain_failures={}",
                m.cycles_trained, m.cycles_skipped, m.cycles_failed, m.drain_failures
            );
            info!("Waiting {}s", self.interval.as_secs_f64());

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        info!("Shutdown channel closed");
                        break;
                    }
                }
            }
        }

        info!("Scheduler stopped after {} cycle(s)", cycles);
        cycles
    }

    /// Run a single cycle on the blocking pool and absorb its failure.
    pub async fn run_once(&self) -> Option<CycleReport> {
        let orchestrator = self.orchestrator.clone();
        match tokio::task::spawn_blocking(move || orchestrator.run_cycle()).await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                error!("Error during training cycle: {}", e);
                None
            }
            Err(e) => {
                error!("Training cycle aborted: {}", e);
                self.orchestrator.record_aborted_cycle();
                None
            }
        }
    }
}

/// Shutdown signal that flips to `true` on Ctrl-C.
pub fn shutdown_on_ctrl_c() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received; stopping after the current cycle");
                let _ = tx.send(true);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C: {}", e);
                // Keep the sender alive so the scheduler is not stopped.
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
