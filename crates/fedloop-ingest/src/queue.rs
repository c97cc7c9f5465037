//! Producer side of the update queue.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::types::ArtifactFormat;
use fedloop_core::{FedloopConfig, Result};

/// Envelope written for each submitted update.
#[derive(Debug, Serialize)]
struct Submission<'a> {
    client_id: &'a str,
    submitted_at: chrono::DateTime<chrono::Utc>,
    gradients: &'a serde_json::Value,
}

/// Writes client updates into the queue directory.
pub struct UpdateQueue {
    queue_path: PathBuf,
}

impl UpdateQueue {
    pub fn new(config: &FedloopConfig) -> Self {
        Self::with_path(&config.queue_path)
    }

    pub fn with_path(queue_path: impl AsRef<Path>) -> Self {
        Self {
            queue_path: queue_path.as_ref().to_path_buf(),
        }
    }

    /// Enqueue a raw JSON update. Malformed JSON is rejected before
    /// anything is written.
    pub fn enqueue_raw(&self, client_id: &str, raw: &str) -> Result<PathBuf> {
        let gradients: serde_json::Value = serde_json::from_str(raw)?;
        self.enqueue(client_id, &gradients)
    }

    /// Enqueue an update as `grad_<uuid>.json`.
    ///
    /// The file is written under a `.part` name and renamed into place, so
    /// intake never sees a half-written artifact.
    pub fn enqueue(&self, client_id: &str, gradients: &serde_json::Value) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.queue_path)?;

        let submission = Submission {
            client_id,
            submitted_at: chrono::Utc::now(),
            gradients,
        };
        let body = serde_json::to_vec_pretty(&submission)?;

        let name = format!("grad_{}.json", uuid::Uuid::new_v4().simple());
        let target = self.queue_path.join(&name);
        let staging = self.queue_path.join(format!("{name}.part"));

        std::fs::write(&staging, body)?;
        if let Err(e) = std::fs::rename(&staging, &target) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }

        info!("Queued update {} from client {}", name, client_id);
        Ok(target)
    }

    /// Number of artifact files waiting in the queue, parseable or not.
    pub fn pending_count(&self) -> usize {
        let Ok(entries) = std::fs::read_dir(&self.queue_path) else {
            return 0;
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
                ArtifactFormat::from_extension(ext).is_recognized()
            })
            .count()
    }
}
