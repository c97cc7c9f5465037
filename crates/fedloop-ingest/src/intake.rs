//! Queue scanning: directory → parsed update batch.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::types::{ArtifactFormat, RejectedArtifact, UpdateArtifact, UpdateBatch};
use fedloop_core::FedloopConfig;

/// Reads pending update artifacts from the queue directory.
///
/// Intake is read-only: it never moves or deletes queue entries.
pub struct UpdateIntake {
    queue_path: PathBuf,
}

impl UpdateIntake {
    pub fn new(config: &FedloopConfig) -> Self {
        Self::with_path(&config.queue_path)
    }

    pub fn with_path(queue_path: impl AsRef<Path>) -> Self {
        Self {
            queue_path: queue_path.as_ref().to_path_buf(),
        }
    }

    /// Collect every parseable artifact currently in the queue.
    ///
    /// A missing queue directory yields an empty batch. Entries that fail
    /// to read or parse are recorded in `UpdateBatch::rejected`.
    pub fn collect(&self) -> UpdateBatch {
        let mut batch = UpdateBatch::default();

        let entries = match std::fs::read_dir(&self.queue_path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "Queue directory {} does not exist; no updates to collect",
                    self.queue_path.display()
                );
                return batch;
            }
            Err(e) => {
                warn!(
                    "Failed to list queue directory {}: {}",
                    self.queue_path.display(),
                    e
                );
                return batch;
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => warn!("Skipping unreadable queue entry: {}", e),
            }
        }
        paths.sort();

        for path in paths {
            if !path.is_file() {
                continue;
            }
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !ArtifactFormat::from_extension(ext).is_recognized() {
                debug!("Ignoring non-artifact entry {}", path.display());
                continue;
            }

            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            match parse_artifact(&path, &source) {
                Ok(artifact) => batch.artifacts.push(artifact),
                Err(reason) => {
                    warn!("Skipping update {}: {}", source, reason);
                    batch.rejected.push(RejectedArtifact { source, reason });
                }
            }
        }

        for group in batch.duplicate_groups() {
            warn!("Updates with identical content: {}", group.join(", "));
        }

        info!(
            "Collected {} update(s) from {} ({} rejected)",
            batch.len(),
            self.queue_path.display(),
            batch.rejected.len()
        );
        batch
    }
}

fn parse_artifact(path: &Path, source: &str) -> std::result::Result<UpdateArtifact, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("read failed: {e}"))?;
    let payload: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|e| format!("invalid JSON: {e}"))?;

    let client_id = payload
        .get("client_id")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(UpdateArtifact {
        source: source.to_string(),
        path: path.to_path_buf(),
        digest: hex::encode(Sha256::digest(&bytes)),
        client_id,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        std::fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn test_missing_queue_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let intake = UpdateIntake::with_path(dir.path().join("nope"));
        let batch = intake.collect();
        assert!(batch.is_empty());
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_collects_valid_and_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u1.json", r#"{"client_id": "c1", "gradients": [0.1]}"#);
        write(dir.path(), "u2.json", r#"{"gradients": [0.2]}"#);
        write(dir.path(), "bad.json", "{not json");

        let batch = UpdateIntake::with_path(dir.path()).collect();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.sources(), vec!["u1.json", "u2.json"]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].source, "bad.json");
        assert!(batch.rejected[0].reason.contains("invalid JSON"));
        assert_eq!(batch.artifacts[0].client_id.as_deref(), Some("c1"));
        assert_eq!(batch.artifacts[1].client_id, None);
    }

    #[test]
    fn test_ignores_unrecognized_entries() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "notes.txt", "hello");
        write(dir.path(), "grad_x.json.part", "{}");
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();
        write(dir.path(), "UPPER.JSON", "[1, 2, 3]");

        let batch = UpdateIntake::with_path(dir.path()).collect();
        assert_eq!(batch.sources(), vec!["UPPER.JSON"]);
        assert!(batch.rejected.is_empty());
    }

    #[test]
    fn test_digest_is_content_hash() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.json", "{}");
        write(dir.path(), "b.json", "{}");

        let batch = UpdateIntake::with_path(dir.path()).collect();
        assert_eq!(batch.artifacts[0].digest, batch.artifacts[1].digest);
        assert_eq!(batch.artifacts[0].digest.len(), 64);
        assert_eq!(batch.duplicate_groups().len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_stay_distinct() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"a\xff.json")), "{}").unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"b\xfe.json")), "{broken").unwrap();
        std::fs::write(dir.path().join(OsStr::from_bytes(b"c\xfe.json")), "[]").unwrap();

        let batch = UpdateIntake::with_path(dir.path()).collect();
        assert_eq!(batch.sources(), vec!["a\u{FFFD}.json", "c\u{FFFD}.json"]);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].source, "b\u{FFFD}.json");
    }

    #[test]
    fn test_collect_is_read_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "u1.json", "{}");
        write(dir.path(), "bad.json", "");

        let intake = UpdateIntake::with_path(dir.path());
        intake.collect();
        intake.collect();
        assert!(dir.path().join("u1.json").exists());
        assert!(dir.path().join("bad.json").exists());
    }
}
