//! Version marker publishing.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::info;

use fedloop_core::{Error, FedloopConfig, ModelVersion, Result};

/// Writes the version marker after a successful cycle.
pub struct VersionPublisher {
    version_path: PathBuf,
    /// Timestamp of the last version this publisher wrote.
    last_published: Mutex<Option<i64>>,
}

impl VersionPublisher {
    pub fn new(config: &FedloopConfig) -> Self {
        Self::with_path(&config.version_path)
    }

    pub fn with_path(version_path: impl AsRef<Path>) -> Self {
        Self {
            version_path: version_path.as_ref().to_path_buf(),
            last_published: Mutex::new(None),
        }
    }

    pub fn version_path(&self) -> &Path {
        &self.version_path
    }

    /// Stamp a new version from the clock and overwrite the marker.
    ///
    /// Two publishes within the same second still get distinct versions.
    /// The marker is replaced by rename, never truncated in place.
    pub fn publish(&self) -> Result<ModelVersion> {
        let mut last = self.last_published.lock();

        let mut version = ModelVersion::now();
        if let Some(prev) = *last {
            if version.timestamp <= prev {
                version.timestamp = prev + 1;
            }
        }

        let file_name = self
            .version_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("version");
        let staging = self.version_path.with_file_name(format!(".{file_name}.tmp"));

        let publish_err = |source: std::io::Error| Error::Publish {
            path: self.version_path.clone(),
            source,
        };
        std::fs::write(&staging, format!("{version}\n")).map_err(publish_err)?;
        if let Err(e) = std::fs::rename(&staging, &self.version_path) {
            let _ = std::fs::remove_file(&staging);
            return Err(publish_err(e));
        }

        *last = Some(version.timestamp);
        info!(
            "Published model version {} to {}",
            version,
            self.version_path.display()
        );
        Ok(version)
    }
}

/// Read the currently published version. A missing marker means nothing
/// has been published yet.
pub fn current_version(version_path: &Path) -> Result<ModelVersion> {
    match std::fs::read_to_string(version_path) {
        Ok(contents) => contents.parse(),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(ModelVersion::INITIAL),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_writes_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.txt");
        let publisher = VersionPublisher::with_path(&path);

        let version = publisher.publish().unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{version}\n"));
        assert!(contents.starts_with("1.0."));
        assert_eq!(current_version(&path).unwrap(), version);
    }

    #[test]
    fn test_publish_overwrites_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.txt");
        std::fs::write(&path, "1.0.0\nstale second line\n").unwrap();
        let publisher = VersionPublisher::with_path(&path);

        let first = publisher.publish().unwrap();
        let second = publisher.publish().unwrap();
        assert!(second > first);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{second}\n"));
        // No staging file left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_publish_unwritable_location() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("version.txt");
        let publisher = VersionPublisher::with_path(&path);

        let err = publisher.publish().unwrap_err();
        assert!(matches!(err, Error::Publish { .. }));
        assert!(!path.exists());

        // A failed publish does not reserve a timestamp.
        assert!(publisher.last_published.lock().is_none());
    }

    #[test]
    fn test_current_version_default() {
        let dir = tempfile::tempdir().unwrap();
        let v = current_version(&dir.path().join("version.txt")).unwrap();
        assert_eq!(v, ModelVersion::INITIAL);
    }

    #[test]
    fn test_current_version_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("version.txt");
        std::fs::write(&path, "latest").unwrap();
        assert!(matches!(current_version(&path), Err(Error::InvalidVersion(_))));
    }
}
