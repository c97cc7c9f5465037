//! Update artifact types.

use std::collections::HashMap;
use std::path::PathBuf;

/// Recognized queue entry formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Unknown,
}

impl ArtifactFormat {
    /// Detect artifact format from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Unknown,
        }
    }

    /// Whether intake should try to parse entries of this format.
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// One parsed client update sitting in the queue.
#[derive(Debug, Clone)]
pub struct UpdateArtifact {
    /// File name inside the queue directory; used as the drain key.
    pub source: String,
    /// Full path of the queue entry.
    pub path: PathBuf,
    /// SHA-256 of the raw file bytes, hex encoded.
    pub digest: String,
    /// `client_id` from the submission envelope, if present.
    pub client_id: Option<String>,
    /// Parsed document. Opaque to the orchestrator.
    pub payload: serde_json::Value,
}

/// A queue entry that intake could not parse.
#[derive(Debug, Clone)]
pub struct RejectedArtifact {
    pub source: String,
    pub reason: String,
}

/// Artifacts collected in one cycle.
///
/// Only successfully parsed artifacts are members; entries that failed are
/// kept in `rejected` for reporting and never count toward the threshold.
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    pub artifacts: Vec<UpdateArtifact>,
    pub rejected: Vec<RejectedArtifact>,
}

impl UpdateBatch {
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Names of all member artifacts.
    pub fn sources(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.source.as_str()).collect()
    }

    /// Groups of member sources sharing identical content.
    pub fn duplicate_groups(&self) -> Vec<Vec<&str>> {
        let mut by_digest: HashMap<&str, Vec<&str>> = HashMap::new();
        for artifact in &self.artifacts {
            by_digest
                .entry(artifact.digest.as_str())
                .or_default()
                .push(artifact.source.as_str());
        }
        let mut groups: Vec<Vec<&str>> = by_digest
            .into_values()
            .filter(|sources| sources.len() > 1)
            .collect();
        for group in &mut groups {
            group.sort_unstable();
        }
        groups.sort();
        groups
    }
}

impl<'a> IntoIterator for &'a UpdateBatch {
    type Item = &'a UpdateArtifact;
    type IntoIter = std::slice::Iter<'a, UpdateArtifact>;

    fn into_iter(self) -> Self::IntoIter {
        self.artifacts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(source: &str, digest: &str) -> UpdateArtifact {
        UpdateArtifact {
            source: source.into(),
            path: PathBuf::from(source),
            digest: digest.into(),
            client_id: None,
            payload: serde_json::json!({}),
        }
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ArtifactFormat::from_extension("json"), ArtifactFormat::Json);
        assert_eq!(ArtifactFormat::from_extension("JSON"), ArtifactFormat::Json);
        assert_eq!(ArtifactFormat::from_extension("part"), ArtifactFormat::Unknown);
        assert!(!ArtifactFormat::from_extension("txt").is_recognized());
    }

    #[test]
    fn test_duplicate_groups() {
        let batch = UpdateBatch {
            artifacts: vec![
                artifact("b.json", "aa"),
                artifact("c.json", "bb"),
                artifact("a.json", "aa"),
            ],
            rejected: Vec::new(),
        };
        assert_eq!(batch.duplicate_groups(), vec![vec!["a.json", "b.json"]]);
        assert_eq!(batch.len(), 3);
    }

    #[test]
    fn test_rejected_do_not_count() {
        let batch = UpdateBatch {
            artifacts: vec![artifact("a.json", "aa")],
            rejected: vec![RejectedArtifact {
                source: "bad.json".into(),
                reason: "EOF".into(),
            }],
        };
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.sources(), vec!["a.json"]);
    }
}
