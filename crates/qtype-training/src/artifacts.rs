use crate::dataset::DatasetId;
use crate::error::{TrainingError, TrainingResult};
use crate::evaluator::Metrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Identifier for one training run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Model,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub sha256: String,
}

/// Summary written next to the saved model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingManifest {
    pub run_id: RunId,
    pub created_at: DateTime<Utc>,
    pub classifier: String,
    pub dataset_id: DatasetId,
    pub examples: usize,
    pub metrics: Metrics,
    pub artifacts: Vec<TrainingArtifact>,
}

impl TrainingManifest {
    pub fn write(&self, path: &Path) -> TrainingResult<()> {
        write_json(path, self)
    }

    pub fn read(path: &Path) -> TrainingResult<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

pub fn sha256_file(path: &Path) -> TrainingResult<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn make_artifact(kind: ArtifactKind, path: PathBuf) -> TrainingResult<TrainingArtifact> {
    if !path.exists() {
        return Err(TrainingError::Artifact(format!(
            "artifact path does not exist: {}",
            path.display()
        )));
    }

    let hash = sha256_file(&path)?;
    Ok(TrainingArtifact { kind, path, sha256: hash })
}

/// Pretty-print `value` as JSON into `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> TrainingResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| {
        TrainingError::Artifact(format!("failed to write {}: {e}", path.display()))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_make_artifact_requires_existing_path() {
        let temp = TempDir::new().unwrap();
        let err = make_artifact(ArtifactKind::Model, temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TrainingError::Artifact(_)));
    }

    #[test]
    fn test_make_artifact_hashes_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("model.json");
        std::fs::write(&path, "{}").unwrap();

        let artifact = make_artifact(ArtifactKind::Model, path).unwrap();
        // sha256("{}")
        assert_eq!(
            artifact.sha256,
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn test_manifest_write_then_read() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("training_manifest.json");
        let manifest = TrainingManifest {
            run_id: RunId("run-1".to_string()),
            created_at: Utc::now(),
            classifier: "embedding-softmax".to_string(),
            dataset_id: DatasetId("abc".to_string()),
            examples: 3,
            metrics: Metrics { precision: 0.5, recall: 0.25, f1_score: 0.3 },
            artifacts: vec![],
        };

        manifest.write(&path).unwrap();
        let loaded = TrainingManifest::read(&path).unwrap();
        assert_eq!(loaded.run_id, manifest.run_id);
        assert_eq!(loaded.examples, 3);
        assert_eq!(loaded.metrics, manifest.metrics);
    }
}
