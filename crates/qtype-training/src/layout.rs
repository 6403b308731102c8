use crate::error::{TrainingError, TrainingResult};
use std::path::{Path, PathBuf};

/// Filesystem layout of a model output directory.
///
/// ```text
/// <output>/model.json
/// <output>/training_manifest.json
/// ```
#[derive(Debug, Clone)]
pub struct ModelLayout {
    root: PathBuf,
}

impl ModelLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.root.join("model.json")
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("training_manifest.json")
    }

    pub fn ensure_dirs(&self) -> TrainingResult<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            TrainingError::Artifact(format!(
                "failed to create output directory {}: {e}",
                self.root.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let temp = TempDir::new().unwrap();
        let layout = ModelLayout::new(temp.path().join("model"));

        assert!(layout.model_path().ends_with("model/model.json"));
        assert!(layout.manifest_path().ends_with("model/training_manifest.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_nested_root() {
        let temp = TempDir::new().unwrap();
        let layout = ModelLayout::new(temp.path().join("a").join("b"));
        layout.ensure_dirs().unwrap();
        assert!(layout.root().is_dir());
    }

    #[test]
    fn test_ensure_dirs_fails_when_root_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        std::fs::write(&file, "x").unwrap();

        let err = ModelLayout::new(&file).ensure_dirs().unwrap_err();
        assert!(matches!(err, TrainingError::Artifact(_)));
    }
}
