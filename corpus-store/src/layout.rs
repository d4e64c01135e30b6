use std::path::{Path, PathBuf};

use crate::StoreError;

/// Directory layout rooted at the configured data directory.
///
/// Inputs and the append-only stores live under `raw/`; derived
/// artifacts such as the cleaned corpus go to `processed/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn processed_dir(&self) -> PathBuf {
        self.root.join("processed")
    }

    pub fn raw_file(&self, name: &str) -> PathBuf {
        self.raw_dir().join(name)
    }

    pub fn processed_file(&self, name: &str) -> PathBuf {
        self.processed_dir().join(name)
    }

    /// Create `raw/` and `processed/` if they do not exist yet.
    pub fn ensure(&self) -> Result<(), StoreError> {
        for dir in [self.raw_dir(), self.processed_dir()] {
            std::fs::create_dir_all(&dir)
                .map_err(|source| StoreError::CreateDir { path: dir.clone(), source })?;
        }
        Ok(())
    }
}
