//! UUID-addressed storage for enrollment and probe captures.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// Directory of captured images. Files are never rewritten or deleted here.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Use `root` as the photo directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::ImageDir {
                path: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` under a fresh `<uuid>.jpg` name and return the stored path.
    pub async fn save(&self, bytes: &[u8]) -> StoreResult<String> {
        let path = self.root.join(format!("{}.jpg", Uuid::new_v4().simple()));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StoreError::ImageWrite {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "image stored");
        Ok(path.to_string_lossy().into_owned())
    }
}
