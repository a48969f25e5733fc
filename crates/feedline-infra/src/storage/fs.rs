//! Filesystem image store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use feedline_core::ports::{ImageStore, StorageError};

/// Stores uploaded images under a single directory with generated names.
///
/// The returned path (`<dir>/<uuid>-<name>`) is what gets persisted on the
/// post; serving the bytes back is someone else's job.
pub struct FsImageStore {
    dir: PathBuf,
}

impl FsImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    /// Strip any path components a client may have smuggled into the name.
    fn sanitize(original_name: &str) -> String {
        let base = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image");
        base.replace(' ', "_")
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn store(&self, src: &Path, original_name: &str) -> Result<String, StorageError> {
        let name = format!("{}-{}", Uuid::new_v4(), Self::sanitize(original_name));
        let dest = self.dir.join(&name);

        tokio::fs::copy(src, &dest)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(dest.to_string_lossy().into_owned())
    }

    async fn remove(&self, path: &str) {
        // Fire-and-forget: a leaked file is not worth failing the request.
        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(image = %path, error = %e, "failed to remove stored image");
        }
    }
}
