//! Image storage port.
//!
//! Posts reference their image by a path string; storing and serving the
//! binary is an external collaborator.

use async_trait::async_trait;
use std::path::Path;

/// Storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<StorageError> for crate::DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType(mime) => {
                crate::DomainError::Validation(vec![format!("image: unsupported type {mime}")])
            }
            StorageError::Io(msg) => crate::DomainError::Internal(msg),
        }
    }
}

/// Store for uploaded post images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an uploaded file and return the path clients will reference.
    async fn store(&self, src: &Path, original_name: &str) -> Result<String, StorageError>;

    /// Remove a stored image. Fire-and-forget: failures are logged by the
    /// implementation, never surfaced.
    async fn remove(&self, path: &str);
}
