// service/blob_storage.rs
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::service::error::ServiceError;

/// Where uploaded photos end up. Returns the reference persisted on the
/// listing or profile.
#[async_trait]
pub trait PhotoStorage: Send + Sync {
    async fn store(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ServiceError>;

    /// Drops a reference returned by `store`. Unknown references are a no-op.
    async fn remove(&self, reference: &str) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Keeps a short alphanumeric extension from the client's filename; the
/// rest of the name is replaced by a fresh uuid.
pub fn stored_file_name(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| ext.to_ascii_lowercase());

    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

#[async_trait]
impl PhotoStorage for LocalDiskStorage {
    async fn store(&self, original_name: Option<&str>, bytes: &[u8]) -> Result<String, ServiceError> {
        if bytes.is_empty() {
            return Err(ServiceError::Validation("Uploaded file is empty".to_string()));
        }

        tokio::fs::create_dir_all(&self.root).await?;

        let file_name = stored_file_name(original_name);
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        tracing::debug!(file = %file_name, size = bytes.len(), "photo stored");
        Ok(file_name)
    }

    async fn remove(&self, reference: &str) -> Result<(), ServiceError> {
        if reference.is_empty() || reference.contains(['/', '\\']) || reference.starts_with('.') {
            return Err(ServiceError::Validation(format!("Invalid photo reference '{}'", reference)));
        }

        match tokio::fs::remove_file(self.root.join(reference)).await {
            Ok(()) => {
                tracing::debug!(file = %reference, "photo removed");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
