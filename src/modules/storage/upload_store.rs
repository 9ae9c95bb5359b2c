use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::shared::constants::UPLOADS_URL_PREFIX;

/// Local filesystem store for uploaded images
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create the store, making sure the upload directory exists
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        fs::create_dir_all(&config.upload_dir).await.map_err(|e| {
            AppError::Internal(format!(
                "Failed to create upload directory {}: {}",
                config.upload_dir.display(),
                e
            ))
        })?;

        info!("Upload store ready at {}", config.upload_dir.display());

        Ok(Self {
            root: config.upload_dir.clone(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a file, replacing any previous upload with the same name
    pub async fn save(&self, name: &str, data: &[u8]) -> Result<()> {
        let path = self.root.join(name);
        fs::write(&path, data).await.map_err(|e| {
            tracing::error!("Failed to write {}: {}", path.display(), e);
            AppError::Internal(format!("Failed to store uploaded file: {}", e))
        })?;

        debug!("Stored upload {} ({} bytes)", name, data.len());
        Ok(())
    }

    /// Delete a stored file. A missing file is not an error: abort paths
    /// call this without knowing whether the write ever happened.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let path = self.root.join(name);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                tracing::error!("Failed to delete {}: {}", path.display(), e);
                Err(AppError::Internal(format!(
                    "Failed to delete stored file: {}",
                    e
                )))
            }
        }
    }

    pub async fn exists(&self, name: &str) -> bool {
        fs::try_exists(self.root.join(name)).await.unwrap_or(false)
    }

    /// Public URL a stored name is served under
    pub fn public_url(name: &str) -> String {
        format!("{}/{}", UPLOADS_URL_PREFIX, name)
    }
}

// ==================== upload store tests ====================
