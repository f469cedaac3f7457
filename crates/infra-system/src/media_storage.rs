// Filesystem media storage
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use storefront_core::error::{AppError, Result};
use storefront_core::port::MediaStorage;

/// Stores files under a root directory (served at `/media/`)
pub struct FsMediaStorage {
    root: PathBuf,
}

impl FsMediaStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path, refusing anything that escapes the root
    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if relative_path.is_empty() || escapes {
            return Err(AppError::Validation(format!(
                "Invalid media path: {}",
                relative_path
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl MediaStorage for FsMediaStorage {
    async fn store(&self, relative_path: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(relative_path)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Stored media file");
        Ok(())
    }

    async fn remove(&self, relative_path: &str) -> Result<()> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
