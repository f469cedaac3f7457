// Media Storage Port (Interface)

use crate::error::Result;
use async_trait::async_trait;

/// File storage addressed by paths relative to the media root
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn store(&self, relative_path: &str, bytes: &[u8]) -> Result<()>;

    /// Removing a missing file is not an error
    async fn remove(&self, relative_path: &str) -> Result<()>;
}
