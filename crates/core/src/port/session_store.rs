// Session Store Port (Interface)

use crate::domain::Session;
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session; expired rows are treated as absent
    async fn load(&self, id: &str, now_millis: i64) -> Result<Option<Session>>;

    /// Insert or replace
    async fn save(&self, session: &Session) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}
