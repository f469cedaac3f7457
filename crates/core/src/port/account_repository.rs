// Account Repository Port (Interface)

use crate::domain::{Profile, ProfileUpdate, User, UserId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Create user and profile together; duplicate username -> `AppError::Conflict`
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        created_at: i64,
    ) -> Result<UserId>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()>;

    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>>;

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> Result<()>;

    /// Point the profile at a new avatar file, returning the previous path
    async fn set_avatar(&self, user_id: UserId, path: &str) -> Result<Option<String>>;
}
