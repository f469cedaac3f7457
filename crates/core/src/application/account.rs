// Account Service - registration, authentication and profile management

use crate::domain::account::{
    sanitize_avatar_filename, validate_password, validate_username,
};
use crate::domain::{Profile, ProfileUpdate, Session, UserId};
use crate::error::{AppError, Result};
use crate::port::{AccountRepository, MediaStorage, PasswordHasher, TimeProvider};
use std::sync::Arc;
use tracing::{info, warn};

use super::session::SessionService;

pub struct AccountService {
    accounts: Arc<dyn AccountRepository>,
    hasher: Arc<dyn PasswordHasher>,
    media: Arc<dyn MediaStorage>,
    sessions: Arc<SessionService>,
    time_provider: Arc<dyn TimeProvider>,
}

impl AccountService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        hasher: Arc<dyn PasswordHasher>,
        media: Arc<dyn MediaStorage>,
        sessions: Arc<SessionService>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            accounts,
            hasher,
            media,
            sessions,
            time_provider,
        }
    }

    /// Register and log the session in
    pub async fn sign_up(
        &self,
        session: &mut Session,
        name: &str,
        username: &str,
        password: &str,
    ) -> Result<UserId> {
        validate_username(username)?;
        validate_password(password)?;

        if self.accounts.find_by_username(username).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let hash = self.hash_password(password).await?;
        let user_id = self
            .accounts
            .create_user(username, &hash, name.trim(), self.time_provider.now_millis())
            .await?;

        self.sessions.login(session, user_id).await?;

        info!(user_id, "User registered");
        Ok(user_id)
    }

    pub async fn sign_in(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<UserId> {
        let invalid = || AppError::Unauthorized("Invalid credentials".to_string());

        let user = self
            .accounts
            .find_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        if !self.verify_password(password, &user.password_hash).await? {
            warn!(user_id = user.id, "Failed sign-in attempt");
            return Err(invalid());
        }

        self.sessions.login(session, user.id).await?;

        info!(user_id = user.id, "User signed in");
        Ok(user.id)
    }

    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        self.sessions.logout(session).await?;
        if let Some(user_id) = session.user_id {
            info!(user_id, "User signed out");
        }
        Ok(())
    }

    pub async fn profile(&self, user_id: UserId) -> Result<Profile> {
        self.accounts
            .profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", user_id)))
    }

    pub async fn update_profile(&self, user_id: UserId, update: ProfileUpdate) -> Result<Profile> {
        update.validate()?;
        self.accounts.update_profile(user_id, &update).await?;
        self.profile(user_id).await
    }

    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new_password: &str,
    ) -> Result<()> {
        let user = self
            .accounts
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))?;

        if !self.verify_password(current, &user.password_hash).await? {
            return Err(AppError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        validate_password(new_password)?;

        let hash = self.hash_password(new_password).await?;
        self.accounts.update_password(user_id, &hash).await?;

        info!(user_id, "Password changed");
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        run_blocking(move || hasher.hash(&password)).await
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        let password = password.to_string();
        let hash = hash.to_string();
        run_blocking(move || hasher.verify(&password, &hash)).await
    }

    /// Store a new avatar image and drop the previous file
    pub async fn update_avatar(
        &self,
        user_id: UserId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<Profile> {
        let safe_name = sanitize_avatar_filename(filename)?;
        if bytes.is_empty() {
            return Err(AppError::Validation("Avatar file is empty".to_string()));
        }

        let relative_path = format!("avatars/avatar_user_id_{}/{}", user_id, safe_name);
        self.media.store(&relative_path, bytes).await?;

        let previous = self.accounts.set_avatar(user_id, &relative_path).await?;
        if let Some(old) = previous.filter(|old| *old != relative_path) {
            if let Err(e) = self.media.remove(&old).await {
                warn!(path = %old, error = %e, "Failed to remove previous avatar");
            }
        }

        info!(user_id, path = %relative_path, "Avatar updated");
        self.profile(user_id).await
    }
}

/// Run CPU-bound work (password hashing) on the blocking pool
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[tokio::test]
    async fn test_run_blocking_leaves_runtime_thread() {
        let caller = thread::current().id();
        let worker = run_blocking(|| Ok(thread::current().id())).await.unwrap();
        assert_ne!(worker, caller);
    }

    #[tokio::test]
    async fn test_run_blocking_passes_errors_through() {
        let result: Result<()> =
            run_blocking(|| Err(AppError::Validation("bad hash".to_string()))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_run_blocking_maps_panic_to_internal() {
        let result: Result<()> = run_blocking(|| panic!("hasher crashed")).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
