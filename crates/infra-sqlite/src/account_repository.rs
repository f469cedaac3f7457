// SQLite AccountRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use storefront_core::domain::{Profile, ProfileUpdate, User, UserId};
use storefront_core::error::{AppError, Result};
use storefront_core::port::AccountRepository;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        created_at: i64,
    ) -> Result<UserId> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match map_sqlx_error(e) {
            AppError::Conflict(_) => AppError::Conflict("User already exists".to_string()),
            other => other,
        })?;
        let user_id = result.last_insert_rowid();

        sqlx::query("INSERT INTO profiles (user_id, full_name) VALUES (?, ?)")
            .bind(user_id)
            .bind(full_name)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(user_id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(UserRow::into_user))
    }

    async fn update_password(&self, id: UserId, password_hash: &str) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {}", id)));
        }
        Ok(())
    }

    async fn profile(&self, user_id: UserId) -> Result<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT u.id AS user_id, u.username, p.full_name, p.email, p.phone, p.avatar_path
            FROM users u
            JOIN profiles p ON p.user_id = u.id
            WHERE u.id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ProfileRow::into_profile))
    }

    async fn update_profile(&self, user_id: UserId, update: &ProfileUpdate) -> Result<()> {
        let result = sqlx::query(
            "UPDATE profiles SET full_name = ?, email = ?, phone = ? WHERE user_id = ?",
        )
        .bind(update.full_name.trim())
        .bind(update.email.trim())
        .bind(update.phone.trim())
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile for user {}", user_id)));
        }
        Ok(())
    }

    async fn set_avatar(&self, user_id: UserId, path: &str) -> Result<Option<String>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT avatar_path FROM profiles WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        let previous = previous
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", user_id)))?;

        sqlx::query("UPDATE profiles SET avatar_path = ? WHERE user_id = ?")
            .bind(path)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(previous)
    }
}

// Database row representations
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: i64,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    username: String,
    full_name: String,
    email: String,
    phone: String,
    avatar_path: Option<String>,
}

impl ProfileRow {
    fn into_profile(self) -> Profile {
        Profile {
            user_id: self.user_id,
            username: self.username,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            avatar_path: self.avatar_path,
        }
    }
}
