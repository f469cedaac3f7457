// SQLite SessionStore Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::SqlitePool;
use storefront_core::domain::{Session, SessionData};
use storefront_core::error::Result;
use storefront_core::port::SessionStore;
use tracing::warn;

/// Sessions as rows; the payload is a JSON blob
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn load(&self, id: &str, now_millis: i64) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, user_id, data, expires_at FROM sessions WHERE id = ? AND expires_at > ?",
        )
        .bind(id)
        .bind(now_millis)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.and_then(SessionRow::into_session))
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let data = serde_json::to_string(&session.data)?;

        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, data, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                user_id = excluded.user_id,
                data = excluded.data,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(data)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    user_id: Option<i64>,
    data: String,
    expires_at: i64,
}

impl SessionRow {
    /// Undecodable payloads are treated as a missing session
    fn into_session(self) -> Option<Session> {
        match serde_json::from_str::<SessionData>(&self.data) {
            Ok(data) => Some(Session {
                id: self.id,
                user_id: self.user_id,
                data,
                expires_at: self.expires_at,
            }),
            Err(e) => {
                warn!(error = %e, "Discarding session with unreadable payload");
                None
            }
        }
    }
}
