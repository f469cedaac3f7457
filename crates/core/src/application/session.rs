// Session Service - load/start/rotate/destroy server-side sessions

use crate::domain::{Session, UserId};
use crate::error::Result;
use crate::port::{SessionStore, TimeProvider, TokenProvider};
use std::sync::Arc;
use tracing::debug;

/// Two weeks, the usual cookie-session lifetime
pub const DEFAULT_SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

pub struct SessionService {
    store: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenProvider>,
    time_provider: Arc<dyn TimeProvider>,
    ttl_millis: i64,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenProvider>,
        time_provider: Arc<dyn TimeProvider>,
        ttl_secs: i64,
    ) -> Self {
        Self {
            store,
            tokens,
            time_provider,
            ttl_millis: ttl_secs * 1000,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_millis / 1000
    }

    fn expires_at(&self) -> i64 {
        self.time_provider.now_millis() + self.ttl_millis
    }

    /// Load the session named by the cookie, or start an unsaved one.
    ///
    /// The returned flag is true when the session is new.
    pub async fn load_or_start(&self, cookie: Option<&str>) -> Result<(Session, bool)> {
        if let Some(id) = cookie {
            let now = self.time_provider.now_millis();
            if let Some(session) = self.store.load(id, now).await? {
                return Ok((session, false));
            }
            debug!("Session cookie unknown or expired, starting a new session");
        }
        Ok((self.start(), true))
    }

    /// New anonymous session (not persisted until saved)
    pub fn start(&self) -> Session {
        Session::new(self.tokens.generate_token(), self.expires_at())
    }

    /// Persist, sliding the expiry forward
    pub async fn save(&self, session: &mut Session) -> Result<()> {
        session.expires_at = self.expires_at();
        self.store.save(session).await
    }

    /// Bind the session to a user under a new id, keeping its cart
    pub async fn login(&self, session: &mut Session, user_id: UserId) -> Result<()> {
        let old_id = session.id.clone();
        session.login(user_id, self.tokens.generate_token(), self.expires_at());
        self.store.save(session).await?;
        self.store.delete(&old_id).await?;
        Ok(())
    }

    /// Drop the session and everything in it
    pub async fn logout(&self, session: &Session) -> Result<()> {
        self.store.delete(&session.id).await
    }
}
