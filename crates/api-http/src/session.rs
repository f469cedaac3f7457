//! Session cookie extractors
//!
//! The `sessionid` cookie names a server-side session. Extraction never
//! writes: a request without a live session gets a fresh, unsaved one, and
//! handlers that persist it attach the cookie to their response.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use storefront_core::domain::{Session, UserId};
use storefront_core::error::AppError;

use crate::error::ApiError;
use crate::server::AppState;

pub const SESSION_COOKIE: &str = "sessionid";

/// Session of the current request, authenticated or not
pub struct CurrentSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let cookie = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());
        let (session, _is_new) = state.sessions.load_or_start(cookie.as_deref()).await?;
        Ok(CurrentSession(session))
    }
}

/// Session bound to a user; anonymous requests are rejected with 403
pub struct AuthSession {
    pub session: Session,
    pub user_id: UserId,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;
        match session.user_id {
            Some(user_id) => Ok(AuthSession { session, user_id }),
            None => Err(AppError::Forbidden("Authentication required".to_string()).into()),
        }
    }
}

/// Cookie pointing the client at a persisted session
pub fn session_cookie(session: &Session, state: &AppState) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(time::Duration::seconds(state.sessions.ttl_secs()))
        .build()
}

/// Removal cookie for sign-out
pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}
