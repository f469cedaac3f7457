// Account handlers: sign-in/up/out and the profile

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::{CookieJar, WithRejection};
use storefront_core::domain::ProfileUpdate;
use storefront_core::error::AppError;
use tracing::warn;

use super::JsonBody;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use crate::session::{expired_session_cookie, session_cookie, AuthSession, CurrentSession};
use crate::types::{PasswordRequest, ProfileDto, ProfileRequest, SignInRequest, SignUpRequest};

const AVATAR_FIELD: &str = "avatar";

pub async fn sign_in(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<SignInRequest>,
) -> ApiResult<(CookieJar, StatusCode)> {
    if !state.signin_limiter.check() {
        warn!(
            remaining = state.signin_limiter.remaining(),
            "Sign-in throttled"
        );
        return Err(ApiError::TooManyRequests);
    }

    state
        .accounts
        .sign_in(&mut session, &request.username, &request.password)
        .await?;
    Ok((jar.add(session_cookie(&session, &state)), StatusCode::OK))
}

/// Duplicate usernames are a 400 for the storefront client
pub async fn sign_up(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<SignUpRequest>,
) -> ApiResult<(StatusCode, CookieJar)> {
    state
        .accounts
        .sign_up(&mut session, &request.name, &request.username, &request.password)
        .await
        .map_err(|e| match e {
            AppError::Conflict(msg) => ApiError::BadRequest(msg),
            other => ApiError::App(other),
        })?;
    Ok((StatusCode::CREATED, jar.add(session_cookie(&session, &state))))
}

pub async fn sign_out(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
    jar: CookieJar,
) -> ApiResult<(CookieJar, StatusCode)> {
    state.accounts.sign_out(&session).await?;
    Ok((jar.remove(expired_session_cookie()), StatusCode::OK))
}

pub async fn profile(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<ProfileDto>> {
    let profile = state.accounts.profile(auth.user_id).await?;
    Ok(Json(profile.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthSession,
    WithRejection(Json(request), _): JsonBody<ProfileRequest>,
) -> ApiResult<Json<ProfileDto>> {
    let profile = state
        .accounts
        .update_profile(
            auth.user_id,
            ProfileUpdate {
                full_name: request.full_name,
                email: request.email,
                phone: request.phone,
            },
        )
        .await?;
    Ok(Json(profile.into()))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthSession,
    WithRejection(Json(request), _): JsonBody<PasswordRequest>,
) -> ApiResult<StatusCode> {
    state
        .accounts
        .change_password(auth.user_id, &request.current_password, &request.new_password)
        .await?;
    Ok(StatusCode::OK)
}

pub async fn update_avatar(
    State(state): State<AppState>,
    auth: AuthSession,
    mut multipart: Multipart,
) -> ApiResult<Json<ProfileDto>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(AVATAR_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let profile = state
            .accounts
            .update_avatar(auth.user_id, &filename, &bytes)
            .await?;
        return Ok(Json(profile.into()));
    }

    Err(ApiError::BadRequest("Missing avatar file".to_string()))
}
