// Basket handlers: the session cart

use axum::extract::State;
use axum::Json;
use axum_extra::extract::{CookieJar, WithRejection};
use storefront_core::domain::Session;

use super::JsonBody;
use crate::error::ApiResult;
use crate::server::AppState;
use crate::session::{session_cookie, CurrentSession};
use crate::types::{basket_dto, BasketRequest, ProductDto};

pub async fn basket(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<ProductDto>>> {
    let items = state.cart.basket(&session).await?;
    Ok(Json(basket_dto(items, &state.config.utc_offset)))
}

pub async fn add(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<BasketRequest>,
) -> ApiResult<(CookieJar, Json<Vec<ProductDto>>)> {
    state.cart.add(&mut session, request.id, request.count).await?;
    updated_basket(&state, &session, jar).await
}

pub async fn remove(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<BasketRequest>,
) -> ApiResult<(CookieJar, Json<Vec<ProductDto>>)> {
    state
        .cart
        .remove(&mut session, request.id, request.count)
        .await?;
    updated_basket(&state, &session, jar).await
}

pub async fn set_quantity(
    State(state): State<AppState>,
    CurrentSession(mut session): CurrentSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<BasketRequest>,
) -> ApiResult<(CookieJar, Json<Vec<ProductDto>>)> {
    state
        .cart
        .set_quantity(&mut session, request.id, request.count)
        .await?;
    updated_basket(&state, &session, jar).await
}

async fn updated_basket(
    state: &AppState,
    session: &Session,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Json<Vec<ProductDto>>)> {
    let items = state.cart.basket(session).await?;
    Ok((
        jar.add(session_cookie(session, state)),
        Json(basket_dto(items, &state.config.utc_offset)),
    ))
}
