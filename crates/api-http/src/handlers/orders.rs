// Order handlers: checkout, confirmation, payment

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::{CookieJar, WithRejection};
use storefront_core::domain::{DeliveryType, OrderDetails, PaymentCard, PaymentType};
use storefront_core::error::AppError;

use super::{JsonBody, PathParam};
use crate::error::ApiResult;
use crate::server::AppState;
use crate::session::{session_cookie, AuthSession};
use crate::types::{ConfirmOrderRequest, CreatedOrderDto, OrderDto};

pub async fn list(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<Vec<OrderDto>>> {
    let offset = state.config.utc_offset;
    let orders = state.checkout.list_orders(auth.user_id).await?;
    Ok(Json(
        orders
            .into_iter()
            .map(|view| OrderDto::new(view, &offset))
            .collect(),
    ))
}

/// Any request body is ignored; the order is built from the session cart
pub async fn create(
    State(state): State<AppState>,
    auth: AuthSession,
) -> ApiResult<Json<CreatedOrderDto>> {
    let order_id = state.checkout.create_order(&auth.session).await?;
    Ok(Json(CreatedOrderDto { order_id }))
}

pub async fn get(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    auth: AuthSession,
) -> ApiResult<Json<OrderDto>> {
    let view = state.checkout.order(auth.user_id, id).await?;
    Ok(Json(OrderDto::new(view, &state.config.utc_offset)))
}

pub async fn confirm(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    auth: AuthSession,
    jar: CookieJar,
    WithRejection(Json(request), _): JsonBody<ConfirmOrderRequest>,
) -> ApiResult<(CookieJar, Json<OrderDto>)> {
    let details = OrderDetails {
        delivery_type: DeliveryType::parse(&request.delivery_type).ok_or_else(|| {
            AppError::Validation(format!("Unknown delivery type: {}", request.delivery_type))
        })?,
        payment_type: PaymentType::parse(&request.payment_type).ok_or_else(|| {
            AppError::Validation(format!("Unknown payment type: {}", request.payment_type))
        })?,
        full_name: request.full_name,
        email: request.email,
        phone: request.phone,
        city: request.city,
        address: request.address,
    };

    let mut session = auth.session;
    let view = state.checkout.confirm(&mut session, id, details).await?;
    Ok((
        jar.add(session_cookie(&session, &state)),
        Json(OrderDto::new(view, &state.config.utc_offset)),
    ))
}

pub async fn pay(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    auth: AuthSession,
    WithRejection(Json(card), _): JsonBody<PaymentCard>,
) -> ApiResult<StatusCode> {
    state.checkout.pay(auth.user_id, id, card).await?;
    Ok(StatusCode::OK)
}
