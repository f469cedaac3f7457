//! HTTP server: shared state, routing and the serve loop

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use chrono::{FixedOffset, Offset, Utc};
use storefront_core::application::{
    AccountService, CartService, CatalogService, CheckoutService, SessionService,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{account, basket, catalog, orders};
use crate::rate_limiter::RateLimiter;

/// Presentation settings for the HTTP layer
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Mark the session cookie `Secure`
    pub cookie_secure: bool,
    /// Offset used to render timestamps
    pub utc_offset: FixedOffset,
    /// Directory served under `/media`
    pub media_root: PathBuf,
    /// Allowed origin for credentialed cross-origin requests
    pub cors_origin: Option<HeaderValue>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cookie_secure: false,
            utc_offset: FixedOffset::east_opt(3 * 3600).unwrap_or_else(|| Utc.fix()),
            media_root: PathBuf::from("uploads"),
            cors_origin: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub cart: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub accounts: Arc<AccountService>,
    pub sessions: Arc<SessionService>,
    pub signin_limiter: Arc<RateLimiter>,
    pub config: Arc<ApiConfig>,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(catalog::health))
        .route("/categories", get(catalog::categories))
        .route("/catalog", get(catalog::catalog))
        .route("/products/popular", get(catalog::popular))
        .route("/products/limited", get(catalog::limited))
        .route("/banners", get(catalog::banners))
        .route("/sales", get(catalog::sales))
        .route("/tags", get(catalog::tags))
        .route("/product/:id", get(catalog::product))
        .route("/product/:id/reviews", post(catalog::add_review))
        .route(
            "/basket",
            get(basket::basket)
                .post(basket::add)
                .delete(basket::remove)
                .patch(basket::set_quantity),
        )
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/:id", get(orders::get).post(orders::confirm))
        .route("/payment/:id", post(orders::pay))
        .route("/sign-in", post(account::sign_in))
        .route("/sign-up", post(account::sign_up))
        .route("/sign-out", post(account::sign_out))
        .route(
            "/profile",
            get(account::profile).post(account::update_profile),
        )
        .route("/profile/password", post(account::change_password))
        .route("/profile/avatar", post(account::update_avatar));

    let mut app = Router::new()
        .nest("/api", api)
        .nest_service("/media", ServeDir::new(&state.config.media_root))
        .layer(TraceLayer::new_for_http());

    if let Some(origin) = state.config.cors_origin.clone() {
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(60 * 60));
        app = app.layer(cors);
    }

    app.with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
