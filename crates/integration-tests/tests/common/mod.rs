//! Shared harness: a fully wired router over a temporary database

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use storefront_api_http::{router, ApiConfig, AppState, RateLimiter, SESSION_COOKIE};
use storefront_core::application::{
    AccountService, CartService, CatalogService, CheckoutService, SessionService,
};
use storefront_core::port::time_provider::SystemTimeProvider;
use storefront_core::port::token_provider::RandomTokenProvider;
use storefront_core::port::TimeProvider;
use storefront_infra_sqlite::{
    create_pool, load_fixtures, run_migrations, SqliteAccountRepository, SqliteCatalogRepository,
    SqliteOrderRepository, SqliteSessionStore,
};
use storefront_infra_system::{Argon2PasswordHasher, FsMediaStorage};

pub const CATALOG_FIXTURE: &str = include_str!("../fixtures/catalog.json");
pub const PASSWORD: &str = "correct-horse";

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub media_root: PathBuf,
    _dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    /// Value of the `sessionid` cookie set by the response, if any
    pub session_cookie: Option<String>,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::with_signin_burst(100).await
    }

    pub async fn with_signin_burst(burst: u32) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("storefront.db");
        let media_root = dir.path().join("uploads");
        std::fs::create_dir_all(&media_root).unwrap();

        let pool = create_pool(&db_path.to_string_lossy()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        load_fixtures(&pool, CATALOG_FIXTURE).await.unwrap();

        let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
        let catalog_repo = Arc::new(SqliteCatalogRepository::new(pool.clone()));
        let account_repo = Arc::new(SqliteAccountRepository::new(pool.clone()));
        let order_repo = Arc::new(SqliteOrderRepository::new(pool.clone()));
        let sessions = Arc::new(SessionService::new(
            Arc::new(SqliteSessionStore::new(pool.clone())),
            Arc::new(RandomTokenProvider),
            time_provider.clone(),
            3600,
        ));

        let state = AppState {
            catalog: Arc::new(CatalogService::new(
                catalog_repo.clone(),
                time_provider.clone(),
            )),
            cart: Arc::new(CartService::new(catalog_repo.clone(), sessions.clone())),
            checkout: Arc::new(CheckoutService::new(
                order_repo.clone(),
                order_repo,
                account_repo.clone(),
                catalog_repo,
                sessions.clone(),
                time_provider.clone(),
            )),
            accounts: Arc::new(AccountService::new(
                account_repo,
                Arc::new(Argon2PasswordHasher::new()),
                Arc::new(FsMediaStorage::new(&media_root)),
                sessions.clone(),
                time_provider,
            )),
            sessions,
            signin_limiter: Arc::new(RateLimiter::new(burst, 1)),
            config: Arc::new(ApiConfig {
                media_root: media_root.clone(),
                ..ApiConfig::default()
            }),
        };

        Self {
            router: router(state),
            pool,
            media_root,
            _dir: dir,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(id) = cookie {
            builder = builder.header(COOKIE, format!("{SESSION_COOKIE}={id}"));
        }
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let session_cookie = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.strip_prefix(&format!("{SESSION_COOKIE}=")).map(str::to_string))
            .map(|v| v.split(';').next().unwrap_or_default().to_string())
            .next();

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            session_cookie,
            body,
        }
    }

    /// Register a user and return the authenticated session cookie
    pub async fn sign_up(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/sign-up",
                None,
                serde_json::json!({ "name": "Test User", "username": username, "password": PASSWORD }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.session_cookie.unwrap()
    }
}

pub fn ids(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_i64().unwrap())
        .collect()
}
