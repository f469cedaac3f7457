//! HTTP API Layer
//!
//! JSON endpoints consumed by the storefront single-page client, mounted
//! under `/api`, plus static media under `/media`.

pub mod error;
pub mod handlers;
pub mod rate_limiter;
pub mod server;
pub mod session;
pub mod types;

pub use error::ApiError;
pub use rate_limiter::RateLimiter;
pub use server::{router, serve, ApiConfig, AppState};
pub use session::SESSION_COOKIE;
