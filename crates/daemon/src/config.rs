//! Startup configuration read from `STOREFRONT_*` environment variables

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use chrono::FixedOffset;
use tracing::info;

const DEFAULT_DB_PATH: &str = "~/.storefront/storefront.db";
const DEFAULT_MEDIA_ROOT: &str = "~/.storefront/uploads";
const TWO_WEEKS_SECS: &str = "1209600";

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub media_root: PathBuf,
    pub fixtures: Option<PathBuf>,
    pub session_ttl_secs: i64,
    pub cookie_secure: bool,
    pub utc_offset: FixedOffset,
    pub signin_burst: u32,
    pub signin_rate: u32,
    pub maintenance_interval_hours: u64,
    pub cors_origin: Option<HeaderValue>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let offset_hours: i32 = try_load("STOREFRONT_UTC_OFFSET_HOURS", "3")?;
        let utc_offset = FixedOffset::east_opt(offset_hours * 3600)
            .ok_or_else(|| anyhow!("STOREFRONT_UTC_OFFSET_HOURS out of range: {offset_hours}"))?;

        let cors_origin = match optional("STOREFRONT_CORS_ORIGIN") {
            Some(origin) => Some(
                HeaderValue::from_str(&origin)
                    .with_context(|| format!("Invalid STOREFRONT_CORS_ORIGIN: {origin}"))?,
            ),
            None => None,
        };

        Ok(Self {
            db_path: expand_path("STOREFRONT_DB_PATH", DEFAULT_DB_PATH),
            host: try_load("STOREFRONT_HOST", "127.0.0.1")?,
            port: try_load("STOREFRONT_PORT", "8000")?,
            media_root: expand_path("STOREFRONT_MEDIA_ROOT", DEFAULT_MEDIA_ROOT),
            fixtures: optional("STOREFRONT_FIXTURES")
                .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned())),
            session_ttl_secs: try_load("STOREFRONT_SESSION_TTL_SECS", TWO_WEEKS_SECS)?,
            cookie_secure: try_load("STOREFRONT_COOKIE_SECURE", "false")?,
            utc_offset,
            signin_burst: try_load("STOREFRONT_SIGNIN_BURST", "20")?,
            signin_rate: try_load("STOREFRONT_SIGNIN_RATE", "5")?,
            maintenance_interval_hours: try_load("STOREFRONT_MAINTENANCE_INTERVAL_HOURS", "6")?,
            cors_origin,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.trim()
        .parse()
        .map_err(|e| anyhow!("Invalid {key} value {raw:?}: {e}"))
}

fn expand_path(key: &str, default: &str) -> PathBuf {
    let raw = optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}
