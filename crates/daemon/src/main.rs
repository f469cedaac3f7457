//! Storefront - Main Entry Point
//! Wires SQLite adapters into the application services and serves the HTTP API

mod config;

use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use storefront_api_http::{ApiConfig, AppState, RateLimiter};
use storefront_core::application::{
    shutdown_channel, AccountService, CartService, CatalogService, CheckoutService,
    MaintenanceScheduler, SessionService,
};
use storefront_core::port::time_provider::SystemTimeProvider;
use storefront_core::port::token_provider::RandomTokenProvider;
use storefront_core::port::{MaintenanceConfig, TimeProvider};
use storefront_infra_sqlite::{
    create_pool, load_fixtures, run_migrations, SqliteAccountRepository, SqliteCatalogRepository,
    SqliteMaintenance, SqliteOrderRepository, SqliteSessionStore,
};
use storefront_infra_system::{Argon2PasswordHasher, FsMediaStorage};

use config::Config;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_LOG_FILTER: &str = "storefront=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Logging (guard flushes the file writer on exit)
    let _log_guard = init_logging();

    info!("Storefront v{} starting...", VERSION);

    // 2. Configuration
    let config = Config::load()?;

    if let Some(parent) = config.db_path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("Cannot create {}", config.media_root.display()))?;

    // 3. Database
    info!(db_path = %config.db_path.display(), "Initializing database...");
    let pool = create_pool(&config.db_path.to_string_lossy())
        .await
        .map_err(|e| anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow!("Migration failed: {}", e))?;

    if let Some(path) = &config.fixtures {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Cannot read fixtures {}", path.display()))?;
        let summary = load_fixtures(&pool, &json).await?;
        info!(
            categories = summary.categories,
            products = summary.products,
            sales = summary.sales,
            reviews = summary.reviews,
            "Fixtures loaded"
        );
    }

    // 4. DI wiring
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let catalog_repo = Arc::new(SqliteCatalogRepository::new(pool.clone()));
    let account_repo = Arc::new(SqliteAccountRepository::new(pool.clone()));
    let order_repo = Arc::new(SqliteOrderRepository::new(pool.clone()));

    let sessions = Arc::new(SessionService::new(
        Arc::new(SqliteSessionStore::new(pool.clone())),
        Arc::new(RandomTokenProvider),
        time_provider.clone(),
        config.session_ttl_secs,
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
            Arc::new(FsMediaStorage::new(&config.media_root)),
            sessions.clone(),
            time_provider.clone(),
        )),
        sessions,
        signin_limiter: Arc::new(RateLimiter::new(config.signin_burst, config.signin_rate)),
        config: Arc::new(ApiConfig {
            cookie_secure: config.cookie_secure,
            utc_offset: config.utc_offset,
            media_root: config.media_root.clone(),
            cors_origin: config.cors_origin.clone(),
        }),
    };

    // 5. Maintenance scheduler
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let maintenance_scheduler = MaintenanceScheduler::new(
        Arc::new(SqliteMaintenance::new(pool.clone())),
        time_provider,
        MaintenanceConfig::default(),
        config.maintenance_interval_hours,
    );
    let maintenance_handle = tokio::spawn(maintenance_scheduler.run(shutdown_rx));

    // 6. HTTP server
    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Cannot bind {address}"))?;

    info!("System ready. Press Ctrl+C to shutdown");
    storefront_api_http::serve(listener, state, shutdown_signal()).await?;

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), maintenance_handle).await;
    pool.close().await;

    info!("Shutdown complete.");
    Ok(())
}

/// JSON or pretty console output, plus an optional daily log file
fn init_logging() -> Option<WorkerGuard> {
    let log_format =
        std::env::var("STOREFRONT_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, guard) = match std::env::var("STOREFRONT_LOG_DIR") {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(
                shellexpand::tilde(&dir).into_owned(),
                "storefront.log",
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    match log_format.as_str() {
        "json" => registry.with(fmt::layer().json()).init(),
        _ => registry.with(fmt::layer().pretty()).init(),
    }

    guard
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
