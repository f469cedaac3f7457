// Storefront Infrastructure - SQLite Adapter
// Implements: CatalogRepository, OrderRepository (+ transactional inserts),
// AccountRepository, SessionStore, Maintenance

mod account_repository;
mod catalog_repository;
mod connection;
mod error;
mod fixtures;
mod maintenance_impl;
mod migration;
mod order_repository;
mod session_store;
mod transaction;

pub use account_repository::SqliteAccountRepository;
pub use catalog_repository::SqliteCatalogRepository;
pub use connection::create_pool;
pub use fixtures::{load_fixtures, FixtureSummary};
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use order_repository::SqliteOrderRepository;
pub use session_store::SqliteSessionStore;
pub use transaction::SqliteOrderTransaction;

// Note: sqlx::Error conversion goes through error::map_sqlx_error
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
