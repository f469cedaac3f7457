// Port Layer - Interfaces for external dependencies

pub mod account_repository;
pub mod catalog_repository;
pub mod maintenance;
pub mod media_storage;
pub mod order_repository;
pub mod password_hasher;
pub mod session_store;
pub mod time_provider;
pub mod token_provider; // For deterministic testing
pub mod transaction;

// Re-exports
pub use account_repository::AccountRepository;
pub use catalog_repository::CatalogRepository;
pub use maintenance::{Maintenance, MaintenanceConfig, MaintenanceStats};
pub use media_storage::MediaStorage;
pub use order_repository::OrderRepository;
pub use password_hasher::PasswordHasher;
pub use session_store::SessionStore;
pub use time_provider::TimeProvider;
pub use token_provider::TokenProvider;
pub use transaction::{OrderRepositoryTransaction, Transaction, TransactionalOrderRepository};
