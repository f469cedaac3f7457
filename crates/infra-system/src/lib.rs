// Storefront Infrastructure - System Adapters
// Implements: PasswordHasher, MediaStorage

pub mod media_storage;
pub mod password_hasher;

pub use media_storage::FsMediaStorage;
pub use password_hasher::Argon2PasswordHasher;
