// Password Hasher Port (Interface)

use crate::error::Result;

/// One-way password hashing (PHC string format)
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;

    /// `Ok(false)` on mismatch; `Err` only for malformed stored hashes
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}
