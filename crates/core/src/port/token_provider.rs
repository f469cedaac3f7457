// Token Provider Port (session ids)

use rand::distributions::Alphanumeric;
use rand::Rng;

pub const SESSION_TOKEN_LEN: usize = 40;

/// Source of unguessable session tokens (swappable for deterministic tests)
pub trait TokenProvider: Send + Sync {
    fn generate_token(&self) -> String;
}

/// Thread-local CSPRNG tokens (production)
pub struct RandomTokenProvider;

impl TokenProvider for RandomTokenProvider {
    fn generate_token(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_TOKEN_LEN)
            .map(char::from)
            .collect()
    }
}
