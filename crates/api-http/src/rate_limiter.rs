//! Rate Limiter (Token Bucket Algorithm)
//!
//! Throttles credential checks on sign-in.
//! Uses atomic operations to avoid lock contention under high load.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Rate limiter using token bucket algorithm with atomic operations
pub struct RateLimiter {
    state: Arc<AtomicState>,
    max_tokens: u32,
    refill_rate: u32, // tokens per second
}

struct AtomicState {
    // Upper 32 bits: tokens
    // Lower 32 bits: last_refill timestamp (milliseconds since creation)
    packed: AtomicU64,
    creation_time: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `max_tokens` - Maximum burst size
    /// * `refill_rate` - Tokens added per second
    ///
    /// # Example
    /// Allow 5 attempts/sec with burst of 20:
    /// `RateLimiter::new(20, 5)`
    pub fn new(max_tokens: u32, refill_rate: u32) -> Self {
        let tokens_fixed = (max_tokens as u64) << 32;
        Self {
            state: Arc::new(AtomicState {
                packed: AtomicU64::new(tokens_fixed),
                creation_time: Instant::now(),
            }),
            max_tokens,
            refill_rate,
        }
    }

    /// Check if request is allowed (consumes 1 token)
    ///
    /// Returns true if allowed, false if rate limited
    pub fn check(&self) -> bool {
        loop {
            let packed = self.state.packed.load(Ordering::Acquire);
            let tokens = (packed >> 32) as u32;
            let last_refill_ms = (packed & 0xFFFFFFFF) as u32;

            // Millisecond clock is 32 bits wide and wraps after ~49.7 days
            let elapsed_ms = Instant::now()
                .duration_since(self.state.creation_time)
                .as_millis() as u32;
            let delta_ms = elapsed_ms.wrapping_sub(last_refill_ms);

            let tokens_to_add = (delta_ms as u64 * self.refill_rate as u64) / 1000;
            let new_tokens = ((tokens as u64 + tokens_to_add).min(self.max_tokens as u64)) as u32;

            // Advance only by the time spent on whole tokens so the remainder carries over.
            // A full bucket has nothing to carry.
            let refill_ms = if new_tokens >= self.max_tokens {
                elapsed_ms
            } else if tokens_to_add > 0 {
                let spent_ms = tokens_to_add * 1000 / self.refill_rate as u64;
                last_refill_ms.wrapping_add(spent_ms as u32)
            } else {
                last_refill_ms
            };

            if new_tokens >= 1 {
                let new_packed = (((new_tokens - 1) as u64) << 32) | (refill_ms as u64);

                match self.state.packed.compare_exchange(
                    packed,
                    new_packed,
                    Ordering::Release,
                    Ordering::Acquire,
                ) {
                    Ok(_) => return true,
                    Err(_) => continue, // Retry
                }
            } else {
                return false;
            }
        }
    }

    /// Tokens currently left in the bucket
    pub fn remaining(&self) -> u32 {
        (self.state.packed.load(Ordering::Acquire) >> 32) as u32
    }
}
