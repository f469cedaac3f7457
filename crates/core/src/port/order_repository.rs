// Order Repository Port (Interface)

use crate::domain::{Order, OrderId, OrderStatus, UserId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Find order by ID (lines included)
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// A user's orders, newest first
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    /// Persist mutable order fields.
    ///
    /// Conditional on the stored status still being `expected`; a concurrent
    /// transition yields `AppError::InvalidState`.
    async fn update(&self, order: &Order, expected: OrderStatus) -> Result<()>;
}
