// Transaction port for atomic operations

use crate::domain::{NewOrder, OrderId, OrderLine};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional OrderRepository operations
#[async_trait]
pub trait TransactionalOrderRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn OrderRepositoryTransaction>>;
}

/// OrderRepository operations within a transaction
#[async_trait]
pub trait OrderRepositoryTransaction: Transaction {
    /// Insert the order header (within transaction)
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId>;

    /// Insert one line (within transaction)
    async fn insert_line(&mut self, order_id: OrderId, line: &OrderLine) -> Result<()>;
}
