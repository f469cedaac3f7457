// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use storefront_core::domain::{NewOrder, OrderId, OrderLine, OrderStatus};
use storefront_core::error::Result;
use storefront_core::port::{OrderRepositoryTransaction, Transaction};

/// Order header and lines written under one SQLite transaction
pub struct SqliteOrderTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteOrderTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteOrderTransaction<'_> {
    async fn commit(mut self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepositoryTransaction for SqliteOrderTransaction<'_> {
    async fn insert_order(&mut self, order: &NewOrder) -> Result<OrderId> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (created_at, user_id, full_name, email, phone, total_cost, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.created_at)
        .bind(order.user_id)
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(order.total_cost.minor())
        .bind(OrderStatus::Created.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.last_insert_rowid())
    }

    async fn insert_line(&mut self, order_id: OrderId, line: &OrderLine) -> Result<()> {
        sqlx::query(
            "INSERT INTO order_lines (order_id, product_id, count, price) VALUES (?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(i64::from(line.count))
        .bind(line.price.minor())
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
