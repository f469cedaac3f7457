// SQLite OrderRepository Implementation

use crate::error::map_sqlx_error;
use crate::SqliteOrderTransaction;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use storefront_core::domain::{
    DeliveryType, Money, Order, OrderId, OrderLine, OrderStatus, PaymentType, UserId,
};
use storefront_core::error::{AppError, Result};
use storefront_core::port::{
    OrderRepository, OrderRepositoryTransaction, TransactionalOrderRepository,
};

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn lines_for(&self, ids: &[OrderId]) -> Result<HashMap<OrderId, Vec<OrderLine>>> {
        let mut lines: HashMap<OrderId, Vec<OrderLine>> = HashMap::new();
        if ids.is_empty() {
            return Ok(lines);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT order_id, product_id, count, price FROM order_lines WHERE order_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(") ORDER BY order_id, product_id");

        let rows: Vec<(i64, i64, i64, i64)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        for (order_id, product_id, count, price) in rows {
            lines.entry(order_id).or_default().push(OrderLine {
                product_id,
                count: u32::try_from(count).map_err(|_| {
                    AppError::Database(format!("Invalid line count {} in order {}", count, order_id))
                })?,
                price: Money::from_minor(price),
            });
        }
        Ok(lines)
    }
}

const ORDER_COLUMNS: &str = "id, created_at, user_id, full_name, email, phone, delivery_type, \
                             payment_type, total_cost, status, city, address";

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = ?",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => {
                let mut lines = self.lines_for(&[row.id]).await?;
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(order_lines)?))
            }
            None => Ok(None),
        }
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut lines = self.lines_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_lines = lines.remove(&row.id).unwrap_or_default();
                row.into_order(order_lines)
            })
            .collect()
    }

    async fn update(&self, order: &Order, expected: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET full_name = ?, email = ?, phone = ?, delivery_type = ?, payment_type = ?,
                total_cost = ?, status = ?, city = ?, address = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(&order.full_name)
        .bind(&order.email)
        .bind(&order.phone)
        .bind(order.delivery_type.as_ref().map(|d| d.as_str()))
        .bind(order.payment_type.as_ref().map(|p| p.as_str()))
        .bind(order.total_cost.minor())
        .bind(order.status.as_str())
        .bind(&order.city)
        .bind(&order.address)
        .bind(order.id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            let current: Option<String> =
                sqlx::query_scalar("SELECT status FROM orders WHERE id = ?")
                    .bind(order.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(map_sqlx_error)?;

            return match current {
                None => Err(AppError::NotFound(format!("Order {} not found", order.id))),
                Some(status) => Err(AppError::InvalidState(format!(
                    "Order {} is {}, expected {}",
                    order.id, status, expected
                ))),
            };
        }

        Ok(())
    }
}

#[async_trait]
impl TransactionalOrderRepository for SqliteOrderRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn OrderRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteOrderTransaction::new(tx)))
    }
}

// Database row representation
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    created_at: i64,
    user_id: i64,
    full_name: String,
    email: String,
    phone: String,
    delivery_type: Option<String>,
    payment_type: Option<String>,
    total_cost: i64,
    status: String,
    city: Option<String>,
    address: Option<String>,
}

impl OrderRow {
    fn into_order(self, lines: Vec<OrderLine>) -> Result<Order> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            AppError::Database(format!("Unknown order status '{}'", self.status))
        })?;
        let delivery_type = match self.delivery_type.as_deref() {
            Some(raw) => Some(DeliveryType::parse(raw).ok_or_else(|| {
                AppError::Database(format!("Unknown delivery type '{}'", raw))
            })?),
            None => None,
        };
        let payment_type = match self.payment_type.as_deref() {
            Some(raw) => Some(PaymentType::parse(raw).ok_or_else(|| {
                AppError::Database(format!("Unknown payment type '{}'", raw))
            })?),
            None => None,
        };

        Ok(Order {
            id: self.id,
            created_at: self.created_at,
            user_id: self.user_id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            delivery_type,
            payment_type,
            total_cost: Money::from_minor(self.total_cost),
            status,
            city: self.city,
            address: self.address,
            lines,
        })
    }
}
