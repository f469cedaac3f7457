// Checkout Service - order placement, confirmation and payment

use crate::domain::{
    NewOrder, Order, OrderDetails, OrderId, OrderLine, OrderStatus, PaymentCard, Product, Session,
    UserId,
};
use crate::error::{AppError, Result};
use crate::port::{
    AccountRepository, CatalogRepository, OrderRepository, TimeProvider, Transaction,
    TransactionalOrderRepository,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use super::session::SessionService;

/// Order with the catalog rows of its lines
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub products: Vec<(Product, OrderLine)>,
}

pub struct CheckoutService {
    tx_orders: Arc<dyn TransactionalOrderRepository>,
    orders: Arc<dyn OrderRepository>,
    accounts: Arc<dyn AccountRepository>,
    catalog: Arc<dyn CatalogRepository>,
    sessions: Arc<SessionService>,
    time_provider: Arc<dyn TimeProvider>,
}

impl CheckoutService {
    pub fn new(
        tx_orders: Arc<dyn TransactionalOrderRepository>,
        orders: Arc<dyn OrderRepository>,
        accounts: Arc<dyn AccountRepository>,
        catalog: Arc<dyn CatalogRepository>,
        sessions: Arc<SessionService>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            tx_orders,
            orders,
            accounts,
            catalog,
            sessions,
            time_provider,
        }
    }

    /// Turn the session cart into a `Created` order
    pub async fn create_order(&self, session: &Session) -> Result<OrderId> {
        let user_id = require_user(session)?;
        let cart = &session.data.cart;
        if cart.is_empty() {
            return Err(AppError::Validation("Basket is empty".to_string()));
        }

        let known: Vec<_> = self
            .catalog
            .find_products(&cart.product_ids())
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        let lines: Vec<OrderLine> = cart
            .lines()
            .filter(|(id, _)| known.contains(id))
            .map(|(product_id, line)| OrderLine {
                product_id,
                count: line.quantity,
                price: line.price,
            })
            .collect();
        if lines.is_empty() {
            return Err(AppError::Validation(
                "Basket products are no longer available".to_string(),
            ));
        }

        let profile = self
            .accounts
            .profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile for user {}", user_id)))?;

        let total_cost = lines.iter().try_fold(crate::domain::Money::ZERO, |acc, l| {
            acc.checked_add(l.price.checked_mul(l.count)?)
        })?;

        let new_order = NewOrder {
            created_at: self.time_provider.now_millis(),
            user_id,
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            total_cost,
        };

        // Header and lines land together or not at all
        let mut tx = self.tx_orders.begin_transaction().await?;
        let order_id = tx.insert_order(&new_order).await?;
        for line in &lines {
            tx.insert_line(order_id, line).await?;
        }
        tx.commit().await?;

        info!(order_id, user_id, total_cost = %total_cost, "Order created");
        Ok(order_id)
    }

    pub async fn list_orders(&self, user_id: UserId) -> Result<Vec<OrderView>> {
        let orders = self.orders.list_for_user(user_id).await?;
        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            views.push(self.view(order).await?);
        }
        Ok(views)
    }

    pub async fn order(&self, user_id: UserId, id: OrderId) -> Result<OrderView> {
        let order = self.owned_order(user_id, id).await?;
        self.view(order).await
    }

    /// Created -> Accepted; empties the session cart on success
    pub async fn confirm(
        &self,
        session: &mut Session,
        id: OrderId,
        details: OrderDetails,
    ) -> Result<OrderView> {
        let user_id = require_user(session)?;
        validate_details(&details)?;

        let mut order = self.owned_order(user_id, id).await?;
        order.confirm(details)?;
        self.orders.update(&order, OrderStatus::Created).await?;

        session.data.cart.clear();
        self.sessions.save(session).await?;

        info!(
            order_id = id,
            user_id,
            total_cost = %order.total_cost,
            "Order confirmed"
        );
        self.view(order).await
    }

    /// Accepted -> Paid
    pub async fn pay(&self, user_id: UserId, id: OrderId, card: PaymentCard) -> Result<()> {
        card.validate()?;

        let mut order = self.owned_order(user_id, id).await?;
        order.mark_paid()?;
        self.orders.update(&order, OrderStatus::Accepted).await?;

        info!(order_id = id, user_id, "Order paid");
        Ok(())
    }

    /// Orders of other users are reported as missing
    async fn owned_order(&self, user_id: UserId, id: OrderId) -> Result<Order> {
        self.orders
            .find_by_id(id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
    }

    async fn view(&self, order: Order) -> Result<OrderView> {
        let ids: Vec<_> = order.lines.iter().map(|l| l.product_id).collect();
        let mut by_id: HashMap<_, _> = self
            .catalog
            .find_products(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let products = order
            .lines
            .iter()
            .filter_map(|line| by_id.remove(&line.product_id).map(|p| (p, *line)))
            .collect();

        Ok(OrderView { order, products })
    }
}

fn require_user(session: &Session) -> Result<UserId> {
    session
        .user_id
        .ok_or_else(|| AppError::Forbidden("Authentication required".to_string()))
}

fn validate_details(details: &OrderDetails) -> Result<()> {
    crate::domain::account::validate_email(&details.email, true)?;
    if details.city.trim().is_empty() || details.address.trim().is_empty() {
        return Err(AppError::Validation(
            "City and address are required".to_string(),
        ));
    }
    Ok(())
}
