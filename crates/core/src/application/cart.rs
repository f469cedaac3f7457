// Cart Service - basket operations on the session cart

use crate::domain::{Money, Product, ProductId, Session};
use crate::error::{AppError, Result};
use crate::port::CatalogRepository;
use std::sync::Arc;
use tracing::info;

use super::session::SessionService;

/// One basket row: catalog data plus what the cart holds
#[derive(Debug, Clone)]
pub struct BasketItem {
    pub product: Product,
    pub count: u32,
    pub price: Money,
}

pub struct CartService {
    catalog: Arc<dyn CatalogRepository>,
    sessions: Arc<SessionService>,
}

impl CartService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, sessions: Arc<SessionService>) -> Self {
        Self { catalog, sessions }
    }

    /// Cart contents joined with current catalog data.
    ///
    /// Products that disappeared from the catalog are skipped.
    pub async fn basket(&self, session: &Session) -> Result<Vec<BasketItem>> {
        let cart = &session.data.cart;
        if cart.is_empty() {
            return Ok(Vec::new());
        }

        let products = self.catalog.find_products(&cart.product_ids()).await?;
        Ok(products
            .into_iter()
            .filter_map(|product| {
                cart.line(product.id).map(|line| BasketItem {
                    count: line.quantity,
                    price: line.price,
                    product,
                })
            })
            .collect())
    }

    /// Add units at the current catalog price
    pub async fn add(&self, session: &mut Session, product_id: ProductId, count: u32) -> Result<()> {
        let product = self.active_product(product_id).await?;

        let wanted = session
            .data
            .cart
            .quantity_of(product_id)
            .saturating_add(count);
        if !product.in_stock(wanted) {
            return Err(AppError::Validation(format!(
                "Only {} of product {} in stock",
                product.count, product_id
            )));
        }

        session.data.cart.add(product_id, count, product.price)?;
        self.sessions.save(session).await?;

        info!(product_id, count, "Added to cart");
        Ok(())
    }

    pub async fn remove(
        &self,
        session: &mut Session,
        product_id: ProductId,
        count: u32,
    ) -> Result<()> {
        session.data.cart.remove(product_id, count);
        self.sessions.save(session).await?;

        info!(product_id, count, "Removed from cart");
        Ok(())
    }

    pub async fn set_quantity(
        &self,
        session: &mut Session,
        product_id: ProductId,
        count: u32,
    ) -> Result<()> {
        if count > 0 {
            let product = self.active_product(product_id).await?;
            if !product.in_stock(count) {
                return Err(AppError::Validation(format!(
                    "Only {} of product {} in stock",
                    product.count, product_id
                )));
            }
        }

        session.data.cart.set_quantity(product_id, count)?;
        self.sessions.save(session).await?;
        Ok(())
    }

    async fn active_product(&self, product_id: ProductId) -> Result<Product> {
        self.catalog
            .find_products(&[product_id])
            .await?
            .into_iter()
            .find(|p| p.active)
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", product_id)))
    }
}
