// Catalog Service - browsing, filtering and reviews

use crate::domain::account::validate_email;
use crate::domain::{
    CatalogQuery, Category, CategoryId, NewReview, Page, Product, ProductDetail, ProductId, Sale,
    Tag,
};
use crate::error::{AppError, Result};
use crate::port::{CatalogRepository, TimeProvider};
use std::sync::Arc;
use tracing::info;

pub const POPULAR_LIMIT: u32 = 8;
pub const LIMITED_LIMIT: u32 = 16;
pub const SALES_PAGE_LIMIT: u32 = 20;

pub struct CatalogService {
    catalog: Arc<dyn CatalogRepository>,
    time_provider: Arc<dyn TimeProvider>,
}

impl CatalogService {
    pub fn new(catalog: Arc<dyn CatalogRepository>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            catalog,
            time_provider,
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let flat = self.catalog.categories().await?;
        Ok(Category::build_tree(flat))
    }

    pub async fn product(&self, id: ProductId) -> Result<ProductDetail> {
        self.catalog
            .find_product(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {} not found", id)))
    }

    pub async fn search(&self, query: &CatalogQuery) -> Result<Page<Product>> {
        if query.is_empty_range() {
            return Ok(Page::new(Vec::new(), query.page, query.limit, 0));
        }
        self.catalog.search(query).await
    }

    pub async fn popular(&self) -> Result<Vec<Product>> {
        self.catalog.popular(POPULAR_LIMIT).await
    }

    pub async fn limited(&self) -> Result<Vec<Product>> {
        self.catalog.limited(LIMITED_LIMIT).await
    }

    pub async fn banners(&self) -> Result<Vec<Product>> {
        self.catalog.banners().await
    }

    pub async fn sales(&self, page: u32) -> Result<Page<Sale>> {
        self.catalog.sales(page.max(1), SALES_PAGE_LIMIT).await
    }

    pub async fn tags(&self, category: Option<CategoryId>) -> Result<Vec<Tag>> {
        self.catalog.tags(category).await
    }

    /// Validate and store a review, returning the product's new rating
    pub async fn add_review(&self, product_id: ProductId, review: NewReview) -> Result<f64> {
        validate_review(&review)?;

        let rating = self
            .catalog
            .add_review(product_id, &review, self.time_provider.now_millis())
            .await?;

        info!(product_id, rate = review.rate, rating, "Review added");
        Ok(rating)
    }
}

fn validate_review(review: &NewReview) -> Result<()> {
    if !(1..=5).contains(&review.rate) {
        return Err(AppError::Validation(format!(
            "Rate must be between 1 and 5, got {}",
            review.rate
        )));
    }
    if review.author.trim().is_empty() {
        return Err(AppError::Validation("Author cannot be empty".to_string()));
    }
    if review.text.trim().is_empty() {
        return Err(AppError::Validation("Review text cannot be empty".to_string()));
    }
    validate_email(&review.email, false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(rate: u8) -> NewReview {
        NewReview {
            author: "Ann".into(),
            email: "ann@example.com".into(),
            text: "Great".into(),
            rate,
        }
    }

    #[test]
    fn test_review_rate_bounds() {
        assert!(validate_review(&review(0)).is_err());
        assert!(validate_review(&review(1)).is_ok());
        assert!(validate_review(&review(5)).is_ok());
        assert!(validate_review(&review(6)).is_err());
    }

    #[test]
    fn test_review_requires_email() {
        let mut r = review(4);
        r.email = "nobody".into();
        assert!(validate_review(&r).is_err());
    }
}
