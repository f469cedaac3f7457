// Catalog Repository Port (Interface)

use crate::domain::{
    CatalogQuery, Category, CategoryId, NewReview, Page, Product, ProductDetail, ProductId, Sale,
    Tag,
};
use crate::error::Result;
use async_trait::async_trait;

/// Read side of the catalog plus review submission
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active categories as a flat list (parents before children)
    async fn categories(&self) -> Result<Vec<Category>>;

    /// Product page data
    async fn find_product(&self, id: ProductId) -> Result<Option<ProductDetail>>;

    /// Listing data for a set of products (missing ids are skipped)
    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>>;

    /// Filtered, sorted, paginated catalog
    async fn search(&self, query: &CatalogQuery) -> Result<Page<Product>>;

    /// Active products with the most reviews
    async fn popular(&self, limit: u32) -> Result<Vec<Product>>;

    /// Active limited-edition products
    async fn limited(&self, limit: u32) -> Result<Vec<Product>>;

    /// Active products from favourite categories
    async fn banners(&self) -> Result<Vec<Product>>;

    /// Sales, newest first
    async fn sales(&self, page: u32, limit: u32) -> Result<Page<Sale>>;

    /// All tags, or the tags used by products of a category tree
    async fn tags(&self, category: Option<CategoryId>) -> Result<Vec<Tag>>;

    /// Insert a review and recompute the product rating atomically.
    ///
    /// Returns the new rating.
    async fn add_review(
        &self,
        product_id: ProductId,
        review: &NewReview,
        created_at: i64,
    ) -> Result<f64>;
}
