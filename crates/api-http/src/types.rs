//! Request/Response DTOs
//!
//! Field names follow the storefront client (camelCase).

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::application::{BasketItem, OrderView};
use storefront_core::domain::{
    Category, Image, Money, Order, Product, ProductDetail, Profile, Review, Sale, Specification,
    Tag,
};

pub const ORDER_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";
const REVIEW_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Render epoch milliseconds in the display offset
pub fn format_millis(millis: i64, offset: &FixedOffset, format: &str) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(offset).format(format).to_string())
        .unwrap_or_default()
}

fn rfc3339(millis: i64, offset: &FixedOffset) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(offset).to_rfc3339())
        .unwrap_or_default()
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub id: i64,
    pub title: String,
    pub image: Option<Image>,
    pub href: String,
    pub subcategories: Vec<CategoryDto>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        let href = category.href();
        Self {
            id: category.id,
            title: category.title,
            image: category.icon,
            href,
            subcategories: category
                .subcategories
                .into_iter()
                .map(CategoryDto::from)
                .collect(),
        }
    }
}

/// Product card; `reviews` is the review count
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: i64,
    pub category: Option<i64>,
    pub price: Money,
    pub count: i64,
    pub date: String,
    pub title: String,
    pub description: String,
    pub free_delivery: bool,
    pub images: Vec<Image>,
    pub tags: Vec<Tag>,
    pub reviews: i64,
    pub rating: f64,
}

impl ProductDto {
    pub fn new(product: Product, offset: &FixedOffset) -> Self {
        Self {
            id: product.id,
            category: product.category_id,
            price: product.price,
            count: product.count,
            date: rfc3339(product.created_at, offset),
            title: product.title,
            description: product.description,
            free_delivery: product.free_delivery,
            images: product.images,
            tags: product.tags,
            reviews: product.reviews_count,
            rating: product.rating,
        }
    }

    /// Card with quantity and unit price taken from a cart or order line
    pub fn with_line(product: Product, count: u32, price: Money, offset: &FixedOffset) -> Self {
        Self {
            count: i64::from(count),
            price,
            ..Self::new(product, offset)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: u8,
    pub date: String,
}

impl ReviewDto {
    pub fn new(review: Review, offset: &FixedOffset) -> Self {
        Self {
            date: format_millis(review.created_at, offset, REVIEW_DATE_FORMAT),
            author: review.author,
            email: review.email,
            text: review.text,
            rate: review.rate,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetailDto {
    pub id: i64,
    pub category: Option<i64>,
    pub price: Money,
    pub count: i64,
    pub date: String,
    pub title: String,
    pub description: String,
    pub full_description: String,
    pub free_delivery: bool,
    pub images: Vec<Image>,
    pub tags: Vec<Tag>,
    pub reviews: Vec<ReviewDto>,
    pub specifications: Vec<Specification>,
    pub rating: f64,
}

impl ProductDetailDto {
    pub fn new(detail: ProductDetail, offset: &FixedOffset) -> Self {
        let ProductDetail {
            product,
            reviews,
            specifications,
        } = detail;
        Self {
            id: product.id,
            category: product.category_id,
            price: product.price,
            count: product.count,
            date: rfc3339(product.created_at, offset),
            title: product.title,
            description: product.description,
            full_description: product.full_description,
            free_delivery: product.free_delivery,
            images: product.images,
            tags: product.tags,
            reviews: reviews
                .into_iter()
                .map(|r| ReviewDto::new(r, offset))
                .collect(),
            specifications,
            rating: product.rating,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: i64,
    pub price: Money,
    pub sale_price: Money,
    pub date_from: NaiveDate,
    pub date_to: Option<NaiveDate>,
    pub title: String,
    pub href: String,
    pub images: Vec<Image>,
}

impl From<Sale> for SaleDto {
    fn from(sale: Sale) -> Self {
        let href = sale.href();
        Self {
            id: sale.id,
            price: sale.price,
            sale_price: sale.sale_price,
            date_from: sale.date_from,
            date_to: sale.date_to,
            title: sale.title,
            href,
            images: sale.images,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesParams {
    #[serde(rename = "currentPage")]
    pub current_page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct TagsParams {
    pub category: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub author: String,
    pub email: String,
    pub text: String,
    pub rate: u8,
}

// ============================================================================
// Basket
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BasketRequest {
    pub id: i64,
    pub count: u32,
}

pub fn basket_dto(items: Vec<BasketItem>, offset: &FixedOffset) -> Vec<ProductDto> {
    items
        .into_iter()
        .map(|item| ProductDto::with_line(item.product, item.count, item.price, offset))
        .collect()
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: i64,
    pub created_at: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub delivery_type: Option<&'static str>,
    pub payment_type: Option<&'static str>,
    pub total_cost: Money,
    pub status: &'static str,
    pub city: Option<String>,
    pub address: Option<String>,
    pub products: Vec<ProductDto>,
}

impl OrderDto {
    pub fn new(view: OrderView, offset: &FixedOffset) -> Self {
        let OrderView { order, products } = view;
        let Order {
            id,
            created_at,
            full_name,
            email,
            phone,
            delivery_type,
            payment_type,
            total_cost,
            status,
            city,
            address,
            ..
        } = order;

        Self {
            id,
            created_at: format_millis(created_at, offset, ORDER_DATE_FORMAT),
            full_name,
            email,
            phone,
            delivery_type: delivery_type.map(|d| d.as_str()),
            payment_type: payment_type.map(|p| p.as_str()),
            total_cost,
            status: status.as_str(),
            city,
            address,
            products: products
                .into_iter()
                .map(|(product, line)| ProductDto::with_line(product, line.count, line.price, offset))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedOrderDto {
    pub order_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOrderRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub delivery_type: String,
    pub payment_type: String,
    pub city: String,
    pub address: String,
}

// ============================================================================
// Accounts
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub name: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDto {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<Image>,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        let avatar = profile.avatar();
        Self {
            full_name: profile.full_name,
            email: profile.email,
            phone: profile.phone,
            avatar,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
