// Catalog fixture loader
//
// Seeds categories, tags, products, sales and reviews from one JSON document.
// Rows carry explicit ids and are upserted, so loading twice is harmless.

use crate::error::map_sqlx_error;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{Sqlite, SqlitePool, Transaction};
use storefront_core::domain::Money;
use storefront_core::error::{AppError, Result};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Fixture {
    categories: Vec<CategoryFixture>,
    tags: Vec<TagFixture>,
    products: Vec<ProductFixture>,
    sales: Vec<SaleFixture>,
    reviews: Vec<ReviewFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryFixture {
    id: i64,
    title: String,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    favourite: bool,
    #[serde(default)]
    parent: Option<i64>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagFixture {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductFixture {
    id: i64,
    #[serde(default)]
    category: Option<i64>,
    price: f64,
    #[serde(default)]
    count: i64,
    date: DateTime<Utc>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    full_description: String,
    #[serde(default = "default_true")]
    free_delivery: bool,
    #[serde(default = "default_true")]
    active: bool,
    #[serde(default)]
    limited_edition: bool,
    #[serde(default)]
    tags: Vec<i64>,
    #[serde(default)]
    images: Vec<ImageFixture>,
    #[serde(default)]
    specifications: Vec<SpecificationFixture>,
}

#[derive(Debug, Deserialize)]
struct ImageFixture {
    path: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpecificationFixture {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleFixture {
    id: i64,
    product: i64,
    price: f64,
    sale_price: f64,
    date_from: NaiveDate,
    #[serde(default)]
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct ReviewFixture {
    id: i64,
    product: i64,
    author: String,
    email: String,
    text: String,
    rate: u8,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Row counts loaded from a fixture document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureSummary {
    pub categories: usize,
    pub tags: usize,
    pub products: usize,
    pub sales: usize,
    pub reviews: usize,
}

/// Load a catalog fixture in one transaction
pub async fn load_fixtures(pool: &SqlitePool, json: &str) -> Result<FixtureSummary> {
    let fixture: Fixture = serde_json::from_str(json)?;

    let mut tx = pool.begin().await.map_err(map_sqlx_error)?;
    // Categories may reference parents listed later in the document
    sqlx::query("PRAGMA defer_foreign_keys = ON")
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

    for category in &fixture.categories {
        upsert_category(&mut tx, category).await?;
    }
    for tag in &fixture.tags {
        sqlx::query(
            "INSERT INTO tags (id, name) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET name = excluded.name",
        )
        .bind(tag.id)
        .bind(&tag.name)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    }
    for product in &fixture.products {
        upsert_product(&mut tx, product).await?;
    }
    for sale in &fixture.sales {
        upsert_sale(&mut tx, sale).await?;
    }
    for review in &fixture.reviews {
        upsert_review(&mut tx, review).await?;
    }

    if !fixture.reviews.is_empty() {
        sqlx::query(
            r#"
            UPDATE products
            SET rating = (SELECT ROUND(AVG(r.rate), 2) FROM reviews r WHERE r.product_id = products.id)
            WHERE id IN (SELECT DISTINCT product_id FROM reviews)
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
    }

    tx.commit().await.map_err(map_sqlx_error)?;

    let summary = FixtureSummary {
        categories: fixture.categories.len(),
        tags: fixture.tags.len(),
        products: fixture.products.len(),
        sales: fixture.sales.len(),
        reviews: fixture.reviews.len(),
    };
    info!(?summary, "Fixtures loaded");
    Ok(summary)
}

async fn upsert_category(tx: &mut Transaction<'_, Sqlite>, c: &CategoryFixture) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (id, title, active, favourite, parent_id, icon_path)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            active = excluded.active,
            favourite = excluded.favourite,
            parent_id = excluded.parent_id,
            icon_path = excluded.icon_path
        "#,
    )
    .bind(c.id)
    .bind(&c.title)
    .bind(c.active)
    .bind(c.favourite)
    .bind(c.parent)
    .bind(&c.icon)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

async fn upsert_product(tx: &mut Transaction<'_, Sqlite>, p: &ProductFixture) -> Result<()> {
    let price = Money::from_major(p.price)?;

    sqlx::query(
        r#"
        INSERT INTO products (
            id, category_id, price, count, created_at, title, title_search,
            description, full_description, free_delivery, active, limited_edition
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            category_id = excluded.category_id,
            price = excluded.price,
            count = excluded.count,
            created_at = excluded.created_at,
            title = excluded.title,
            title_search = excluded.title_search,
            description = excluded.description,
            full_description = excluded.full_description,
            free_delivery = excluded.free_delivery,
            active = excluded.active,
            limited_edition = excluded.limited_edition
        "#,
    )
    .bind(p.id)
    .bind(p.category)
    .bind(price.minor())
    .bind(p.count)
    .bind(p.date.timestamp_millis())
    .bind(&p.title)
    .bind(p.title.to_lowercase())
    .bind(&p.description)
    .bind(&p.full_description)
    .bind(p.free_delivery)
    .bind(p.active)
    .bind(p.limited_edition)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;

    // Child collections are replaced wholesale
    for table in ["product_images", "product_tags", "specifications"] {
        sqlx::query(&format!("DELETE FROM {} WHERE product_id = ?", table))
            .bind(p.id)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
    }

    for image in &p.images {
        sqlx::query("INSERT INTO product_images (product_id, name, path) VALUES (?, ?, ?)")
            .bind(p.id)
            .bind(&image.name)
            .bind(&image.path)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
    }
    for tag_id in &p.tags {
        sqlx::query("INSERT OR IGNORE INTO product_tags (tag_id, product_id) VALUES (?, ?)")
            .bind(*tag_id)
            .bind(p.id)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
    }
    for specification in &p.specifications {
        sqlx::query("INSERT INTO specifications (product_id, name, value) VALUES (?, ?, ?)")
            .bind(p.id)
            .bind(&specification.name)
            .bind(&specification.value)
            .execute(&mut **tx)
            .await
            .map_err(map_sqlx_error)?;
    }
    Ok(())
}

async fn upsert_sale(tx: &mut Transaction<'_, Sqlite>, s: &SaleFixture) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (id, product_id, price, sale_price, date_from, date_to)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            product_id = excluded.product_id,
            price = excluded.price,
            sale_price = excluded.sale_price,
            date_from = excluded.date_from,
            date_to = excluded.date_to
        "#,
    )
    .bind(s.id)
    .bind(s.product)
    .bind(Money::from_major(s.price)?.minor())
    .bind(Money::from_major(s.sale_price)?.minor())
    .bind(s.date_from)
    .bind(s.date_to)
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}

async fn upsert_review(tx: &mut Transaction<'_, Sqlite>, r: &ReviewFixture) -> Result<()> {
    if !(1..=5).contains(&r.rate) {
        return Err(AppError::Validation(format!(
            "Fixture review {} has rate {}",
            r.id, r.rate
        )));
    }

    sqlx::query(
        r#"
        INSERT INTO reviews (id, product_id, author, email, text, rate, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            product_id = excluded.product_id,
            author = excluded.author,
            email = excluded.email,
            text = excluded.text,
            rate = excluded.rate,
            created_at = excluded.created_at
        "#,
    )
    .bind(r.id)
    .bind(r.product)
    .bind(&r.author)
    .bind(&r.email)
    .bind(&r.text)
    .bind(i64::from(r.rate))
    .bind(r.date.map(|d| d.timestamp_millis()).unwrap_or(0))
    .execute(&mut **tx)
    .await
    .map_err(map_sqlx_error)?;
    Ok(())
}
