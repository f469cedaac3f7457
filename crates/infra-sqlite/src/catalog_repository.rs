// SQLite CatalogRepository Implementation

use crate::error::map_sqlx_error;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;
use storefront_core::domain::catalog_query::{Predicate, SortDirection, SortKey};
use storefront_core::domain::{
    average_rating, CatalogQuery, Category, CategoryId, Image, Money, NewReview, Page, Product,
    ProductDetail, ProductId, Review, Sale, Specification, Tag,
};
use storefront_core::error::{AppError, Result};
use storefront_core::port::CatalogRepository;
use tracing::debug;

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.category_id, p.price, p.count, p.created_at, p.title,
           p.description, p.full_description, p.free_delivery, p.active,
           p.limited_edition, p.rating,
           (SELECT COUNT(*) FROM reviews r WHERE r.product_id = p.id) AS reviews_count
    FROM products p
"#;

pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Attach images and tags to bare product rows, preserving row order
    async fn hydrate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ProductId> = rows.iter().map(|r| r.id).collect();

        let mut images = self.images_for(&ids).await?;

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT pt.product_id, t.id, t.name FROM product_tags pt \
             JOIN tags t ON t.id = pt.tag_id WHERE pt.product_id IN (",
        );
        push_id_list(&mut qb, &ids);
        qb.push(" ORDER BY t.id");
        let tag_rows: Vec<(i64, i64, String)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut tags: HashMap<ProductId, Vec<Tag>> = HashMap::new();
        for (product_id, id, name) in tag_rows {
            tags.entry(product_id).or_default().push(Tag { id, name });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = row.id;
                let product_images = images
                    .remove(&id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|path| Image::from_media_path(&path, row.title.clone()))
                    .collect();
                row.into_product(product_images, tags.remove(&id).unwrap_or_default())
            })
            .collect())
    }

    /// Image paths per product, in insertion order
    async fn images_for(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Vec<String>>> {
        let mut images: HashMap<ProductId, Vec<String>> = HashMap::new();
        if ids.is_empty() {
            return Ok(images);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT product_id, path FROM product_images WHERE product_id IN (",
        );
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY id");
        let rows: Vec<(i64, String)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        for (product_id, path) in rows {
            images.entry(product_id).or_default().push(path);
        }
        Ok(images)
    }

    async fn fetch_products(&self, mut qb: QueryBuilder<'_, Sqlite>) -> Result<Vec<Product>> {
        let rows: Vec<ProductRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        self.hydrate(rows).await
    }
}

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT id, title, active, favourite, parent_id, icon_path
            FROM categories
            WHERE active = 1
            ORDER BY parent_id IS NOT NULL, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    async fn find_product(&self, id: ProductId) -> Result<Option<ProductDetail>> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id = ").push_bind(id);
        let product = match self.fetch_products(qb).await?.pop() {
            Some(p) => p,
            None => return Ok(None),
        };

        let reviews = sqlx::query_as::<_, ReviewRow>(
            "SELECT author, email, text, rate, created_at FROM reviews WHERE product_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(ReviewRow::into_review)
        .collect();

        let specifications = sqlx::query_as::<_, (String, String)>(
            "SELECT name, value FROM specifications WHERE product_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .into_iter()
        .map(|(name, value)| Specification { name, value })
        .collect();

        Ok(Some(ProductDetail {
            product,
            reviews,
            specifications,
        }))
    }

    async fn find_products(&self, ids: &[ProductId]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.id IN (");
        push_id_list(&mut qb, ids);
        qb.push(" ORDER BY p.id");
        self.fetch_products(qb).await
    }

    async fn search(&self, query: &CatalogQuery) -> Result<Page<Product>> {
        let predicates = query.predicates();

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM products p");
        push_predicates(&mut count_qb, &predicates);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        push_predicates(&mut qb, &predicates);
        qb.push(format!(
            " ORDER BY {} {}, p.id ASC",
            sort_column(query.sort),
            sort_direction(query.direction)
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(query.offset()));

        debug!(sql = qb.sql(), total, "Catalog search");

        let items = self.fetch_products(qb).await?;
        Ok(Page::new(items, query.page, query.limit, total))
    }

    async fn popular(&self, limit: u32) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.active = 1 ORDER BY reviews_count DESC, p.rating DESC, p.id ASC LIMIT ")
            .push_bind(i64::from(limit));
        self.fetch_products(qb).await
    }

    async fn limited(&self, limit: u32) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(" WHERE p.active = 1 AND p.limited_edition = 1 ORDER BY p.id LIMIT ")
            .push_bind(i64::from(limit));
        self.fetch_products(qb).await
    }

    async fn banners(&self) -> Result<Vec<Product>> {
        let mut qb = QueryBuilder::<Sqlite>::new(PRODUCT_SELECT);
        qb.push(
            " WHERE p.active = 1 \
             AND p.category_id IN (SELECT id FROM categories WHERE favourite = 1 AND active = 1) \
             ORDER BY p.id",
        );
        self.fetch_products(qb).await
    }

    async fn sales(&self, page: u32, limit: u32) -> Result<Page<Sale>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT s.id, s.product_id, s.price, s.sale_price, s.date_from, s.date_to, p.title
            FROM sales s
            JOIN products p ON p.id = s.product_id
            ORDER BY s.date_from DESC, s.id ASC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let ids: Vec<ProductId> = rows.iter().map(|r| r.product_id).collect();
        let images = self.images_for(&ids).await?;

        let items = rows
            .into_iter()
            .map(|row| {
                let product_images = images
                    .get(&row.product_id)
                    .map(|paths| {
                        paths
                            .iter()
                            .map(|p| Image::from_media_path(p, row.title.clone()))
                            .collect()
                    })
                    .unwrap_or_default();
                row.into_sale(product_images)
            })
            .collect();

        Ok(Page::new(items, page, limit, total))
    }

    async fn tags(&self, category: Option<CategoryId>) -> Result<Vec<Tag>> {
        let rows: Vec<(i64, String)> = match category {
            None => sqlx::query_as("SELECT id, name FROM tags ORDER BY id")
                .fetch_all(&self.pool)
                .await,
            Some(category_id) => sqlx::query_as(
                r#"
                SELECT DISTINCT t.id, t.name
                FROM tags t
                JOIN product_tags pt ON pt.tag_id = t.id
                JOIN products p ON p.id = pt.product_id
                WHERE p.category_id IN (SELECT id FROM categories WHERE id = ? OR parent_id = ?)
                ORDER BY t.id
                "#,
            )
            .bind(category_id)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await,
        }
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(|(id, name)| Tag { id, name }).collect())
    }

    async fn add_review(
        &self,
        product_id: ProductId,
        review: &NewReview,
        created_at: i64,
    ) -> Result<f64> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!("Product {} not found", product_id)));
        }

        sqlx::query(
            r#"
            INSERT INTO reviews (product_id, author, email, text, rate, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(product_id)
        .bind(review.author.trim())
        .bind(review.email.trim())
        .bind(review.text.trim())
        .bind(i64::from(review.rate))
        .bind(created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let rates: Vec<i64> = sqlx::query_scalar("SELECT rate FROM reviews WHERE product_id = ?")
            .bind(product_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        let rates: Vec<u8> = rates
            .into_iter()
            .map(|r| u8::try_from(r).unwrap_or(0))
            .collect();
        let rating = average_rating(&rates);

        sqlx::query("UPDATE products SET rating = ? WHERE id = ?")
            .bind(rating)
            .bind(product_id)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(rating)
    }
}

/// Render the conjunctive predicate list as a WHERE clause on alias `p`
fn push_predicates(qb: &mut QueryBuilder<'_, Sqlite>, predicates: &[Predicate]) {
    for (i, predicate) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match predicate {
            Predicate::Active => {
                qb.push("p.active = 1");
            }
            Predicate::TitleContains(name) => {
                qb.push("p.title_search LIKE ")
                    .push_bind(format!("%{}%", escape_like(&name.to_lowercase())))
                    .push(" ESCAPE '\\'");
            }
            Predicate::PriceAtLeast(min) => {
                qb.push("p.price >= ").push_bind(min.minor());
            }
            Predicate::PriceAtMost(max) => {
                qb.push("p.price <= ").push_bind(max.minor());
            }
            Predicate::FreeDelivery => {
                qb.push("p.free_delivery = 1");
            }
            Predicate::InStock => {
                qb.push("p.count > 0");
            }
            Predicate::HasAnyTag(tags) => {
                // EXISTS keeps a product with several matching tags to a single row
                qb.push(
                    "EXISTS (SELECT 1 FROM product_tags pt \
                     WHERE pt.product_id = p.id AND pt.tag_id IN (",
                );
                push_id_list(qb, tags);
                qb.push(")");
            }
            Predicate::InCategoryTree(category_id) => {
                qb.push("p.category_id IN (SELECT id FROM categories WHERE id = ")
                    .push_bind(*category_id)
                    .push(" OR parent_id = ")
                    .push_bind(*category_id)
                    .push(")");
            }
        }
    }
}

/// Push `?, ?, ?)` for a non-empty id list; the caller opens the parenthesis
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[i64]) {
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn sort_column(key: SortKey) -> &'static str {
    match key {
        SortKey::Rating => "p.rating",
        SortKey::Price => "p.price",
        SortKey::Reviews => "reviews_count",
        SortKey::Date => "p.created_at",
    }
}

fn sort_direction(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Ascending => "ASC",
        SortDirection::Descending => "DESC",
    }
}

// Database row representations
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: Option<i64>,
    price: i64,
    count: i64,
    created_at: i64,
    title: String,
    description: String,
    full_description: String,
    free_delivery: bool,
    active: bool,
    limited_edition: bool,
    rating: f64,
    reviews_count: i64,
}

impl ProductRow {
    fn into_product(self, images: Vec<Image>, tags: Vec<Tag>) -> Product {
        Product {
            id: self.id,
            category_id: self.category_id,
            price: Money::from_minor(self.price),
            count: self.count,
            created_at: self.created_at,
            title: self.title,
            description: self.description,
            full_description: self.full_description,
            free_delivery: self.free_delivery,
            active: self.active,
            limited_edition: self.limited_edition,
            rating: self.rating,
            images,
            tags,
            reviews_count: self.reviews_count,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    title: String,
    active: bool,
    favourite: bool,
    parent_id: Option<i64>,
    icon_path: Option<String>,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        let icon = self
            .icon_path
            .as_deref()
            .map(|path| Image::from_media_path(path, self.title.clone()));
        Category {
            id: self.id,
            title: self.title,
            active: self.active,
            favourite: self.favourite,
            parent_id: self.parent_id,
            icon,
            subcategories: Vec::new(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    author: String,
    email: String,
    text: String,
    rate: i64,
    created_at: i64,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            author: self.author,
            email: self.email,
            text: self.text,
            rate: u8::try_from(self.rate).unwrap_or(0),
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: i64,
    product_id: i64,
    price: i64,
    sale_price: i64,
    date_from: chrono::NaiveDate,
    date_to: Option<chrono::NaiveDate>,
    title: String,
}

impl SaleRow {
    fn into_sale(self, images: Vec<Image>) -> Sale {
        Sale {
            id: self.id,
            product_id: self.product_id,
            price: Money::from_minor(self.price),
            sale_price: Money::from_minor(self.sale_price),
            date_from: self.date_from,
            date_to: self.date_to,
            title: self.title,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};

    async fn setup_test_db() -> SqlitePool {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        seed(&pool).await;
        pool
    }

    async fn exec(pool: &SqlitePool, sql: &str) {
        sqlx::query(sql).execute(pool).await.unwrap();
    }

    async fn seed(pool: &SqlitePool) {
        exec(
            pool,
            "INSERT INTO categories (id, title, active, favourite, parent_id) VALUES \
             (1, 'Phones', 1, 1, NULL), (2, 'Smartphones', 1, 0, 1), (3, 'Laptops', 1, 0, NULL)",
        )
        .await;
        exec(
            pool,
            "INSERT INTO products (id, category_id, price, count, created_at, title, title_search, free_delivery, active, limited_edition) VALUES \
             (1, 2, 49900, 5, 100, 'Phone 100%', 'phone 100%', 1, 1, 0), \
             (2, 1, 19900, 0, 200, 'Cheap phone', 'cheap phone', 0, 1, 1), \
             (3, 3, 99900, 2, 300, 'Laptop Pro', 'laptop pro', 1, 1, 0), \
             (4, 3, 5000, 9, 400, 'Hidden laptop', 'hidden laptop', 1, 0, 0)",
        )
        .await;
        exec(pool, "INSERT INTO tags (id, name) VALUES (1, 'new'), (2, 'hit')").await;
        exec(
            pool,
            "INSERT INTO product_tags (tag_id, product_id) VALUES (1, 1), (2, 1), (2, 3)",
        )
        .await;
        exec(
            pool,
            "INSERT INTO product_images (product_id, path) VALUES (1, 'products/1/a.png'), (1, 'products/1/b.png')",
        )
        .await;
        exec(
            pool,
            "INSERT INTO reviews (product_id, author, email, text, rate, created_at) VALUES \
             (3, 'a', 'a@x.io', 'ok', 4, 1), (3, 'b', 'b@x.io', 'ok', 5, 2), (1, 'c', 'c@x.io', 'ok', 3, 3)",
        )
        .await;
    }

    fn query(pairs: &[(&str, &str)]) -> CatalogQuery {
        CatalogQuery::from_pairs(pairs.iter().copied()).unwrap()
    }

    fn ids(products: &[Product]) -> Vec<ProductId> {
        products.iter().map(|p| p.id).collect()
    }

    #[tokio::test]
    async fn test_search_only_active() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo.search(&query(&[])).await.unwrap();
        // Default sort: date ascending
        assert_eq!(ids(&page.items), vec![1, 2, 3]);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.last_page, 1);
    }

    #[tokio::test]
    async fn test_search_tags_do_not_duplicate_rows() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo
            .search(&query(&[("tags[]", "1"), ("tags[]", "2")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_search_name_is_literal() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo.search(&query(&[("filter[name]", "100%")])).await.unwrap();
        assert_eq!(ids(&page.items), vec![1]);

        let page = repo.search(&query(&[("filter[name]", "%")])).await.unwrap();
        assert_eq!(ids(&page.items), vec![1]);
    }

    #[tokio::test]
    async fn test_search_name_folds_non_ascii_case() {
        let pool = setup_test_db().await;
        exec(
            &pool,
            "INSERT INTO products (id, category_id, price, count, created_at, title, title_search, active) \
             VALUES (5, 1, 29900, 3, 500, 'Телефон Nokia', 'телефон nokia', 1)",
        )
        .await;
        let repo = SqliteCatalogRepository::new(pool);

        for needle in ["телефон", "ТЕЛЕФОН", "Телефон NOKIA"] {
            let page = repo.search(&query(&[("filter[name]", needle)])).await.unwrap();
            assert_eq!(ids(&page.items), vec![5], "needle {}", needle);
        }
    }

    #[tokio::test]
    async fn test_search_price_stock_and_delivery() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo
            .search(&query(&[("filter[minPrice]", "199"), ("filter[maxPrice]", "499")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![1, 2]);

        let page = repo
            .search(&query(&[("filter[available]", "true")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![1, 3]);

        let page = repo
            .search(&query(&[("filter[freeDelivery]", "true")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_search_category_includes_children() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo.search(&query(&[("category", "1")])).await.unwrap();
        assert_eq!(ids(&page.items), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_search_sort_and_pagination() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let page = repo
            .search(&query(&[("sort", "price"), ("sortType", "inc")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![3, 1, 2]);

        let page = repo
            .search(&query(&[("sort", "reviews"), ("sortType", "inc")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![3, 1, 2]);

        let page = repo
            .search(&query(&[("sort", "price"), ("limit", "2"), ("currentPage", "2")]))
            .await
            .unwrap();
        assert_eq!(ids(&page.items), vec![3]);
        assert_eq!(page.last_page, 2);
    }

    #[tokio::test]
    async fn test_hydrates_images_and_tags() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let products = repo.find_products(&[1]).await.unwrap();
        let product = &products[0];
        assert_eq!(product.images.len(), 2);
        assert_eq!(product.images[0].src, "/media/products/1/a.png");
        assert_eq!(product.images[0].alt, "Phone 100%");
        assert_eq!(product.tags.len(), 2);
        assert_eq!(product.reviews_count, 1);
    }

    #[tokio::test]
    async fn test_popular_limited_banners() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        assert_eq!(ids(&repo.popular(2).await.unwrap()), vec![3, 1]);
        assert_eq!(ids(&repo.limited(10).await.unwrap()), vec![2]);
        // Only category 1 is favourite; its child category does not count
        assert_eq!(ids(&repo.banners().await.unwrap()), vec![2]);
    }

    #[tokio::test]
    async fn test_tags_for_category_tree() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let all = repo.tags(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let laptop_tags = repo.tags(Some(3)).await.unwrap();
        assert_eq!(laptop_tags, vec![Tag { id: 2, name: "hit".into() }]);
    }

    #[tokio::test]
    async fn test_add_review_recomputes_rating() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let review = NewReview {
            author: "d".into(),
            email: "d@x.io".into(),
            text: "meh".into(),
            rate: 3,
        };
        let rating = repo.add_review(3, &review, 10).await.unwrap();
        assert_eq!(rating, 4.0);

        let detail = repo.find_product(3).await.unwrap().unwrap();
        assert_eq!(detail.product.rating, 4.0);
        assert_eq!(detail.reviews.len(), 3);
        assert_eq!(detail.product.reviews_count, 3);
    }

    #[tokio::test]
    async fn test_add_review_unknown_product() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let review = NewReview {
            author: "d".into(),
            email: "d@x.io".into(),
            text: "hi".into(),
            rate: 5,
        };
        let result = repo.add_review(99, &review, 10).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_categories_flat_parents_first() {
        let repo = SqliteCatalogRepository::new(setup_test_db().await);
        let categories = repo.categories().await.unwrap();
        let order: Vec<_> = categories.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![1, 3, 2]);
    }
}
