// Migration Runner

use sqlx::SqlitePool;
use tracing::info;

/// Run database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    info!("Running database migrations...");

    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    let current_version: i64 = if table_exists > 0 {
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?
            .unwrap_or(0)
    } else {
        0
    };

    info!("Current schema version: {}", current_version);

    if current_version < 1 {
        info!("Applying migration 001: Catalog");
        apply_migration(pool, include_str!("../migrations/001_catalog.sql")).await?;
    }

    if current_version < 2 {
        info!("Applying migration 002: Accounts & Sessions");
        apply_migration(pool, include_str!("../migrations/002_accounts.sql")).await?;
    }

    if current_version < 3 {
        info!("Applying migration 003: Orders");
        apply_migration(pool, include_str!("../migrations/003_orders.sql")).await?;
    }

    if current_version < 4 {
        info!("Applying migration 004: Title search");
        apply_migration(pool, include_str!("../migrations/004_search.sql")).await?;
        backfill_title_search(pool).await?;
    }

    info!("All migrations applied successfully");
    Ok(())
}

/// Fill `title_search` for rows written before the column existed
async fn backfill_title_search(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<(i64, String)> =
        sqlx::query_as("SELECT id, title FROM products WHERE title_search = ''")
            .fetch_all(pool)
            .await?;

    let mut tx = pool.begin().await?;
    for (id, title) in &rows {
        sqlx::query("UPDATE products SET title_search = ? WHERE id = ?")
            .bind(title.to_lowercase())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    if !rows.is_empty() {
        info!("Backfilled title_search for {} products", rows.len());
    }
    Ok(())
}

/// Apply a single migration SQL file
async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = pool.begin().await?;

    // Statements are split on ';' so migration files must not embed one in a literal
    for statement in sql.split(';') {
        let clean_statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if !clean_statement.is_empty() {
            sqlx::query(&clean_statement).execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    #[tokio::test]
    async fn test_run_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        let result = run_migrations(&pool).await;

        if let Err(e) = &result {
            eprintln!("Migration error: {:?}", e);
        }
        assert!(result.is_ok());

        for table in ["products", "users", "sessions", "orders", "order_lines"] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(count, 0, "table {} should start empty", table);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let version: i64 = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, 4);
    }

    #[tokio::test]
    async fn test_title_search_backfilled_with_unicode_lowercase() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        for sql in [
            include_str!("../migrations/001_catalog.sql"),
            include_str!("../migrations/002_accounts.sql"),
            include_str!("../migrations/003_orders.sql"),
        ] {
            apply_migration(&pool, sql).await.unwrap();
        }
        sqlx::query("INSERT INTO categories (id, title) VALUES (1, 'Phones')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO products (id, category_id, price, count, created_at, title) \
             VALUES (1, 1, 100, 1, 0, 'Телефон Nokia')",
        )
        .execute(&pool)
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();

        let title_search: String =
            sqlx::query_scalar("SELECT title_search FROM products WHERE id = 1")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(title_search, "телефон nokia");
    }
}
