//! Catalog endpoints over a seeded database

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ids, TestApp};

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_categories_tree_hides_inactive() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/categories", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let categories = &response.body;
    assert_eq!(ids(categories), vec![1, 3]);
    assert_eq!(categories[0]["href"], "/catalog/1");
    assert_eq!(
        categories[0]["image"]["src"],
        "/media/categories/electronics.svg"
    );
    assert_eq!(ids(&categories[0]["subcategories"]), vec![2]);
}

#[tokio::test]
async fn test_catalog_defaults_to_active_products() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/catalog", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let mut found = ids(&response.body["items"]);
    found.sort();
    assert_eq!(found, vec![1, 2, 3, 4]);
    assert_eq!(response.body["currentPage"], 1);
    assert_eq!(response.body["lastPage"], 1);
}

#[tokio::test]
async fn test_catalog_name_filter_is_case_insensitive() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/catalog?filter%5Bname%5D=PHONE", None).await;
    assert_eq!(ids(&response.body["items"]), vec![1]);
}

#[tokio::test]
async fn test_catalog_name_filter_folds_cyrillic_case() {
    let app = TestApp::spawn().await;
    // "РОМАН" against the stored title "Роман Novel"
    let response = app
        .get(
            "/api/catalog?filter%5Bname%5D=%D0%A0%D0%9E%D0%9C%D0%90%D0%9D",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(ids(&response.body["items"]), vec![3]);
}

#[tokio::test]
async fn test_catalog_name_filter_escapes_wildcards() {
    let app = TestApp::spawn().await;

    let underscore = app.get("/api/catalog?filter%5Bname%5D=_", None).await;
    assert!(ids(&underscore.body["items"]).is_empty());

    let percent = app.get("/api/catalog?filter%5Bname%5D=100%25", None).await;
    assert_eq!(ids(&percent.body["items"]), vec![4]);
}

#[tokio::test]
async fn test_catalog_price_range_and_flags() {
    let app = TestApp::spawn().await;

    let ranged = app
        .get(
            "/api/catalog?filter%5BminPrice%5D=100&filter%5BmaxPrice%5D=600",
            None,
        )
        .await;
    assert_eq!(ids(&ranged.body["items"]), vec![1]);

    let free = app
        .get(
            "/api/catalog?filter%5BfreeDelivery%5D=true&filter%5Bavailable%5D=true&sort=price&sortType=dec",
            None,
        )
        .await;
    assert_eq!(ids(&free.body["items"]), vec![4, 1]);

    let available = app
        .get("/api/catalog?filter%5Bavailable%5D=true", None)
        .await;
    assert!(!ids(&available.body["items"]).contains(&3));
}

#[tokio::test]
async fn test_catalog_inverted_price_range_is_empty() {
    let app = TestApp::spawn().await;
    let response = app
        .get(
            "/api/catalog?filter%5BminPrice%5D=600&filter%5BmaxPrice%5D=100",
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(ids(&response.body["items"]).is_empty());
    assert_eq!(response.body["lastPage"], 1);
}

#[tokio::test]
async fn test_catalog_rejects_unparsable_price() {
    let app = TestApp::spawn().await;
    let response = app
        .get("/api/catalog?filter%5BminPrice%5D=cheap", None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_catalog_tags_do_not_duplicate_products() {
    let app = TestApp::spawn().await;
    let response = app
        .get("/api/catalog?tags%5B%5D=1&tags%5B%5D=2&sort=price", None)
        .await;
    assert_eq!(ids(&response.body["items"]), vec![1, 2]);
}

#[tokio::test]
async fn test_catalog_category_includes_subcategories() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/catalog?category=1&sort=price", None).await;
    assert_eq!(ids(&response.body["items"]), vec![1, 2]);
}

#[tokio::test]
async fn test_catalog_sort_inc_lists_largest_first() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/catalog?sort=price&sortType=inc", None).await;
    assert_eq!(ids(&response.body["items"]), vec![2, 1, 4, 3]);
}

#[tokio::test]
async fn test_catalog_pagination() {
    let app = TestApp::spawn().await;
    let first = app
        .get("/api/catalog?sort=price&limit=3&currentPage=1", None)
        .await;
    let second = app
        .get("/api/catalog?sort=price&limit=3&currentPage=2", None)
        .await;

    assert_eq!(ids(&first.body["items"]), vec![3, 4, 1]);
    assert_eq!(ids(&second.body["items"]), vec![2]);
    assert_eq!(second.body["currentPage"], 2);
    assert_eq!(second.body["lastPage"], 2);
}

#[tokio::test]
async fn test_popular_limited_and_banners() {
    let app = TestApp::spawn().await;

    let popular = app.get("/api/products/popular", None).await;
    assert_eq!(ids(&popular.body), vec![1, 4, 2, 3]);
    assert_eq!(popular.body[0]["reviews"], 2);

    let limited = app.get("/api/products/limited", None).await;
    assert_eq!(ids(&limited.body), vec![2]);

    let banners = app.get("/api/banners", None).await;
    assert!(ids(&banners.body).contains(&2));
    assert!(!ids(&banners.body).contains(&3));
}

#[tokio::test]
async fn test_sales_newest_first() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/sales?currentPage=1", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let items = &response.body["items"];
    assert_eq!(ids(items), vec![2, 1]);
    assert_eq!(items[0]["salePrice"], 1350.0);
    assert_eq!(items[0]["dateFrom"], "2023-06-01");
    assert_eq!(items[1]["href"], "/product/1");
}

#[tokio::test]
async fn test_tags_by_category() {
    let app = TestApp::spawn().await;

    let all = app.get("/api/tags", None).await;
    assert_eq!(ids(&all.body), vec![1, 2, 3]);

    let books = app.get("/api/tags?category=3", None).await;
    assert_eq!(books.body, json!([{ "id": 3, "name": "gift" }]));
}

#[tokio::test]
async fn test_product_detail() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/product/1", None).await;
    assert_eq!(response.status, StatusCode::OK);

    let product = &response.body;
    assert_eq!(product["price"], 499.99);
    assert_eq!(product["rating"], 4.5);
    assert_eq!(product["fullDescription"], "Flagship phone with a big screen");
    assert_eq!(product["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(product["specifications"][0]["name"], "Screen");
    assert_eq!(product["images"][0]["src"], "/media/products/phone-x.png");
}

#[tokio::test]
async fn test_unknown_product_is_404() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/product/999", None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_product_id_is_json_400() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/product/abc", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string(), "body: {}", response.body);
}

#[tokio::test]
async fn test_malformed_query_parameter_is_json_400() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/sales?currentPage=x", None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string(), "body: {}", response.body);
}

#[tokio::test]
async fn test_review_requires_authentication() {
    let app = TestApp::spawn().await;
    let review = json!({ "author": "Zed", "email": "zed@example.com", "text": "Nice", "rate": 4 });

    let response = app.post("/api/product/4/reviews", None, review).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_review_updates_rating() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_up("reviewer").await;

    let response = app
        .post(
            "/api/product/4/reviews",
            Some(&cookie),
            json!({ "author": "Zed", "email": "zed@example.com", "text": "Tasty", "rate": 5 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body.as_array().unwrap().len(), 2);

    let product = app.get("/api/product/4", None).await;
    assert_eq!(product.body["rating"], 4.0);
}

#[tokio::test]
async fn test_review_rejects_out_of_range_rate() {
    let app = TestApp::spawn().await;
    let cookie = app.sign_up("harsh").await;

    let response = app
        .post(
            "/api/product/4/reviews",
            Some(&cookie),
            json!({ "author": "Zed", "email": "zed@example.com", "text": "Bad", "rate": 6 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let missing = app
        .post(
            "/api/product/999/reviews",
            Some(&cookie),
            json!({ "author": "Zed", "email": "zed@example.com", "text": "Who", "rate": 3 }),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
