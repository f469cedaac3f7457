// Catalog handlers: categories, listing, product page, reviews

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::WithRejection;
use storefront_core::domain::{CatalogQuery, NewReview, Page, Product, Tag};

use super::{JsonBody, PathParam, QueryParams};
use crate::error::ApiResult;
use crate::server::AppState;
use crate::session::AuthSession;
use crate::types::{
    CategoryDto, HealthResponse, ProductDetailDto, ProductDto, ReviewDto, ReviewRequest, SaleDto,
    SalesParams, TagsParams,
};

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: storefront_core::VERSION,
    })
}

pub async fn categories(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryDto>>> {
    let categories = state.catalog.categories().await?;
    Ok(Json(categories.into_iter().map(CategoryDto::from).collect()))
}

/// Filter panel arrives as raw pairs so repeated `tags[]` keys survive
pub async fn catalog(
    State(state): State<AppState>,
    WithRejection(Query(pairs), _): QueryParams<Vec<(String, String)>>,
) -> ApiResult<Json<Page<ProductDto>>> {
    let query = CatalogQuery::from_pairs(pairs)?;
    let page = state.catalog.search(&query).await?;
    let offset = state.config.utc_offset;
    Ok(Json(page.map(|p| ProductDto::new(p, &offset))))
}

pub async fn popular(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.catalog.popular().await?;
    Ok(Json(cards(products, &state)))
}

pub async fn limited(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.catalog.limited().await?;
    Ok(Json(cards(products, &state)))
}

pub async fn banners(State(state): State<AppState>) -> ApiResult<Json<Vec<ProductDto>>> {
    let products = state.catalog.banners().await?;
    Ok(Json(cards(products, &state)))
}

pub async fn sales(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<SalesParams>,
) -> ApiResult<Json<Page<SaleDto>>> {
    let page = state
        .catalog
        .sales(params.current_page.unwrap_or(1))
        .await?;
    Ok(Json(page.map(SaleDto::from)))
}

pub async fn tags(
    State(state): State<AppState>,
    WithRejection(Query(params), _): QueryParams<TagsParams>,
) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.catalog.tags(params.category).await?))
}

pub async fn product(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
) -> ApiResult<Json<ProductDetailDto>> {
    let detail = state.catalog.product(id).await?;
    Ok(Json(ProductDetailDto::new(detail, &state.config.utc_offset)))
}

/// Returns the product's reviews including the new one
pub async fn add_review(
    State(state): State<AppState>,
    WithRejection(Path(id), _): PathParam<i64>,
    _auth: AuthSession,
    WithRejection(Json(request), _): JsonBody<ReviewRequest>,
) -> ApiResult<(StatusCode, Json<Vec<ReviewDto>>)> {
    state
        .catalog
        .add_review(
            id,
            NewReview {
                author: request.author,
                email: request.email,
                text: request.text,
                rate: request.rate,
            },
        )
        .await?;

    let detail = state.catalog.product(id).await?;
    let offset = state.config.utc_offset;
    let reviews = detail
        .reviews
        .into_iter()
        .map(|r| ReviewDto::new(r, &offset))
        .collect();
    Ok((StatusCode::CREATED, Json(reviews)))
}

fn cards(products: Vec<Product>, state: &AppState) -> Vec<ProductDto> {
    products
        .into_iter()
        .map(|p| ProductDto::new(p, &state.config.utc_offset))
        .collect()
}
