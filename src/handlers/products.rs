use crate::handlers::common::{
    map_service_error, success_response, PaginatedResponse, PaginationParams,
};
use crate::{errors::ApiError, services::ProductListQuery, AppState};
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for catalog browsing endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products))
        .route("/search", get(search_products))
        .route("/{id}", get(get_product))
}

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_categories))
}

/// List products, optionally filtered by category
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let query = ProductListQuery {
        category_id: filter.category_id,
        page: pagination.page,
        per_page: pagination.per_page,
    };

    let (products, total) = state
        .services
        .catalog
        .list_products(query)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(PaginatedResponse::new(
        products,
        pagination.page,
        pagination.per_page,
        total,
    )))
}

/// Product detail with reviews and average rating
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .catalog
        .get_product(id)
        .await
        .map_err(map_service_error)?;

    let reviews = state
        .services
        .reviews
        .list_for_product(id)
        .await
        .map_err(map_service_error)?;

    let average_rating = state
        .services
        .reviews
        .average_rating(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(ProductDetailResponse {
        product,
        reviews,
        average_rating,
    }))
}

/// Space- and case-insensitive substring search
async fn search_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.q.unwrap_or_default();

    let results = state
        .services
        .catalog
        .search_products(query.trim())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(SearchResponse { query, results }))
}

/// List all categories
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .catalog
        .list_categories()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

// Request and response DTOs

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    pub product: crate::entities::ProductModel,
    pub reviews: Vec<crate::entities::ReviewModel>,
    pub average_rating: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<crate::entities::ProductModel>,
}
