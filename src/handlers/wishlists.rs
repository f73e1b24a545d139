use crate::handlers::common::{
    created_response, map_service_error, no_content_response, success_response,
};
use crate::{auth::AuthenticatedUser, errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Creates the router for wishlist endpoints; every route is user-scoped.
pub fn wishlist_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_wishlist))
        .route("/items", post(add_to_wishlist))
        .route("/items/{product_id}", delete(remove_from_wishlist))
}

/// Get the caller's wishlist
async fn get_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let entries = state
        .services
        .wishlist
        .list(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(entries))
}

/// Add a product to the caller's wishlist; adding twice is a no-op
async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<AddWishlistItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (entry, created) = state
        .services
        .wishlist
        .add(user.user_id, payload.product_id)
        .await
        .map_err(map_service_error)?;

    if created {
        Ok(created_response(entry))
    } else {
        Ok(success_response(entry))
    }
}

/// Remove a product from the caller's wishlist
async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .wishlist
        .remove(user.user_id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

// Request DTOs

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddWishlistItemRequest {
    pub product_id: Uuid,
}
