use crate::handlers::common::{
    map_service_error, no_content_response, success_response, validate_input,
};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::AddToCartInput, AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints; every route is user-scoped.
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart))
        .route("/items", post(add_to_cart))
        .route("/items/{item_id}", put(update_cart_item))
        .route("/items/{item_id}", delete(remove_cart_item))
}

/// Get the caller's cart with line totals and cart total
async fn get_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add a product to the caller's cart (increments when already present)
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .add_item(
            user.user_id,
            AddToCartInput {
                product_id: payload.product_id,
                quantity: payload.quantity,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(item))
}

/// Set a cart line's quantity; zero removes the line
async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .cart
        .set_quantity(user.user_id, item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    match updated {
        Some(item) => Ok(success_response(item)),
        None => Ok(no_content_response()),
    }
}

/// Remove a line from the caller's cart
async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .cart
        .remove_item(user.user_id, item_id)
        .await
        .map_err(map_service_error)?;

    Ok(no_content_response())
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i32,
}
