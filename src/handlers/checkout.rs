use crate::handlers::common::{
    created_response, map_service_error, success_response, validate_input,
};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::PlaceOrderInput, AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for checkout
pub fn checkout_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", post(place_order))
}

/// Creates the router for order history
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{id}", get(get_order))
}

/// Convert the caller's cart into an order
async fn place_order(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Json(payload): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .checkout
        .place_order(
            user.user_id,
            PlaceOrderInput {
                shipping_address: payload.shipping_address,
                phone: payload.phone,
                payment_mode: payload.payment_mode,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(created_response(order))
}

/// List the caller's orders, newest first
async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let orders = state
        .services
        .checkout
        .list_orders(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Fetch one of the caller's orders with its items
async fn get_order(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state
        .services
        .checkout
        .get_order(user.user_id, id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(length(min = 1, max = 200))]
    pub shipping_address: String,
    #[validate(length(min = 1, max = 15))]
    pub phone: String,
    /// "online" marks the order paid; anything else is pay-on-delivery
    #[validate(length(min = 1))]
    pub payment_mode: String,
}
