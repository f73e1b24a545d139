use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser, errors::ApiError, services::SubmitReviewInput, AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Review endpoints, nested under the products router.
pub fn review_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{id}/reviews", get(list_reviews))
        .route("/{id}/reviews", put(submit_review))
}

/// List a product's reviews, newest first
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = state
        .services
        .reviews
        .list_for_product(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(reviews))
}

/// Create or overwrite the caller's review of a product
async fn submit_review(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<SubmitReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let review = state
        .services
        .reviews
        .submit(
            user.user_id,
            product_id,
            SubmitReviewInput {
                rating: payload.rating,
                comment: payload.comment,
            },
        )
        .await
        .map_err(map_service_error)?;

    Ok(success_response(review))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitReviewRequest {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}
