use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::AuthenticatedUser,
    errors::ApiError,
    services::{LoginInput, RegisterInput},
    AppState,
};
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use validator::Validate;

/// Creates the router for account endpoints
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

/// Register a new user account
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = RegisterInput {
        username: payload.username,
        email: payload.email,
        password: payload.password,
        password_confirm: payload.password_confirm,
        first_name: payload.first_name,
        last_name: payload.last_name,
    };

    let user = state
        .services
        .accounts
        .register(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(user))
}

/// Verify credentials and issue an access token
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let (user, token) = state
        .services
        .accounts
        .login(LoginInput {
            username: payload.username,
            password: payload.password,
        })
        .await
        .map_err(map_service_error)?;

    Ok(success_response(LoginResponse {
        access_token: token.access_token,
        token_type: token.token_type,
        expires_in: token.expires_in,
        username: user.username,
        email: user.email,
    }))
}

/// Return the authenticated user's profile
async fn me(
    State(state): State<Arc<AppState>>,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .services
        .accounts
        .get_user(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(profile))
}

// Request and response DTOs

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirm: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub username: String,
    pub email: String,
}
