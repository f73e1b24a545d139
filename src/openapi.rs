use crate::AppState;
use axum::{response::Json, routing::get, Router};
use std::sync::Arc;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "0.1.0",
        description = r#"
Backend API for an e-commerce storefront.

- **Catalog**: browse products and categories, space/case-insensitive search
- **Cart**: per-user cart lines with get-or-create add semantics
- **Checkout**: atomic cart-to-order conversion with price snapshots
- **Wishlist**: per-user product bookmarks
- **Reviews**: one rating + comment per user and product, upsert on resubmit
- **Accounts**: registration and JWT-based login

Authenticated endpoints expect `Authorization: Bearer <token>`.
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080/api/v1", description = "Local development")
    ),
    components(schemas(
        crate::errors::ErrorResponse,
        crate::handlers::auth::RegisterRequest,
        crate::handlers::auth::LoginRequest,
        crate::handlers::auth::LoginResponse,
        crate::handlers::carts::AddItemRequest,
        crate::handlers::carts::UpdateQuantityRequest,
        crate::handlers::checkout::CheckoutRequest,
        crate::handlers::reviews::SubmitReviewRequest,
        crate::handlers::wishlists::AddWishlistItemRequest,
    )),
    tags(
        (name = "Accounts", description = "Registration and login"),
        (name = "Catalog", description = "Products, categories, and search"),
        (name = "Cart", description = "Cart management"),
        (name = "Checkout", description = "Order placement and history"),
        (name = "Wishlist", description = "Wishlist management"),
        (name = "Reviews", description = "Product reviews")
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub fn openapi_routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}
