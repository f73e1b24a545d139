pub mod auth;
pub mod carts;
pub mod checkout;
pub mod common;
pub mod products;
pub mod reviews;
pub mod wishlists;

use crate::auth::AuthService;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::mailer::Mailer;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<crate::services::AccountService>,
    pub catalog: Arc<crate::services::CatalogService>,
    pub cart: Arc<crate::services::CartService>,
    pub checkout: Arc<crate::services::CheckoutService>,
    pub wishlist: Arc<crate::services::WishlistService>,
    pub reviews: Arc<crate::services::ReviewService>,
}

impl AppServices {
    /// Build the service container used by the HTTP handlers.
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        auth_service: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let accounts = Arc::new(crate::services::AccountService::new(
            db.clone(),
            event_sender.clone(),
            auth_service,
        ));
        let catalog = Arc::new(crate::services::CatalogService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let cart = Arc::new(crate::services::CartService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let checkout = Arc::new(crate::services::CheckoutService::new(
            db.clone(),
            event_sender.clone(),
            mailer,
        ));
        let wishlist = Arc::new(crate::services::WishlistService::new(
            db.clone(),
            event_sender.clone(),
        ));
        let reviews = Arc::new(crate::services::ReviewService::new(db, event_sender));

        Self {
            accounts,
            catalog,
            cart,
            checkout,
            wishlist,
            reviews,
        }
    }
}
