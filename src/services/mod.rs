pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod reviews;
pub mod wishlist;

pub use accounts::{AccountService, LoginInput, RegisterInput};
pub use cart::{AddToCartInput, CartService, CartView};
pub use catalog::{CatalogService, CreateProductInput, ProductListQuery, UpdateProductInput};
pub use checkout::{CheckoutService, OrderWithItems, PlaceOrderInput};
pub use reviews::{ReviewService, SubmitReviewInput};
pub use wishlist::{WishlistEntry, WishlistService};
