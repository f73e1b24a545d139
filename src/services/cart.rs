use crate::{
    entities::{cart_item, CartItem, CartItemModel, Product, ProductModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Shopping cart service.
///
/// A cart is the set of cart-line rows belonging to one user. There is
/// at most one line per (user, product): adding an already-carted
/// product increments its quantity instead of inserting a second row,
/// and setting a line's quantity to zero deletes it. Totals are derived
/// from the current catalog price at read time, never stored.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Adds a product to the user's cart (get-or-create semantics).
    ///
    /// If the user already has a line for this product its quantity is
    /// incremented by `input.quantity`; otherwise a new line is created.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        input: AddToCartInput,
    ) -> Result<CartItemModel, ServiceError> {
        if input.quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let product = Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", input.product_id))
            })?;

        let existing = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .one(&*self.db)
            .await?;

        let item = match existing {
            Some(item) => {
                let quantity = item.quantity + input.quantity;
                let mut item: cart_item::ActiveModel = item.into();
                item.quantity = Set(quantity);
                item.update(&*self.db).await?
            }
            None => {
                let item = cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    product_id: Set(input.product_id),
                    quantity: Set(input.quantity),
                    added_at: Set(Utc::now()),
                };
                item.insert(&*self.db).await?
            }
        };

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id,
                product_id: input.product_id,
            })
            .await;

        info!(
            "Cart add for user {}: {} x{} (now {})",
            user_id, product.name, input.quantity, item.quantity
        );
        Ok(item)
    }

    /// Sets the quantity of a cart line.
    ///
    /// A quantity of zero or less deletes the line and returns `None`.
    /// Lines belonging to other users are reported as not found.
    #[instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<Option<CartItemModel>, ServiceError> {
        let item = CartItem::find_by_id(item_id)
            .filter(cart_item::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;

        let product_id = item.product_id;

        if quantity <= 0 {
            item.delete(&*self.db).await?;
            self.event_sender
                .send_or_log(Event::CartItemRemoved {
                    user_id,
                    product_id,
                })
                .await;
            return Ok(None);
        }

        let mut item: cart_item::ActiveModel = item.into();
        item.quantity = Set(quantity);
        Ok(Some(item.update(&*self.db).await?))
    }

    /// Removes one line from the user's cart.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, user_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        self.set_quantity(user_id, item_id, 0).await?;
        Ok(())
    }

    /// Returns the user's cart lines with their products, line totals,
    /// and the cart total.
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let rows = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::AddedAt)
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for (item, product) in rows {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Cart item {} references a missing product",
                    item.id
                ))
            })?;
            let line_total = line_total(product.price, item.quantity);
            lines.push(CartLine {
                item,
                product,
                line_total,
            });
        }

        let total = lines.iter().map(|line| line.line_total).sum();
        Ok(CartView { items: lines, total })
    }
}

/// Line total for one cart line at the product's current price.
pub(crate) fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Input for adding a product to the cart
#[derive(Debug, Clone, Deserialize)]
pub struct AddToCartInput {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// One cart line joined with its product
#[derive(Debug, Serialize)]
pub struct CartLine {
    pub item: CartItemModel,
    pub product: ProductModel,
    pub line_total: Decimal,
}

/// A user's cart with derived totals
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub total: Decimal,
}
