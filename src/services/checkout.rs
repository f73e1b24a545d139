use crate::{
    entities::{
        cart_item, order, order_item, CartItem, Order, OrderItem, OrderItemModel, OrderModel,
        Product, User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    mailer::Mailer,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Checkout service: converts a user's cart into an immutable order.
///
/// The order header, its items, and the cart clear are one database
/// transaction, so a crash or a concurrent checkout can never leave an
/// order without its items or a half-cleared cart. Each order item
/// copies the product's price at checkout time; later catalog edits do
/// not touch placed orders.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    mailer: Arc<dyn Mailer>,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            db,
            event_sender,
            mailer,
        }
    }

    /// Places an order from the user's cart.
    ///
    /// An empty cart is rejected before anything is written. After the
    /// transaction commits, a confirmation email is sent best-effort: a
    /// mailer failure is logged and does not fail the placed order.
    #[instrument(skip(self, input))]
    pub async fn place_order(
        &self,
        user_id: Uuid,
        input: PlaceOrderInput,
    ) -> Result<OrderWithItems, ServiceError> {
        let user = User::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", user_id)))?;

        let txn = self.db.begin().await?;

        let lines = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(Product)
            .all(&txn)
            .await?;

        if lines.is_empty() {
            return Err(ServiceError::InvalidOperation(
                "Your cart is empty. Add items before checkout.".to_string(),
            ));
        }

        let mut priced_lines = Vec::with_capacity(lines.len());
        for (item, product) in lines {
            let product = product.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Cart item {} references a missing product",
                    item.id
                ))
            })?;
            priced_lines.push((item, product));
        }

        let total: Decimal = priced_lines
            .iter()
            .map(|(item, product)| product.price * Decimal::from(item.quantity))
            .sum();

        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(user_id),
            total_price: Set(total),
            is_paid: Set(input.payment_mode.eq_ignore_ascii_case("online")),
            shipping_address: Set(input.shipping_address),
            phone: Set(input.phone),
            created_at: Set(Utc::now()),
        };
        let order = order.insert(&txn).await?;

        let mut items = Vec::with_capacity(priced_lines.len());
        for (line, product) in &priced_lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                quantity: Set(line.quantity),
                // Price snapshot: future catalog changes must not
                // affect this order.
                unit_price: Set(product.price),
                created_at: Set(Utc::now()),
            };
            items.push(item.insert(&txn).await?);
        }

        CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderPlaced { order_id, user_id })
            .await;

        // Fire-and-forget: the order stands whether or not the
        // confirmation mail goes out.
        if let Err(err) = self
            .mailer
            .send(
                &user.email,
                "Order Confirmation",
                &format!(
                    "Hi {}, your order has been placed successfully!",
                    user.first_name
                ),
            )
            .await
        {
            error!(%order_id, "Failed to send order confirmation: {}", err);
        }

        info!("Order {} placed by user {} (total {})", order_id, user_id, total);
        Ok(OrderWithItems { order, items })
    }

    /// Lists the user's orders, newest first.
    pub async fn list_orders(&self, user_id: Uuid) -> Result<Vec<OrderModel>, ServiceError> {
        Order::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Fetches one of the user's orders with its items. Orders belonging
    /// to other users are reported as not found.
    pub async fn get_order(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderWithItems, ServiceError> {
        let order = Order::find_by_id(order_id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = OrderItem::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(&*self.db)
            .await?;

        Ok(OrderWithItems { order, items })
    }
}

/// Input for placing an order
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderInput {
    pub shipping_address: String,
    pub phone: String,
    /// "online" marks the order paid; anything else is pay-on-delivery.
    pub payment_mode: String,
}

/// An order with its line items
#[derive(Debug, Serialize)]
pub struct OrderWithItems {
    pub order: OrderModel,
    pub items: Vec<OrderItemModel>,
}
