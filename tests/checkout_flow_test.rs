mod common;

use std::sync::Arc;

use common::{RecordingMailer, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use storefront_api::{
    entities::{cart_item, order, CartItem, Order},
    errors::ServiceError,
    services::{
        checkout::CheckoutService, AddToCartInput, PlaceOrderInput, UpdateProductInput,
    },
};

fn checkout_input(payment_mode: &str) -> PlaceOrderInput {
    PlaceOrderInput {
        shipping_address: "1 Main Street, Springfield".to_string(),
        phone: "555-0101".to_string(),
        payment_mode: payment_mode.to_string(),
    }
}

#[tokio::test]
async fn checkout_creates_one_order_with_cart_total_and_empties_cart() {
    let app = TestApp::new().await;
    let user = app.seed_user("alice").await;
    let shirt = app.seed_product("Shirt", dec!(19.99)).await;
    let jeans = app.seed_product("Jeans", dec!(50.00)).await;

    for (product, quantity) in [(&shirt, 2), (&jeans, 1)] {
        app.state
            .services
            .cart
            .add_item(
                user.id,
                AddToCartInput {
                    product_id: product.id,
                    quantity,
                },
            )
            .await
            .unwrap();
    }

    let placed = app
        .state
        .services
        .checkout
        .place_order(user.id, checkout_input("cod"))
        .await
        .expect("checkout failed");

    assert_eq!(placed.order.total_price, dec!(89.98));
    assert!(!placed.order.is_paid);
    assert_eq!(placed.items.len(), 2);

    // Exactly one order exists for the user.
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);

    // And the cart is empty afterwards.
    let cart_rows = CartItem::find()
        .filter(cart_item::Column::UserId.eq(user.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert!(cart_rows.is_empty());
}

#[tokio::test]
async fn checkout_with_empty_cart_is_rejected_and_writes_nothing() {
    let app = TestApp::new().await;
    let user = app.seed_user("bob").await;

    let err = app
        .state
        .services
        .checkout
        .place_order(user.id, checkout_input("online"))
        .await
        .expect_err("expected failure");
    assert!(matches!(err, ServiceError::InvalidOperation(_)));

    let orders = Order::find()
        .filter(order::Column::UserId.eq(user.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert!(orders.is_empty(), "no order may be created");
    assert!(app.mailer.sent().is_empty(), "no mail may be sent");
}

#[tokio::test]
async fn online_payment_mode_marks_order_paid() {
    let app = TestApp::new().await;
    let user = app.seed_user("carol").await;
    let product = app.seed_product("Hat", dec!(9.99)).await;

    app.state
        .services
        .cart
        .add_item(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let placed = app
        .state
        .services
        .checkout
        .place_order(user.id, checkout_input("Online"))
        .await
        .unwrap();

    assert!(placed.order.is_paid);
}

#[tokio::test]
async fn order_items_keep_their_price_after_catalog_changes() {
    let app = TestApp::new().await;
    let user = app.seed_user("dave").await;
    let product = app.seed_product("Shirt", dec!(19.99)).await;

    app.state
        .services
        .cart
        .add_item(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let placed = app
        .state
        .services
        .checkout
        .place_order(user.id, checkout_input("cod"))
        .await
        .unwrap();
    assert_eq!(placed.items[0].unit_price, dec!(19.99));

    // Raise the catalog price after the order is placed.
    app.state
        .services
        .catalog
        .update_product(
            product.id,
            UpdateProductInput {
                price: Some(dec!(39.99)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let reloaded = app
        .state
        .services
        .checkout
        .get_order(user.id, placed.order.id)
        .await
        .unwrap();
    assert_eq!(reloaded.items[0].unit_price, dec!(19.99));
    assert_eq!(reloaded.order.total_price, dec!(19.99));
}

#[tokio::test]
async fn checkout_sends_confirmation_to_registered_address() {
    let app = TestApp::new().await;
    let user = app.seed_user("erin").await;
    let product = app.seed_product("Mug", dec!(7.00)).await;

    app.state
        .services
        .cart
        .add_item(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    app.state
        .services
        .checkout
        .place_order(user.id, checkout_input("cod"))
        .await
        .unwrap();

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "erin@example.com");
    assert_eq!(sent[0].subject, "Order Confirmation");
    assert!(sent[0].body.contains("erin"));
}

#[tokio::test]
async fn mailer_failure_does_not_fail_checkout() {
    let app = TestApp::new().await;
    let user = app.seed_user("frank").await;
    let product = app.seed_product("Lamp", dec!(30.00)).await;

    app.state
        .services
        .cart
        .add_item(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    app.mailer.set_failing(true);

    let placed = app
        .state
        .services
        .checkout
        .place_order(user.id, checkout_input("cod"))
        .await
        .expect("checkout must survive mail failure");
    assert_eq!(placed.order.total_price, dec!(30.00));

    // The order was committed despite the failed notification.
    let orders = Order::find()
        .filter(order::Column::UserId.eq(user.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn users_only_see_their_own_orders() {
    let app = TestApp::new().await;
    let buyer = app.seed_user("buyer").await;
    let other = app.seed_user("other").await;
    let product = app.seed_product("Desk", dec!(120.00)).await;

    app.state
        .services
        .cart
        .add_item(
            buyer.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 1,
            },
        )
        .await
        .unwrap();

    let placed = app
        .state
        .services
        .checkout
        .place_order(buyer.id, checkout_input("cod"))
        .await
        .unwrap();

    let err = app
        .state
        .services
        .checkout
        .get_order(other.id, placed.order.id)
        .await
        .expect_err("expected failure");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let own = app
        .state
        .services
        .checkout
        .list_orders(buyer.id)
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert!(app
        .state
        .services
        .checkout
        .list_orders(other.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn checkout_service_can_be_built_with_custom_mailer() {
    // Service-level wiring used by callers that need their own backend.
    let app = TestApp::new().await;
    let mailer = Arc::new(RecordingMailer::default());
    let service = CheckoutService::new(
        app.state.db.clone(),
        Arc::new(app.state.event_sender.clone()),
        mailer.clone(),
    );

    let user = app.seed_user("grace").await;
    let product = app.seed_product("Pen", dec!(2.50)).await;
    app.state
        .services
        .cart
        .add_item(
            user.id,
            AddToCartInput {
                product_id: product.id,
                quantity: 2,
            },
        )
        .await
        .unwrap();

    let placed = service
        .place_order(user.id, checkout_input("online"))
        .await
        .unwrap();
    assert_eq!(placed.order.total_price, dec!(5.00));
    assert_eq!(mailer.sent().len(), 1);
}
