mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use storefront_api::{
    entities::{review, Review},
    errors::ServiceError,
    services::SubmitReviewInput,
};

#[tokio::test]
async fn resubmitting_a_review_overwrites_instead_of_duplicating() {
    let app = TestApp::new().await;
    let user = app.seed_user("alice").await;
    let product = app.seed_product("Shirt", dec!(19.99)).await;

    app.state
        .services
        .reviews
        .submit(
            user.id,
            product.id,
            SubmitReviewInput {
                rating: 2,
                comment: "Meh at first".to_string(),
            },
        )
        .await
        .unwrap();

    let second = app
        .state
        .services
        .reviews
        .submit(
            user.id,
            product.id,
            SubmitReviewInput {
                rating: 5,
                comment: "Grew on me".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(second.rating, 5);
    assert_eq!(second.comment, "Grew on me");

    let rows = Review::find()
        .filter(review::Column::ProductId.eq(product.id))
        .all(&*app.state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1, "expected a single review row");
    assert_eq!(rows[0].rating, 5);
}

#[tokio::test]
async fn different_users_get_separate_reviews() {
    let app = TestApp::new().await;
    let alice = app.seed_user("alice").await;
    let bob = app.seed_user("bob").await;
    let product = app.seed_product("Jeans", dec!(50.00)).await;

    for (user, rating) in [(&alice, 5), (&bob, 4)] {
        app.state
            .services
            .reviews
            .submit(
                user.id,
                product.id,
                SubmitReviewInput {
                    rating,
                    comment: String::new(),
                },
            )
            .await
            .unwrap();
    }

    let reviews = app
        .state
        .services
        .reviews
        .list_for_product(product.id)
        .await
        .unwrap();
    assert_eq!(reviews.len(), 2);

    let average = app
        .state
        .services
        .reviews
        .average_rating(product.id)
        .await
        .unwrap();
    assert_eq!(average, dec!(4.5));
}

#[tokio::test]
async fn average_rating_is_zero_without_reviews() {
    let app = TestApp::new().await;
    let product = app.seed_product("Hat", dec!(9.99)).await;

    let average = app
        .state
        .services
        .reviews
        .average_rating(product.id)
        .await
        .unwrap();
    assert_eq!(average, dec!(0));
}

#[tokio::test]
async fn out_of_range_ratings_are_rejected() {
    let app = TestApp::new().await;
    let user = app.seed_user("carol").await;
    let product = app.seed_product("Mug", dec!(7.00)).await;

    for rating in [0, 6, -1] {
        let err = app
            .state
            .services
            .reviews
            .submit(
                user.id,
                product.id,
                SubmitReviewInput {
                    rating,
                    comment: String::new(),
                },
            )
            .await
            .expect_err("expected failure");
        assert!(matches!(err, ServiceError::ValidationError(_)));
    }
}
