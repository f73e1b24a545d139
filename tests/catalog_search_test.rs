mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use storefront_api::services::{CreateProductInput, ProductListQuery};

#[tokio::test]
async fn search_is_space_and_case_insensitive() {
    let app = TestApp::new().await;
    app.seed_product("Red Shirt", dec!(19.99)).await;
    app.seed_product("Blue Jeans", dec!(50.00)).await;

    let results = app
        .state
        .services
        .catalog
        .search_products("redshirt")
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Red Shirt");
}

#[tokio::test]
async fn search_matches_descriptions_too() {
    let app = TestApp::new().await;
    let category = app.seed_category("Apparel").await;
    app.state
        .services
        .catalog
        .create_product(CreateProductInput {
            name: "Mystery Box".to_string(),
            description: Some("Contains one Red Shirt".to_string()),
            price: dec!(25.00),
            category_id: category.id,
            image_url: None,
            on_sale: false,
            sale_price: None,
        })
        .await
        .unwrap();

    let results = app
        .state
        .services
        .catalog
        .search_products("REDSHIRT")
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Mystery Box");
}

#[tokio::test]
async fn blank_search_returns_nothing() {
    let app = TestApp::new().await;
    app.seed_product("Red Shirt", dec!(19.99)).await;

    for query in ["", "   "] {
        let results = app
            .state
            .services
            .catalog
            .search_products(query.trim())
            .await
            .unwrap();
        assert!(results.is_empty(), "query {query:?}");
    }
}

#[tokio::test]
async fn unmatched_search_returns_nothing() {
    let app = TestApp::new().await;
    app.seed_product("Red Shirt", dec!(19.99)).await;

    let results = app
        .state
        .services
        .catalog
        .search_products("green hat")
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn listing_filters_by_category() {
    let app = TestApp::new().await;
    let apparel = app.seed_category("Apparel").await;
    let kitchen = app.seed_category("Kitchen").await;
    app.seed_product_in("Shirt", dec!(19.99), &apparel).await;
    app.seed_product_in("Jeans", dec!(50.00), &apparel).await;
    app.seed_product_in("Mug", dec!(7.00), &kitchen).await;

    let (all, total) = app
        .state
        .services
        .catalog
        .list_products(ProductListQuery::default())
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(all.len(), 3);

    let (apparel_only, apparel_total) = app
        .state
        .services
        .catalog
        .list_products(ProductListQuery {
            category_id: Some(apparel.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(apparel_total, 2);
    assert!(apparel_only.iter().all(|p| p.category_id == apparel.id));
}

#[tokio::test]
async fn listing_paginates() {
    let app = TestApp::new().await;
    let category = app.seed_category("Bulk").await;
    for i in 0..5 {
        app.seed_product_in(&format!("Item {i}"), dec!(1.00), &category)
            .await;
    }

    let (page, total) = app
        .state
        .services
        .catalog
        .list_products(ProductListQuery {
            category_id: None,
            page: 2,
            per_page: 2,
        })
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);
}
