//! Integration tests for the point-of-sale checkout flow.
//!
//! Covers the happy path (sale recorded, stock decremented, BRL receipt
//! message), the empty-cart and insufficient-stock refusals, and the
//! atomicity guarantee that a failed checkout leaves nothing behind.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn checkout_records_sale_and_decrements_stock() {
    let app = TestApp::new().await;

    let (_, shirt) = app.seed_variant("Camiseta Basica", dec!(15.00), 10).await;
    let (_, mug) = app.seed_variant("Caneca", dec!(15.00), 5).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [
                    { "variant_id": shirt.id, "quantity": 2 },
                    { "variant_id": mug.id, "quantity": 1 }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = body_json(response).await;
    assert_eq!(
        receipt["message"].as_str().unwrap(),
        "Venda finalizada com sucesso! Total: R$ 45,00"
    );
    assert_eq!(receipt["items"].as_array().unwrap().len(), 2);

    // Stock is decremented per line.
    let shirt_after = app
        .state
        .services
        .catalog
        .get_product(shirt.product_id)
        .await
        .unwrap();
    assert_eq!(shirt_after.variants[0].quantity, 8);

    let mug_after = app
        .state
        .services
        .catalog
        .get_product(mug.product_id)
        .await
        .unwrap();
    assert_eq!(mug_after.variants[0].quantity, 4);
}

#[tokio::test]
async fn duplicate_lines_for_one_variant_are_merged() {
    let app = TestApp::new().await;

    let (_, shirt) = app.seed_variant("Camiseta Basica", dec!(10.00), 10).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [
                    { "variant_id": shirt.id, "quantity": 2 },
                    { "variant_id": shirt.id, "quantity": 3 }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let receipt = body_json(response).await;
    // Both lines count: one merged item for 5 units, charged in full.
    assert_eq!(receipt["items"].as_array().unwrap().len(), 1);
    assert_eq!(receipt["items"][0]["quantity"].as_i64().unwrap(), 5);
    let total: rust_decimal::Decimal = receipt["sale"]["total_amount"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(total, dec!(50.00));

    let shirt_after = app
        .state
        .services
        .catalog
        .get_product(shirt.product_id)
        .await
        .unwrap();
    assert_eq!(shirt_after.variants[0].quantity, 5);
}

#[tokio::test]
async fn duplicate_lines_summing_beyond_stock_are_refused() {
    let app = TestApp::new().await;

    let (_, shirt) = app.seed_variant("Camiseta Basica", dec!(10.00), 4).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [
                    { "variant_id": shirt.id, "quantity": 3 },
                    { "variant_id": shirt.id, "quantity": 3 }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let shirt_after = app
        .state
        .services
        .catalog
        .get_product(shirt.product_id)
        .await
        .unwrap();
    assert_eq!(shirt_after.variants[0].quantity, 4);
}

#[tokio::test]
async fn checkout_with_no_items_is_refused() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({ "items": [] })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Cart is empty"));
}

#[tokio::test]
async fn checkout_beyond_stock_is_refused() {
    let app = TestApp::new().await;

    let (product, variant) = app.seed_variant("Bermuda", dec!(79.90), 3).await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [{ "variant_id": variant.id, "quantity": 4 }]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Stock untouched, nothing recorded.
    let after = app
        .state
        .services
        .catalog
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(after.variants[0].quantity, 3);

    let sales = app
        .request_authenticated(Method::GET, "/api/v1/sales", None)
        .await;
    let body = body_json(sales).await;
    assert_eq!(body["total"].as_u64().unwrap(), 0);
}

#[tokio::test]
async fn failed_checkout_rolls_back_every_line() {
    let app = TestApp::new().await;

    let (plenty_product, plenty) = app.seed_variant("Tenis", dec!(199.90), 10).await;
    let (_, scarce) = app.seed_variant("Meia", dec!(9.90), 1).await;

    // First line would succeed on its own; second exceeds stock.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [
                    { "variant_id": plenty.id, "quantity": 2 },
                    { "variant_id": scarce.id, "quantity": 5 }
                ]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The passing line must not stick.
    let after = app
        .state
        .services
        .catalog
        .get_product(plenty_product.id)
        .await
        .unwrap();
    assert_eq!(after.variants[0].quantity, 10);

    let sales = app
        .request_authenticated(Method::GET, "/api/v1/sales", None)
        .await;
    let body = body_json(sales).await;
    assert_eq!(body["total"].as_u64().unwrap(), 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn stale_cart_loses_to_the_conditional_decrement() {
    let app = TestApp::new().await;

    let (product, plenty) = app.seed_variant("Jaqueta", dec!(149.90), 4).await;
    let (_, shirt) = app.seed_variant("Polo", dec!(59.90), 4).await;

    // Cart built against a snapshot of 4 units each.
    let cart = app
        .state
        .services
        .checkout
        .build_cart(&[
            pdv_api::services::checkout::CheckoutLineInput {
                variant_id: plenty.id,
                quantity: 2,
            },
            pdv_api::services::checkout::CheckoutLineInput {
                variant_id: shirt.id,
                quantity: 3,
            },
        ])
        .await
        .unwrap();

    // Stock for the second line shrinks after the snapshot was taken.
    app.state
        .services
        .catalog
        .set_variant_quantity(shirt.id, 1)
        .await
        .unwrap();

    let err = app.state.services.checkout.checkout(&cart).await.unwrap_err();
    assert_matches::assert_matches!(err, pdv_api::errors::ServiceError::InsufficientStock(_));

    // The first line's decrement was rolled back with the rest.
    let after = app
        .state
        .services
        .catalog
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(after.variants[0].quantity, 4);

    let (sales, total) = app.state.services.sales.list_sales(1, 20).await.unwrap();
    assert_eq!(total, 0);
    assert!(sales.is_empty());
}

#[tokio::test]
async fn checkout_for_unknown_variant_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [{ "variant_id": uuid::Uuid::new_v4(), "quantity": 1 }]
            })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn checkout_requires_authentication() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({ "items": [] })),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn repeated_checkouts_drain_stock_exactly_once_each() {
    let app = TestApp::new().await;

    let (product, variant) = app.seed_variant("Bone", dec!(29.90), 5).await;

    for _ in 0..2 {
        let response = app
            .request_authenticated(
                Method::POST,
                "/api/v1/pos/checkout",
                Some(json!({
                    "items": [{ "variant_id": variant.id, "quantity": 2 }]
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // 5 - 2 - 2 = 1 left; a third checkout for 2 units must fail and
    // stock never goes negative.
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/pos/checkout",
            Some(json!({
                "items": [{ "variant_id": variant.id, "quantity": 2 }]
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let after = app
        .state
        .services
        .catalog
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(after.variants[0].quantity, 1);
}
