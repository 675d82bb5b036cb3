//! Integration tests for product and variant management.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;

#[tokio::test]
async fn product_crud_lifecycle() {
    let app = TestApp::new().await;

    // Create
    let response = app
        .request_authenticated(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Camiseta Estampada",
                "reference": "CAM-001",
                "price": "49.90",
                "cost_price": "20.00"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let product = body_json(response).await;
    let product_id = product["id"].as_str().unwrap().to_string();
    assert_eq!(product["name"], "Camiseta Estampada");

    // Read, with (empty) variants
    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/products/{product_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["reference"], "CAM-001");
    assert!(fetched["variants"].as_array().unwrap().is_empty());

    // Update just the price
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/products/{product_id}"),
            Some(json!({ "price": "39.90" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Camiseta Estampada");

    // Delete
    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/products/{product_id}"),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/products/{product_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn prices_survive_the_database_round_trip() {
    let app = TestApp::new().await;

    // Four decimal places is the full precision the schema stores.
    let (product, _) = app.seed_variant("Meia Esportiva", dec!(12.3456), 3).await;

    let fetched = app
        .state
        .services
        .catalog
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(fetched.product.price, dec!(12.3456));
}

#[tokio::test]
async fn duplicate_reference_is_a_conflict() {
    let app = TestApp::new().await;

    let payload = json!({
        "name": "Calca Jeans",
        "reference": "CAL-010",
        "price": "120.00",
        "cost_price": "60.00"
    });

    let first = app
        .request_authenticated(Method::POST, "/api/v1/products", Some(payload.clone()))
        .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .request_authenticated(Method::POST, "/api/v1/products", Some(payload))
        .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn variant_stock_management() {
    let app = TestApp::new().await;

    let (product, variant) = app.seed_variant("Vestido", dec!(89.90), 7).await;

    // Adjust stock
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/variants/{}/quantity", variant.id),
            Some(json!({ "quantity": 12 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let adjusted = body_json(response).await;
    assert_eq!(adjusted["quantity"].as_i64().unwrap(), 12);

    // Negative stock is rejected
    let response = app
        .request_authenticated(
            Method::PUT,
            &format!("/api/v1/variants/{}/quantity", variant.id),
            Some(json!({ "quantity": -1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Remove the variant; the product stays
    let response = app
        .request_authenticated(
            Method::DELETE,
            &format!("/api/v1/variants/{}", variant.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request_authenticated(Method::GET, &format!("/api/v1/products/{}", product.id), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert!(fetched["variants"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adding_variant_to_unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request_authenticated(
            Method::POST,
            &format!("/api/v1/products/{}/variants", uuid::Uuid::new_v4()),
            Some(json!({ "size": "G", "color": "Azul", "quantity": 5 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pos_catalog_filters_by_search_term() {
    let app = TestApp::new().await;

    app.seed_variant("Camiseta Lisa", dec!(35.00), 10).await;
    app.seed_variant("Moletom", dec!(110.00), 4).await;

    let response = app
        .request_authenticated(Method::GET, "/api/v1/pos/catalog?search=camiseta", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = body_json(response).await;
    let entries = catalog.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Camiseta Lisa");
    assert_eq!(entries[0]["variants"].as_array().unwrap().len(), 1);

    // No filter returns everything
    let response = app
        .request_authenticated(Method::GET, "/api/v1/pos/catalog", None)
        .await;
    let catalog = body_json(response).await;
    assert_eq!(catalog.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn product_list_requires_authentication() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/products", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
