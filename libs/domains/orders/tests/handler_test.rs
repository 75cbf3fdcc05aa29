//! Handler tests for the order routes

use axum::http::StatusCode;
use domain_orders::*;
use domain_products::{CreateProduct, InMemoryProductRepository, Product, ProductRepository, Seller};
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{auth, http};
use tower::ServiceExt;
use uuid::Uuid;

async fn setup() -> (axum::Router, Product) {
    let products = Arc::new(InMemoryProductRepository::new());
    let product = products
        .create(Product::new(
            Seller {
                id: Uuid::now_v7(),
                name: "John Farmer",
            },
            CreateProduct {
                name: "Ackee".to_string(),
                title: "Jamaican Ackee".to_string(),
                category: "fruits".to_string(),
                price: 500.0,
                ..Default::default()
            },
        ))
        .await
        .unwrap();

    let service = OrderService::new(Arc::new(InMemoryOrderRepository::new()), products);
    (orders_router(service, auth::jwt_auth()), product)
}

fn order_body(product: &Product, client_ref: Option<&str>) -> Value {
    json!({
        "items": [{ "productId": product.id, "quantity": 2 }],
        "shippingAddress": { "street": "12 Hope Road", "city": "Kingston", "type": "home" },
        "paymentMethod": "cash",
        "timeSlot": "9am-12pm",
        "total": 1.0,
        "clientRef": client_ref,
    })
}

async fn place(app: &axum::Router, token: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(http::json_request("POST", "/", Some(token), body))
        .await
        .unwrap();
    let status = response.status();
    (status, http::json_body(response.into_body()).await)
}

#[tokio::test]
async fn test_orders_require_token() {
    let (app, product) = setup().await;
    let response = app
        .oneshot(http::json_request("POST", "/", None, &order_body(&product, None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_uses_server_total() {
    let (app, product) = setup().await;
    let token = auth::bearer_for("customer");

    let (status, body) = place(&app, &token, &order_body(&product, None)).await;

    assert_eq!(status, StatusCode::CREATED);
    let order = &body["order"];
    assert_eq!(order["subtotal"], 1000.0);
    assert_eq!(order["total"], 1350.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["shippingAddress"]["type"], "home");
}

#[tokio::test]
async fn test_repeated_client_ref_returns_200_with_same_order() {
    let (app, product) = setup().await;
    let token = auth::bearer_for("customer");
    let body = order_body(&product, Some("local_1718000000000"));

    let (first_status, first) = place(&app, &token, &body).await;
    let (second_status, second) = place(&app, &token, &body).await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(first["order"]["_id"], second["order"]["_id"]);

    let response = app
        .oneshot(http::empty_request("GET", "/my-orders", Some(&token)))
        .await
        .unwrap();
    let orders: Vec<Value> = http::json_body(response.into_body()).await;
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn test_empty_order_rejected() {
    let (app, _) = setup().await;
    let token = auth::bearer_for("customer");
    let (status, _) = place(&app, &token, &json!({ "items": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_order_visibility() {
    let (app, product) = setup().await;
    let owner = auth::bearer_for("customer");
    let (_, body) = place(&app, &owner, &order_body(&product, None)).await;
    let uri = format!("/{}", body["order"]["_id"].as_str().unwrap());

    for (token, expected) in [
        (owner.clone(), StatusCode::OK),
        (auth::bearer_for("delivery"), StatusCode::OK),
        (auth::bearer_for("customer"), StatusCode::FORBIDDEN),
    ] {
        let response = app
            .clone()
            .oneshot(http::empty_request("GET", &uri, Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
    }

    let response = app
        .oneshot(http::empty_request(
            "GET",
            &format!("/{}", Uuid::now_v7()),
            Some(&owner),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_updates() {
    let (app, product) = setup().await;
    let owner = auth::bearer_for("customer");
    let (_, body) = place(&app, &owner, &order_body(&product, None)).await;
    let uri = format!("/{}/status", body["order"]["_id"].as_str().unwrap());

    let response = app
        .clone()
        .oneshot(http::json_request("PUT", &uri, Some(&owner), &json!({ "status": "confirmed" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let driver = auth::bearer_for("delivery");
    let response = app
        .clone()
        .oneshot(http::json_request("PUT", &uri, Some(&driver), &json!({ "status": "in-transit" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["order"]["status"], "in-transit");

    let response = app
        .oneshot(http::json_request("PUT", &uri, Some(&driver), &json!({ "status": "pending" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel() {
    let (app, product) = setup().await;
    let owner = auth::bearer_for("customer");
    let (_, body) = place(&app, &owner, &order_body(&product, None)).await;
    let id = body["order"]["_id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(http::empty_request("PUT", &format!("/{}/cancel", id), Some(&owner)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["order"]["status"], "cancelled");

    let response = app
        .oneshot(http::empty_request("PUT", &format!("/{}/cancel", id), Some(&owner)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_all_is_staff_only() {
    let (app, product) = setup().await;
    let customer = auth::bearer_for("customer");
    place(&app, &customer, &order_body(&product, None)).await;

    let response = app
        .clone()
        .oneshot(http::empty_request("GET", "/", Some(&customer)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(http::empty_request("GET", "/?status=pending", Some(&auth::bearer_for("admin"))))
        .await
        .unwrap();
    let orders: Vec<Value> = http::json_body(response.into_body()).await;
    assert_eq!(orders.len(), 1);
}
