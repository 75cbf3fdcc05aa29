//! Handler tests for the Products domain
//!
//! Drive the products router with `oneshot` against the in-memory repository:
//! status codes, role and ownership checks, and response shapes.

use axum::http::StatusCode;
use domain_products::*;
use serde_json::{Value, json};
use test_utils::{auth, http};
use tower::ServiceExt;
use uuid::Uuid;

fn app(repo: InMemoryProductRepository) -> axum::Router {
    handlers::router(ProductService::new(repo), auth::jwt_auth())
}

fn tomato() -> Value {
    json!({
        "name": "Fresh Tomatoes",
        "title": "Organic Tomatoes",
        "category": "vegetables",
        "price": 300,
        "discountPrice": 250,
        "images": ["tomato.jpg"],
        "stock": 50,
        "isOrganic": true
    })
}

async fn seed(repo: &InMemoryProductRepository, seller_id: Uuid, name: &str, category: &str) -> Product {
    repo.create(Product::new(
        Seller {
            id: seller_id,
            name: "John Brown",
        },
        CreateProduct {
            name: name.to_string(),
            title: name.to_string(),
            category: category.to_string(),
            price: 100.0,
            ..Default::default()
        },
    ))
    .await
    .unwrap()
}

#[tokio::test]
async fn test_create_without_token_returns_401() {
    let response = app(InMemoryProductRepository::new())
        .oneshot(http::json_request("POST", "/", None, &tomato()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_as_customer_returns_403() {
    let token = auth::bearer_for("customer");
    let response = app(InMemoryProductRepository::new())
        .oneshot(http::json_request("POST", "/", Some(&token), &tomato()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "Only farmers can create products");
}

#[tokio::test]
async fn test_create_as_farmer_sets_seller() {
    let farmer_id = Uuid::now_v7();
    let token = auth::token(farmer_id, "John Brown", "farmer");

    let response = app(InMemoryProductRepository::new())
        .oneshot(http::json_request("POST", "/", Some(&token), &tomato()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: ProductEnvelope = http::json_body(response.into_body()).await;
    assert_eq!(body.product.seller, "John Brown");
    assert_eq!(body.product.seller_id, Some(farmer_id));
    assert_eq!(body.product.unit, "kg");
    assert!(body.product.is_organic);
}

#[tokio::test]
async fn test_create_validates_input() {
    let token = auth::bearer_for("farmer");
    let response = app(InMemoryProductRepository::new())
        .oneshot(http::json_request(
            "POST",
            "/",
            Some(&token),
            &json!({ "name": "", "title": "x", "category": "fruits", "price": 10 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_filters_and_paginates() {
    let repo = InMemoryProductRepository::new();
    let seller = Uuid::now_v7();
    seed(&repo, seller, "Sweet Bananas", "fruits").await;
    seed(&repo, seller, "Ripe Mangoes", "fruits").await;
    seed(&repo, seller, "Scotch Bonnet", "vegetables").await;

    let response = app(repo.clone())
        .oneshot(http::empty_request("GET", "/?category=fruits&limit=1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: ProductPage = http::json_body(response.into_body()).await;
    assert_eq!(page.total, 2);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.current_page, 1);
    assert_eq!(page.products.len(), 1);
    assert_eq!(page.products[0].name, "Ripe Mangoes");

    let response = app(repo.clone())
        .oneshot(http::empty_request("GET", "/?category=all&search=SCOTCH", None))
        .await
        .unwrap();
    let page: ProductPage = http::json_body(response.into_body()).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.products[0].name, "Scotch Bonnet");
}

#[tokio::test]
async fn test_list_far_page_is_empty() {
    let repo = InMemoryProductRepository::new();
    seed(&repo, Uuid::now_v7(), "Sweet Bananas", "fruits").await;

    let response = app(repo)
        .oneshot(http::empty_request("GET", "/?page=18446744073709551615", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page: ProductPage = http::json_body(response.into_body()).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.current_page, u64::MAX);
    assert!(page.products.is_empty());
}

#[tokio::test]
async fn test_get_product_returns_404_for_missing() {
    let response = app(InMemoryProductRepository::new())
        .oneshot(http::empty_request("GET", &format!("/{}", Uuid::now_v7()), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_product_rejects_bad_uuid() {
    let response = app(InMemoryProductRepository::new())
        .oneshot(http::empty_request("GET", "/not-a-uuid", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_by_other_farmer_is_404() {
    let repo = InMemoryProductRepository::new();
    let product = seed(&repo, Uuid::now_v7(), "Breadfruit", "fruits").await;
    let token = auth::bearer_for("farmer");

    let response = app(repo)
        .oneshot(http::json_request(
            "PUT",
            &format!("/{}", product.id),
            Some(&token),
            &json!({ "price": 1 }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "Product not found or unauthorized");
}

#[tokio::test]
async fn test_owner_can_update_and_delete() {
    let repo = InMemoryProductRepository::new();
    let owner = Uuid::now_v7();
    let product = seed(&repo, owner, "Breadfruit", "fruits").await;
    let token = auth::token(owner, "John Brown", "farmer");

    let response = app(repo.clone())
        .oneshot(http::json_request(
            "PUT",
            &format!("/{}", product.id),
            Some(&token),
            &json!({ "price": 120, "stock": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: ProductEnvelope = http::json_body(response.into_body()).await;
    assert_eq!(body.product.price, 120.0);
    assert_eq!(body.product.stock, 9);

    let response = app(repo.clone())
        .oneshot(http::empty_request(
            "DELETE",
            &format!("/{}", product.id),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(repo.get_by_id(product.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_my_products_only_returns_callers_products() {
    let repo = InMemoryProductRepository::new();
    let me = Uuid::now_v7();
    seed(&repo, me, "Ackee", "fruits").await;
    seed(&repo, Uuid::now_v7(), "Soursop", "fruits").await;
    let token = auth::token(me, "John Brown", "farmer");

    let response = app(repo)
        .oneshot(http::empty_request("GET", "/my-products", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page: ProductPage = http::json_body(response.into_body()).await;
    assert_eq!(page.total, 1);
    assert_eq!(page.products[0].name, "Ackee");
}
