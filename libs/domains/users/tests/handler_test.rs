//! Handler tests for auth, likes and password reset

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use domain_products::{CreateProduct, InMemoryProductRepository, Product, ProductRepository, Seller};
use domain_users::reset::ResetEntry;
use domain_users::*;
use email::{Mailer, MockSmtpProvider};
use serde_json::{Value, json};
use std::sync::Arc;
use test_utils::{auth, http};
use tower::ServiceExt;
use uuid::Uuid;

fn mailer() -> Mailer {
    Mailer::new(Arc::new(MockSmtpProvider::new())).unwrap()
}

fn auth_app(repo: Arc<InMemoryUserRepository>) -> axum::Router {
    auth_router(UserService::from_shared(repo, auth::jwt_auth(), mailer()))
}

fn customer() -> Value {
    json!({
        "fullName": "Sarah Reid",
        "email": "customer@freshja.com",
        "phone": "876-555-0002",
        "password": "password123"
    })
}

async fn register(repo: Arc<InMemoryUserRepository>) -> AuthResponse {
    let response = auth_app(repo)
        .oneshot(http::json_request("POST", "/register", None, &customer()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    http::json_body(response.into_body()).await
}

#[tokio::test]
async fn test_register_returns_token_and_profile() {
    let repo = Arc::new(InMemoryUserRepository::new());
    let body = register(repo).await;

    assert!(!body.token.is_empty());
    assert_eq!(body.user.email, "customer@freshja.com");
    assert_eq!(body.user.role, Role::Customer);
}

#[tokio::test]
async fn test_register_duplicate_email_returns_400() {
    let repo = Arc::new(InMemoryUserRepository::new());
    register(repo.clone()).await;

    let mut again = customer();
    again["email"] = json!("CUSTOMER@freshja.com");
    let response = auth_app(repo.clone())
        .oneshot(http::json_request("POST", "/register", None, &again))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "User already exists");
    assert!(repo.email_exists("customer@freshja.com").await.unwrap());
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_register_short_password_returns_400() {
    let mut input = customer();
    input["password"] = json!("123");
    let response = auth_app(Arc::new(InMemoryUserRepository::new()))
        .oneshot(http::json_request("POST", "/register", None, &input))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_and_me() {
    let repo = Arc::new(InMemoryUserRepository::new());
    register(repo.clone()).await;

    let response = auth_app(repo.clone())
        .oneshot(http::json_request(
            "POST",
            "/login",
            None,
            &json!({ "email": "customer@freshja.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let login: AuthResponse = http::json_body(response.into_body()).await;

    let response = auth_app(repo)
        .oneshot(http::empty_request("GET", "/me", Some(&login.token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["user"]["fullName"], "Sarah Reid");
}

#[tokio::test]
async fn test_login_wrong_password_returns_400() {
    let repo = Arc::new(InMemoryUserRepository::new());
    register(repo.clone()).await;

    let response = auth_app(repo)
        .oneshot(http::json_request(
            "POST",
            "/login",
            None,
            &json!({ "email": "customer@freshja.com", "password": "wrong-password" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_without_token_returns_401() {
    let response = auth_app(Arc::new(InMemoryUserRepository::new()))
        .oneshot(http::empty_request("GET", "/me", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_for_deleted_user_returns_404() {
    let token = auth::bearer_for("customer");
    let response = auth_app(Arc::new(InMemoryUserRepository::new()))
        .oneshot(http::empty_request("GET", "/me", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

struct LikesFixture {
    app: axum::Router,
    token: String,
    product_id: Uuid,
}

async fn likes_fixture() -> LikesFixture {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = register(users.clone()).await.user;

    let products = Arc::new(InMemoryProductRepository::new());
    let product = products
        .create(Product::new(
            Seller {
                id: Uuid::now_v7(),
                name: "Marcus Brown",
            },
            CreateProduct {
                name: "Ackee".to_string(),
                title: "Ackee".to_string(),
                category: "fruits".to_string(),
                price: 800.0,
                ..Default::default()
            },
        ))
        .await
        .unwrap();

    LikesFixture {
        app: likes_router(LikeService::new(users, products), auth::jwt_auth()),
        token: auth::token(user.id, &user.full_name, "customer"),
        product_id: product.id,
    }
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let f = likes_fixture().await;
    let body = json!({ "productId": f.product_id });

    let response = f
        .app
        .clone()
        .oneshot(http::json_request("POST", "/toggle", Some(&f.token), &body))
        .await
        .unwrap();
    let first: Value = http::json_body(response.into_body()).await;
    assert_eq!(first["liked"], true);
    assert_eq!(first["likedProducts"].as_array().unwrap().len(), 1);

    let response = f
        .app
        .clone()
        .oneshot(http::json_request("POST", "/toggle", Some(&f.token), &body))
        .await
        .unwrap();
    let second: Value = http::json_body(response.into_body()).await;
    assert_eq!(second["liked"], false);

    let response = f
        .app
        .oneshot(http::empty_request("GET", "/", Some(&f.token)))
        .await
        .unwrap();
    let listed: Value = http::json_body(response.into_body()).await;
    assert!(listed["productIds"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_set_like_replay_stays_liked() {
    let f = likes_fixture().await;
    let body = json!({ "productId": f.product_id, "liked": true });

    for _ in 0..2 {
        let response = f
            .app
            .clone()
            .oneshot(http::json_request("POST", "/", Some(&f.token), &body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let state: Value = http::json_body(response.into_body()).await;
        assert_eq!(state["liked"], true);
        assert_eq!(state["likedProducts"].as_array().unwrap().len(), 1);
    }

    let uri = format!("/{}", f.product_id);
    let response = f
        .app
        .oneshot(http::empty_request("DELETE", &uri, Some(&f.token)))
        .await
        .unwrap();
    let state: Value = http::json_body(response.into_body()).await;
    assert_eq!(state["liked"], false);
}

#[tokio::test]
async fn test_like_unknown_product_returns_404() {
    let f = likes_fixture().await;
    let response = f
        .app
        .oneshot(http::json_request(
            "POST",
            "/toggle",
            Some(&f.token),
            &json!({ "productId": Uuid::now_v7() }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_likes_without_token_returns_401() {
    let f = likes_fixture().await;
    let response = f
        .app
        .oneshot(http::empty_request("GET", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

fn reset_app(
    users: Arc<InMemoryUserRepository>,
    store: Arc<InMemoryResetCodeStore>,
) -> axum::Router {
    reset_router(ResetService::new(users, store, mailer()))
}

#[tokio::test]
async fn test_forgot_unknown_email_returns_404() {
    let response = reset_app(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryResetCodeStore::new()),
    )
    .oneshot(http::json_request(
        "POST",
        "/forgot",
        None,
        &json!({ "email": "nobody@freshja.com" }),
    ))
    .await
    .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_expired_code_rejected_by_verify() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = register(users.clone()).await.user;
    let store = Arc::new(InMemoryResetCodeStore::new());
    store
        .issue(
            user.id,
            ResetEntry::new("123456", Utc::now() - Duration::minutes(30)),
        )
        .await;

    let response = reset_app(users, store.clone())
        .oneshot(http::json_request(
            "POST",
            "/verify-code",
            None,
            &json!({ "userId": user.id, "code": "123456" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["message"], "Code has expired");
    assert!(store.get(user.id).await.is_none());
}

#[tokio::test]
async fn test_forgot_verify_reset_then_login() {
    let users = Arc::new(InMemoryUserRepository::new());
    let user = register(users.clone()).await.user;
    let store = Arc::new(InMemoryResetCodeStore::new());
    let app = reset_app(users.clone(), store.clone());

    let response = app
        .clone()
        .oneshot(http::json_request(
            "POST",
            "/forgot",
            None,
            &json!({ "email": "customer@freshja.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = http::json_body(response.into_body()).await;
    assert_eq!(body["userId"], user.id.to_string());

    let code = store.get(user.id).await.unwrap().code;
    let response = app
        .clone()
        .oneshot(http::json_request(
            "POST",
            "/verify-code",
            None,
            &json!({ "userId": user.id, "code": code }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(http::json_request(
            "POST",
            "/reset",
            None,
            &json!({ "userId": user.id, "code": code, "newPassword": "brand-new-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = auth_app(users)
        .oneshot(http::json_request(
            "POST",
            "/login",
            None,
            &json!({ "email": "customer@freshja.com", "password": "brand-new-pass" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
