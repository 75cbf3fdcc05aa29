//! Client services against an in-process API
//!
//! Covers session handling, signed-out cart/likes with outbox replay, local
//! orders and the offline fallback.

mod common;

use common::{TestServer, customer, offline_client};
use domain_products::ProductRepository;
use freshja_client::store::AUTH_TOKEN_KEY;
use freshja_client::*;
use serde_json::json;
use std::sync::Arc;

async fn client_product(client: &FreshJa, server_product: &domain_products::Product) -> Product {
    client.products.get(server_product.id).await.unwrap()
}

#[tokio::test]
async fn test_register_stores_session() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let session = client.auth.register(&customer()).await.unwrap();

    assert_eq!(session.user.email, "customer@freshja.com");
    assert_eq!(session.user.role, "customer");
    assert_eq!(client.api().token().await.unwrap(), Some(session.token));
    assert_eq!(client.auth.current_user().await.unwrap(), Some(session.user.clone()));
    assert_eq!(client.auth.me().await.unwrap().id, session.user.id);
}

#[tokio::test]
async fn test_farmer_registration_sends_documents() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let mut farmer = Registration {
        email: "farmer@freshja.com".to_string(),
        role: Some("farmer".to_string()),
        ..customer()
    };

    let err = client.auth.register(&farmer).await.unwrap_err();
    assert_eq!(err.status(), Some(400));

    farmer.documents = Some(FarmerDocuments {
        license: "farm_license_001".to_string(),
        trn: "123-456-789".to_string(),
        permit: "farm_permit_001".to_string(),
    });
    let session = client.auth.register(&farmer).await.unwrap();
    assert_eq!(session.user.role, "farmer");
}

#[tokio::test]
async fn test_unauthorized_response_clears_session() {
    let server = TestServer::spawn().await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();

    let store = client.api().store();
    store.set_json(AUTH_TOKEN_KEY, &"not-a-jwt").await.unwrap();

    let err = client.auth.me().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!client.auth.is_authenticated().await);
    assert!(client.auth.current_user().await.unwrap().is_none());
}

#[tokio::test]
async fn test_bad_credentials_surface_api_error() {
    let server = TestServer::spawn().await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let err = client
        .auth
        .login("customer@freshja.com", "wrong-password")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(!client.auth.is_authenticated().await);
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let server = TestServer::spawn().await;
    let err = server
        .client()
        .auth
        .forgot_password("nobody@freshja.com")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_product_browsing() {
    let server = TestServer::spawn().await;
    server.product("Fresh Tomatoes", 300.0).await;
    server.product("Callaloo", 150.0).await;
    let client = server.client();

    let page = client.products.list(&ProductQuery::default()).await.unwrap();
    assert_eq!(page.total, 2);

    let results = client.products.search("callaloo").await.unwrap();
    assert_eq!(results.products.len(), 1);
    assert_eq!(results.products[0].name, "Callaloo");

    let err = client.products.search("  ").await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_signed_out_adds_merge_and_sync_once() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let product = client_product(&client, &ackee).await;
    client.cart.add(&product, 1).await.unwrap();
    let items = client.cart.add(&product, 1).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(client.outbox().len().await, 1);

    let (_, sync) = client
        .login("customer@freshja.com", "password123")
        .await
        .unwrap();
    assert!(sync.is_complete());
    assert_eq!(sync.outbox.applied, 1);
    assert!(client.outbox().is_empty().await);

    let items = client.cart.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ackee.id);
    assert_eq!(items[0].quantity, 2);

    // Nothing left to replay
    let again = client.sync().await.unwrap();
    assert_eq!(again.outbox.applied, 0);
    assert_eq!(client.cart.items().await.unwrap()[0].quantity, 2);
}

#[tokio::test]
async fn test_replayed_cart_add_is_not_double_applied() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();

    // The request reached the server but the client never saw the answer
    let _: CartMutation = client
        .api()
        .post(
            "/cart",
            &json!({ "productId": ackee.id, "quantity": 1, "mutationId": "m-1" }),
        )
        .await
        .unwrap();
    client
        .outbox()
        .push_attempted(Mutation::CartAdd {
            product_id: ackee.id,
            quantity: 1,
            mutation_id: "m-1".to_string(),
        })
        .await
        .unwrap();

    let report = client.sync().await.unwrap();

    assert_eq!(report.outbox.applied, 1);
    let items = client.cart.items().await.unwrap();
    assert_eq!(items[0].quantity, 1);
}

#[tokio::test]
async fn test_like_replay_keeps_product_liked() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    let product = client_product(&client, &ackee).await;

    assert!(client.likes.set(&product, true).await.unwrap());
    client
        .outbox()
        .push(Mutation::LikeSet {
            product_id: ackee.id,
            liked: true,
        })
        .await
        .unwrap();

    client.sync().await.unwrap();
    client.sync().await.unwrap();

    let likes = client.likes.list().await.unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].id, ackee.id);
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    let product = client_product(&client, &ackee).await;

    assert!(client.likes.toggle(&product).await.unwrap());
    assert!(client.likes.is_liked(ackee.id).await);
    assert!(!client.likes.toggle(&product).await.unwrap());
    assert!(client.likes.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_signed_out_likes_sync_as_final_state() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let callaloo = server.product("Callaloo", 150.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let ackee = client_product(&client, &ackee).await;
    let callaloo = client_product(&client, &callaloo).await;
    client.likes.toggle(&ackee).await.unwrap();
    client.likes.toggle(&callaloo).await.unwrap();
    client.likes.toggle(&callaloo).await.unwrap();

    assert_eq!(client.outbox().len().await, 2);

    client
        .login("customer@freshja.com", "password123")
        .await
        .unwrap();

    let likes = client.likes.list().await.unwrap();
    assert_eq!(likes.len(), 1);
    assert_eq!(likes[0].id, ackee.id);
}

#[tokio::test]
async fn test_rejected_entry_is_dropped_and_replay_continues() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();

    let outbox = client.outbox();
    outbox
        .push(Mutation::LikeSet {
            product_id: ackee.id,
            liked: true,
        })
        .await
        .unwrap();
    outbox
        .push(Mutation::cart_add(uuid::Uuid::now_v7(), 1))
        .await
        .unwrap();
    outbox.push(Mutation::cart_add(ackee.id, 3)).await.unwrap();

    let report = outbox.sync(client.api()).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.applied, 2);
    assert_eq!(report.remaining, 0);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].1.status(), Some(404));
    assert!(matches!(
        report.rejected[0].0.mutation,
        Mutation::CartAdd { quantity: 1, .. }
    ));
    assert!(outbox.is_empty().await);

    let items = client.cart.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ackee.id);
    assert_eq!(items[0].quantity, 3);
}

#[tokio::test]
async fn test_like_on_deleted_product_does_not_block_cart() {
    let server = TestServer::spawn().await;
    let gone = server.product("Breadfruit", 200.0).await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let liked = client_product(&client, &gone).await;
    let product = client_product(&client, &ackee).await;
    client.likes.set(&liked, true).await.unwrap();
    client.cart.add(&product, 2).await.unwrap();
    assert_eq!(client.outbox().len().await, 2);

    // The farmer removes the listing before the customer signs back in
    let seller = gone.seller_id.unwrap();
    assert!(server.products.delete_owned(gone.id, seller).await.unwrap());

    let (_, sync) = client
        .login("customer@freshja.com", "password123")
        .await
        .unwrap();

    assert!(sync.is_complete());
    assert_eq!(sync.outbox.applied, 1);
    assert_eq!(sync.outbox.rejected.len(), 1);
    assert_eq!(sync.outbox.rejected[0].1.status(), Some(404));
    assert!(client.outbox().is_empty().await);

    let items = client.cart.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, ackee.id);
    assert_eq!(items[0].quantity, 2);
    assert!(client.likes.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_replay_keeps_entries() {
    let store = Arc::new(MemoryStore::new());
    store
        .set_json(AUTH_TOKEN_KEY, &"token-from-earlier-login")
        .await
        .unwrap();
    let client = offline_client(store).await;

    let outbox = client.outbox();
    outbox
        .push(Mutation::cart_add(uuid::Uuid::now_v7(), 1))
        .await
        .unwrap();
    outbox
        .push(Mutation::cart_add(uuid::Uuid::now_v7(), 2))
        .await
        .unwrap();

    let report = outbox.sync(client.api()).await.unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.applied, 0);
    assert!(report.rejected.is_empty());
    assert_eq!(report.remaining, 2);
    assert!(report.error.as_ref().is_some_and(ClientError::is_offline));

    let entries = outbox.entries().await;
    assert_eq!(entries.len(), 2);
    assert!(entries[0].attempted);
    assert!(!entries[1].attempted);
}

#[tokio::test]
async fn test_rejected_local_order_is_dropped() {
    let server = TestServer::spawn().await;
    let gone = server.product("Breadfruit", 200.0).await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let gone_product = client_product(&client, &gone).await;
    let product = client_product(&client, &ackee).await;
    let stale = client
        .orders
        .create(&Checkout {
            items: vec![CartLine::from_product(&gone_product, 1)],
            ..Default::default()
        })
        .await
        .unwrap();
    let kept = client
        .orders
        .create(&Checkout {
            items: vec![CartLine::from_product(&product, 2)],
            ..Default::default()
        })
        .await
        .unwrap();
    assert_ne!(stale.order.id, kept.order.id);

    let seller = gone.seller_id.unwrap();
    assert!(server.products.delete_owned(gone.id, seller).await.unwrap());

    let (_, sync) = client
        .login("customer@freshja.com", "password123")
        .await
        .unwrap();

    assert!(sync.is_complete());
    assert_eq!(sync.orders.synced, 1);
    assert_eq!(sync.orders.rejected.len(), 1);
    assert_eq!(sync.orders.rejected[0].0.id, stale.order.id);
    assert!(client.orders.local_orders().await.is_empty());

    let orders = client.orders.my_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total, kept.order.total);
}

#[tokio::test]
async fn test_local_order_then_sync() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();
    client.auth.logout().await.unwrap();

    let product = client_product(&client, &ackee).await;
    let items = client.cart.add(&product, 4).await.unwrap();
    let placed = client
        .orders
        .create(&Checkout {
            items,
            payment_method: Some("cash".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(placed.order.id.starts_with("local_"));
    assert_eq!(placed.order.status, "Confirmed");
    assert_eq!(placed.order.total, 1350.0);
    assert_eq!(client.orders.get(&placed.order.id).await.unwrap(), placed.order);

    let (_, sync) = client
        .login("customer@freshja.com", "password123")
        .await
        .unwrap();
    assert_eq!(sync.orders.synced, 1);
    assert!(client.orders.local_orders().await.is_empty());

    let orders = client.orders.my_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(!orders[0].is_local());
    assert_eq!(orders[0].status, "pending");
    assert_eq!(orders[0].total, 1350.0);
}

#[tokio::test]
async fn test_signed_in_order_and_cancel() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let client = server.client();
    client.auth.register(&customer()).await.unwrap();

    let product = client_product(&client, &ackee).await;
    let placed = client
        .orders
        .create(&Checkout {
            items: vec![CartLine::from_product(&product, 2)],
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(placed.created);
    assert!(!placed.order.is_local());

    let cancelled = client.orders.cancel(&placed.order.id).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");

    let err = client.orders.cancel(&placed.order.id).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_offline_cart_add_is_queued() {
    let server = TestServer::spawn().await;
    let ackee = server.product("Ackee", 250.0).await;
    let online = server.client();
    let product = client_product(&online, &ackee).await;

    let store = Arc::new(MemoryStore::new());
    store
        .set_json(AUTH_TOKEN_KEY, &"token-from-earlier-login")
        .await
        .unwrap();
    let client = offline_client(store).await;

    let items = client.cart.add(&product, 1).await.unwrap();

    assert_eq!(items.len(), 1);
    let entries = client.outbox().entries().await;
    assert_eq!(entries.len(), 1);
    assert!(entries[0].attempted);
    assert!(client.auth.is_authenticated().await);
}
