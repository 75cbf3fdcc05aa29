//! In-process FreshJA API for client tests
//!
//! Serves the domain routers over in-memory repositories on an ephemeral
//! localhost port.

use axum::Router;
use domain_cart::{InMemoryCartRepository, cart_router};
use domain_catalog::{InMemoryCatalogRepository, StorefrontService, storefront_router};
use domain_orders::{InMemoryOrderRepository, orders_router};
use domain_products::{CreateProduct, InMemoryProductRepository, Product, ProductRepository, Seller};
use domain_users::{
    InMemoryResetCodeStore, InMemoryUserRepository, LikeService, ResetService, UserService,
    auth_router, likes_router, reset_router,
};
use email::{Mailer, MockSmtpProvider};
use freshja_client::{ClientConfig, FreshJa, MemoryStore, Registration};
use std::sync::Arc;
use tokio::net::TcpListener;
use uuid::Uuid;

pub struct TestServer {
    pub base_url: String,
    pub products: Arc<InMemoryProductRepository>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let jwt = test_utils::auth::jwt_auth();
        let users = Arc::new(InMemoryUserRepository::new());
        let products = Arc::new(InMemoryProductRepository::new());
        let mailer = Mailer::new(Arc::new(MockSmtpProvider::new())).unwrap();

        let api = Router::new()
            .nest(
                "/auth",
                auth_router(UserService::from_shared(
                    users.clone(),
                    jwt.clone(),
                    mailer.clone(),
                )),
            )
            .nest(
                "/likes",
                likes_router(LikeService::new(users.clone(), products.clone()), jwt.clone()),
            )
            .nest(
                "/reset",
                reset_router(ResetService::new(
                    users.clone(),
                    Arc::new(InMemoryResetCodeStore::new()),
                    mailer,
                )),
            )
            .nest(
                "/products",
                domain_products::handlers::router(
                    domain_products::ProductService::from_shared(products.clone()),
                    jwt.clone(),
                ),
            )
            .nest(
                "/user",
                storefront_router(StorefrontService::new(
                    Arc::new(InMemoryCatalogRepository::new()),
                    products.clone(),
                )),
            )
            .nest(
                "/cart",
                cart_router(
                    domain_cart::CartService::new(
                        Arc::new(InMemoryCartRepository::new()),
                        products.clone(),
                    ),
                    jwt.clone(),
                ),
            )
            .nest(
                "/orders",
                orders_router(
                    domain_orders::OrderService::new(
                        Arc::new(InMemoryOrderRepository::new()),
                        products.clone(),
                    ),
                    jwt,
                ),
            );
        let app = Router::new().nest("/api", api);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            products,
        }
    }

    pub async fn product(&self, name: &str, price: f64) -> Product {
        self.products
            .create(Product::new(
                Seller {
                    id: Uuid::now_v7(),
                    name: "John Brown",
                },
                CreateProduct {
                    name: name.to_string(),
                    title: name.to_string(),
                    category: "vegetables".to_string(),
                    price,
                    ..Default::default()
                },
            ))
            .await
            .unwrap()
    }

    /// Fresh client with its own in-memory device store
    pub fn client(&self) -> FreshJa {
        FreshJa::new(
            &ClientConfig::new(self.base_url.clone()),
            Arc::new(MemoryStore::new()),
        )
        .unwrap()
    }
}

/// Client whose server is not reachable
pub async fn offline_client(store: Arc<MemoryStore>) -> FreshJa {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    FreshJa::new(&ClientConfig::new(format!("http://{}/api", addr)), store).unwrap()
}

pub fn customer() -> Registration {
    Registration {
        full_name: "Sarah Reid".to_string(),
        email: "customer@freshja.com".to_string(),
        phone: "876-555-0002".to_string(),
        password: "password123".to_string(),
        role: None,
        documents: None,
    }
}
