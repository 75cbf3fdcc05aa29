//! Shared application state.
//!
//! Repositories are created once and shared, so the auth, likes and reset
//! routers all see the same users collection handle.

use axum_helpers::JwtAuth;
use domain_cart::MongoCartRepository;
use domain_catalog::MongoCatalogRepository;
use domain_orders::MongoOrderRepository;
use domain_products::MongoProductRepository;
use domain_users::{InMemoryResetCodeStore, MongoUserRepository};
use email::Mailer;
use mongodb::{Client, Database};
use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<MongoUserRepository>,
    pub products: Arc<MongoProductRepository>,
    pub catalog: Arc<MongoCatalogRepository>,
    pub carts: Arc<MongoCartRepository>,
    pub orders: Arc<MongoOrderRepository>,
}

impl Repositories {
    pub fn new(db: &Database) -> Self {
        Self {
            users: Arc::new(MongoUserRepository::new(db)),
            products: Arc::new(MongoProductRepository::new(db)),
            catalog: Arc::new(MongoCatalogRepository::new(db)),
            carts: Arc::new(MongoCartRepository::new(db)),
            orders: Arc::new(MongoOrderRepository::new(db)),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Cloneable handle over the shared connection pool
    pub mongo_client: Client,
    pub repos: Repositories,
    pub auth: JwtAuth,
    pub mailer: Mailer,
    pub reset_codes: Arc<InMemoryResetCodeStore>,
}
