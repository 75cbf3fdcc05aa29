use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::AuthService;
use crate::cart::CartService;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::likes::LikeService;
use crate::models::{AuthSession, Registration};
use crate::orders::{OrderService, OrderSyncReport};
use crate::outbox::{Outbox, SyncReport};
use crate::products::ProductService;
use crate::store::{FileStore, SharedStore};

/// Outcome of [`FreshJa::sync`]
#[derive(Debug, Default)]
pub struct FullSync {
    pub outbox: SyncReport,
    pub orders: OrderSyncReport,
}

impl FullSync {
    pub fn is_complete(&self) -> bool {
        self.outbox.is_complete() && self.orders.error.is_none() && self.orders.remaining == 0
    }
}

/// All client services over one transport and one device store
#[derive(Clone)]
pub struct FreshJa {
    api: ApiClient,
    outbox: Outbox,
    pub auth: AuthService,
    pub products: ProductService,
    pub cart: CartService,
    pub likes: LikeService,
    pub orders: OrderService,
}

impl FreshJa {
    pub fn new(config: &ClientConfig, store: SharedStore) -> ClientResult<Self> {
        let api = ApiClient::new(config, store.clone())?;
        let outbox = Outbox::new(store);

        Ok(Self {
            auth: AuthService::new(api.clone()),
            products: ProductService::new(api.clone()),
            cart: CartService::new(api.clone(), outbox.clone()),
            likes: LikeService::new(api.clone(), outbox.clone()),
            orders: OrderService::new(api.clone()),
            api,
            outbox,
        })
    }

    /// Client keeping its data in files under `config.data_dir`
    pub async fn open(config: &ClientConfig) -> ClientResult<Self> {
        let store = FileStore::open(&config.data_dir).await?;
        Self::new(config, Arc::new(store))
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    /// Sign in, then push everything done while signed out
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<(AuthSession, FullSync)> {
        let session = self.auth.login(email, password).await?;
        let sync = self.sync().await?;
        Ok((session, sync))
    }

    pub async fn register(&self, registration: &Registration) -> ClientResult<(AuthSession, FullSync)> {
        let session = self.auth.register(registration).await?;
        let sync = self.sync().await?;
        Ok((session, sync))
    }

    /// Replay the outbox and local orders. When everything went through,
    /// the local cart and likes are replaced by the server's.
    pub async fn sync(&self) -> ClientResult<FullSync> {
        if !self.api.is_authenticated().await {
            return Err(ClientError::Unauthorized);
        }

        let outbox = self.outbox.sync(&self.api).await?;
        let orders = self.orders.sync_local_orders().await?;
        let report = FullSync { outbox, orders };

        if report.outbox.is_complete() {
            self.cart.refresh().await?;
            self.likes.refresh().await?;
        }
        Ok(report)
    }
}
