//! FreshJA API client
//!
//! Offline-first client for the FreshJA marketplace API. Device data (session,
//! cart, likes, local orders) lives in a [`LocalStore`]; cart and like changes
//! made while signed out or offline are queued in the [`Outbox`] and replayed
//! idempotently by [`FreshJa::sync`].
//!
//! ```no_run
//! use freshja_client::{ClientConfig, FreshJa};
//!
//! # async fn run() -> freshja_client::ClientResult<()> {
//! let client = FreshJa::open(&ClientConfig::default()).await?;
//! let page = client.products.list(&Default::default()).await?;
//! if let Some(product) = page.products.first() {
//!     client.cart.add(product, 1).await?;
//! }
//! client.login("customer@freshja.com", "password123").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod client;
pub mod config;
pub mod error;
pub mod likes;
pub mod models;
pub mod orders;
pub mod outbox;
pub mod products;
pub mod store;

pub use api::ApiClient;
pub use auth::AuthService;
pub use cart::CartService;
pub use client::{FreshJa, FullSync};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use likes::LikeService;
pub use models::*;
pub use orders::{OrderService, OrderSyncReport, PlacedOrder};
pub use outbox::{Entry, Mutation, Outbox, SyncReport};
pub use products::ProductService;
pub use store::{FileStore, LocalStore, LocalStoreExt, MemoryStore, SharedStore};
