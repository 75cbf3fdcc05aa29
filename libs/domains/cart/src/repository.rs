use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CartResult;
use crate::models::{Cart, CartItem};

/// Per-user cart storage. A missing cart reads as empty.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn get(&self, user_id: Uuid) -> CartResult<Cart>;

    /// Increment (or insert) a line. Returns `false` and the unchanged cart
    /// when `mutation_id` has already been applied.
    async fn add(
        &self,
        user_id: Uuid,
        item: CartItem,
        mutation_id: Option<String>,
    ) -> CartResult<(bool, Cart)>;

    /// Overwrite a line's quantity; 0 removes it
    async fn set(&self, user_id: Uuid, item: CartItem) -> CartResult<Cart>;

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> CartResult<Cart>;

    async fn clear(&self, user_id: Uuid) -> CartResult<Cart>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCartRepository {
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

impl InMemoryCartRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn get(&self, user_id: Uuid) -> CartResult<Cart> {
        Ok(self
            .carts
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Cart::empty(user_id)))
    }

    async fn add(
        &self,
        user_id: Uuid,
        item: CartItem,
        mutation_id: Option<String>,
    ) -> CartResult<(bool, Cart)> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_insert_with(|| Cart::empty(user_id));
        let applied = cart.add(item, mutation_id.as_deref());
        Ok((applied, cart.clone()))
    }

    async fn set(&self, user_id: Uuid, item: CartItem) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_insert_with(|| Cart::empty(user_id));
        cart.set(item);
        Ok(cart.clone())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_insert_with(|| Cart::empty(user_id));
        cart.remove(product_id);
        Ok(cart.clone())
    }

    async fn clear(&self, user_id: Uuid) -> CartResult<Cart> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id).or_insert_with(|| Cart::empty(user_id));
        cart.clear();
        Ok(cart.clone())
    }
}
