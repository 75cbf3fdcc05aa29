//! Cart that works signed in, signed out and offline
//!
//! Signed in and reachable, every call goes to `/cart` and the local list
//! mirrors the server cart afterwards. Otherwise the local list is changed
//! and the mutation is queued in the [`Outbox`].

use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::{CartLine, CartMutation, Product, ServerCart};
use crate::outbox::{Mutation, Outbox};
use crate::store::{CART_KEY, LocalStoreExt};

#[derive(Clone)]
pub struct CartService {
    api: ApiClient,
    outbox: Outbox,
}

impl CartService {
    pub fn new(api: ApiClient, outbox: Outbox) -> Self {
        Self { api, outbox }
    }

    pub async fn local_items(&self) -> Vec<CartLine> {
        self.api.store().get_list(CART_KEY).await
    }

    async fn save_local(&self, items: &[CartLine]) -> ClientResult<()> {
        self.api.store().set_json(CART_KEY, &items).await
    }

    async fn mirror(&self, cart: ServerCart) -> ClientResult<Vec<CartLine>> {
        self.save_local(&cart.items).await?;
        Ok(cart.items)
    }

    /// Server cart when signed in and reachable, local list otherwise
    pub async fn items(&self) -> ClientResult<Vec<CartLine>> {
        if self.api.is_authenticated().await {
            match self.api.get::<ServerCart>("/cart").await {
                Ok(cart) => return self.mirror(cart).await,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Cart unavailable, using local copy");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(self.local_items().await)
    }

    pub async fn item_count(&self) -> u32 {
        self.local_items().await.iter().map(|l| l.quantity).sum()
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add(&self, product: &Product, quantity: u32) -> ClientResult<Vec<CartLine>> {
        if quantity == 0 {
            return Err(ClientError::Api {
                status: 400,
                message: "Quantity must be at least 1".to_string(),
            });
        }

        let mutation_id = Uuid::now_v7().to_string();
        let mutation = Mutation::CartAdd {
            product_id: product.id,
            quantity,
            mutation_id: mutation_id.clone(),
        };
        if self.api.is_authenticated().await {
            let body = json!({
                "productId": product.id,
                "quantity": quantity,
                "mutationId": mutation_id,
            });
            match self.api.post::<_, CartMutation>("/cart", &body).await {
                Ok(response) => return self.mirror(response.cart).await,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing cart add");
                    let items = self.add_local(product, quantity).await?;
                    self.outbox.push_attempted(mutation).await?;
                    return Ok(items);
                }
                Err(e) => return Err(e),
            }
        }

        let items = self.add_local(product, quantity).await?;
        self.outbox.push(mutation).await?;
        Ok(items)
    }

    async fn add_local(&self, product: &Product, quantity: u32) -> ClientResult<Vec<CartLine>> {
        let mut items = self.local_items().await;
        match items.iter_mut().find(|line| line.id == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => items.push(CartLine::from_product(product, quantity)),
        }
        self.save_local(&items).await?;
        Ok(items)
    }

    /// Set a line's quantity; zero removes the line
    #[instrument(skip(self))]
    pub async fn update(&self, product_id: Uuid, quantity: u32) -> ClientResult<Vec<CartLine>> {
        if self.api.is_authenticated().await {
            let body = json!({ "productId": product_id, "quantity": quantity });
            match self.api.put::<_, ServerCart>("/cart", &body).await {
                Ok(cart) => return self.mirror(cart).await,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing cart update");
                }
                Err(e) => return Err(e),
            }
        }

        let mut items = self.local_items().await;
        if quantity == 0 {
            items.retain(|line| line.id != product_id);
        } else if let Some(line) = items.iter_mut().find(|line| line.id == product_id) {
            line.quantity = quantity;
        }
        self.save_local(&items).await?;
        self.outbox
            .push(Mutation::CartSet {
                product_id,
                quantity,
            })
            .await?;
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, product_id: Uuid) -> ClientResult<Vec<CartLine>> {
        if self.api.is_authenticated().await {
            match self
                .api
                .delete::<ServerCart>(&format!("/cart/{}", product_id))
                .await
            {
                Ok(cart) => return self.mirror(cart).await,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing cart removal");
                }
                Err(e) => return Err(e),
            }
        }

        let mut items = self.local_items().await;
        items.retain(|line| line.id != product_id);
        self.save_local(&items).await?;
        self.outbox.push(Mutation::CartRemove { product_id }).await?;
        Ok(items)
    }

    pub async fn clear(&self) -> ClientResult<()> {
        if self.api.is_authenticated().await {
            match self.api.delete::<ServerCart>("/cart").await {
                Ok(cart) => {
                    self.mirror(cart).await?;
                    return Ok(());
                }
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing cart clear");
                }
                Err(e) => return Err(e),
            }
        }

        for line in self.local_items().await {
            self.outbox
                .push(Mutation::CartRemove {
                    product_id: line.id,
                })
                .await?;
        }
        self.api.store().remove(CART_KEY).await
    }

    /// Replace the local list with the server cart
    pub async fn refresh(&self) -> ClientResult<Vec<CartLine>> {
        let cart: ServerCart = self.api.get("/cart").await?;
        self.mirror(cart).await
    }
}
