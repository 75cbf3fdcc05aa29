use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::error::ClientResult;
use crate::models::{LikeState, LikedProduct, Product, ServerLikes, ToggledLike};
use crate::outbox::{Mutation, Outbox};
use crate::store::{LIKES_KEY, LocalStoreExt};

/// Liked products, server backed when signed in.
///
/// Offline and signed-out changes are queued as absolute "liked = true/false"
/// entries, so a replay can never flip a like back.
#[derive(Clone)]
pub struct LikeService {
    api: ApiClient,
    outbox: Outbox,
}

impl LikeService {
    pub fn new(api: ApiClient, outbox: Outbox) -> Self {
        Self { api, outbox }
    }

    pub async fn local(&self) -> Vec<LikedProduct> {
        self.api.store().get_list(LIKES_KEY).await
    }

    async fn save_local(&self, likes: &[LikedProduct]) -> ClientResult<()> {
        self.api.store().set_json(LIKES_KEY, &likes).await
    }

    async fn mirror(&self, products: &[Product]) -> ClientResult<Vec<LikedProduct>> {
        let likes: Vec<LikedProduct> = products.iter().map(LikedProduct::from).collect();
        self.save_local(&likes).await?;
        Ok(likes)
    }

    pub async fn list(&self) -> ClientResult<Vec<LikedProduct>> {
        if self.api.is_authenticated().await {
            match self.api.get::<ServerLikes>("/likes").await {
                Ok(server) => return self.mirror(&server.products).await,
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Likes unavailable, using local copy");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(self.local().await)
    }

    pub async fn is_liked(&self, product_id: Uuid) -> bool {
        self.local().await.iter().any(|p| p.id == product_id)
    }

    /// Flip the like state; returns the new state
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn toggle(&self, product: &Product) -> ClientResult<bool> {
        if self.api.is_authenticated().await {
            let body = json!({ "productId": product.id });
            match self.api.post::<_, ToggledLike>("/likes/toggle", &body).await {
                Ok(toggled) => {
                    self.mirror(&toggled.liked_products).await?;
                    return Ok(toggled.liked);
                }
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing like toggle");
                }
                Err(e) => return Err(e),
            }
        }

        let liked = !self.is_liked(product.id).await;
        self.set_local(product, liked).await?;
        Ok(liked)
    }

    /// Set the like state explicitly
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn set(&self, product: &Product, liked: bool) -> ClientResult<bool> {
        if self.api.is_authenticated().await {
            let body = json!({ "productId": product.id, "liked": liked });
            match self.api.post::<_, LikeState>("/likes", &body).await {
                Ok(state) => {
                    self.apply_local(product, state.liked).await?;
                    return Ok(state.liked);
                }
                Err(e) if e.is_offline() => {
                    tracing::warn!(error = %e, "Queueing like");
                }
                Err(e) => return Err(e),
            }
        }

        self.set_local(product, liked).await?;
        Ok(liked)
    }

    async fn set_local(&self, product: &Product, liked: bool) -> ClientResult<()> {
        self.apply_local(product, liked).await?;
        self.outbox
            .push(Mutation::LikeSet {
                product_id: product.id,
                liked,
            })
            .await
    }

    async fn apply_local(&self, product: &Product, liked: bool) -> ClientResult<()> {
        let mut likes = self.local().await;
        likes.retain(|p| p.id != product.id);
        if liked {
            likes.push(LikedProduct::from(product));
        }
        self.save_local(&likes).await
    }

    /// Replace the local list with the server likes
    pub async fn refresh(&self) -> ClientResult<Vec<LikedProduct>> {
        let server: ServerLikes = self.api.get("/likes").await?;
        self.mirror(&server.products).await
    }
}
