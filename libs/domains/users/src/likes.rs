//! Per-user liked products.
//!
//! Membership is a set. `set` is idempotent and is what offline clients
//! replay; `toggle` flips the current state atomically in the store.

use domain_products::{Product, ProductRepository};
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{LikeStateResponse, LikesResponse, ToggleLikeResponse};
use crate::repository::UserRepository;

pub struct LikeService<R: UserRepository, P: ProductRepository> {
    users: Arc<R>,
    products: Arc<P>,
}

impl<R: UserRepository, P: ProductRepository> Clone for LikeService<R, P> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            products: Arc::clone(&self.products),
        }
    }
}

impl<R: UserRepository, P: ProductRepository> LikeService<R, P> {
    pub fn new(users: Arc<R>, products: Arc<P>) -> Self {
        Self { users, products }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> UserResult<LikesResponse> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        let products = self.resolve(&user.liked_products).await?;
        Ok(LikesResponse {
            product_ids: user.liked_products,
            products,
        })
    }

    /// Flip the like state. Unliking a product that has since been deleted
    /// is allowed so stale ids can be cleared.
    #[instrument(skip(self))]
    pub async fn toggle(&self, user_id: Uuid, product_id: Uuid) -> UserResult<ToggleLikeResponse> {
        let user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        if !user.liked_products.contains(&product_id) {
            self.ensure_product(product_id).await?;
        }

        let (liked, ids) = self
            .users
            .toggle_like(user_id, product_id)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        tracing::info!(%user_id, %product_id, liked, "Toggled like");
        Ok(ToggleLikeResponse {
            liked,
            liked_products: self.resolve(&ids).await?,
        })
    }

    /// Converge on `liked` regardless of the current state
    #[instrument(skip(self))]
    pub async fn set(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        liked: bool,
    ) -> UserResult<LikeStateResponse> {
        if liked {
            self.ensure_product(product_id).await?;
        }

        let ids = self
            .users
            .set_like(user_id, product_id, liked)
            .await?
            .ok_or(UserError::NotFound(user_id))?;

        Ok(LikeStateResponse {
            product_id,
            liked,
            liked_products: ids,
        })
    }

    async fn ensure_product(&self, product_id: Uuid) -> UserResult<()> {
        match self.products.get_by_id(product_id).await? {
            Some(_) => Ok(()),
            None => Err(UserError::ProductNotFound(product_id)),
        }
    }

    /// Liked ids resolved to products, in liked order; missing ids are skipped
    async fn resolve(&self, ids: &[Uuid]) -> UserResult<Vec<Product>> {
        let mut products = self.products.get_many(ids.to_vec()).await?;
        products.sort_by_key(|p| ids.iter().position(|id| *id == p.id));
        Ok(products)
    }
}
