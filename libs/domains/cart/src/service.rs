use domain_products::ProductRepository;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{
    AddToCart, CartItem, CartMutationResponse, CartView, SetCartQuantity,
};
use crate::repository::CartRepository;

pub struct CartService<R: CartRepository, P: ProductRepository> {
    carts: Arc<R>,
    products: Arc<P>,
}

impl<R: CartRepository, P: ProductRepository> Clone for CartService<R, P> {
    fn clone(&self) -> Self {
        Self {
            carts: Arc::clone(&self.carts),
            products: Arc::clone(&self.products),
        }
    }
}

impl<R: CartRepository, P: ProductRepository> CartService<R, P> {
    pub fn new(carts: Arc<R>, products: Arc<P>) -> Self {
        Self { carts, products }
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: Uuid) -> CartResult<CartView> {
        let cart = self.carts.get(user_id).await?;
        Ok(CartView::from_cart(cart)?)
    }

    /// Increment a line. A repeated `mutationId` is acknowledged with
    /// `applied: false` and leaves the cart unchanged.
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn add(&self, user_id: Uuid, input: AddToCart) -> CartResult<CartMutationResponse> {
        let quantity = positive_quantity(input.quantity)?;
        let item = self.snapshot(input.product_id, quantity).await?;

        let (applied, cart) = self.carts.add(user_id, item, input.mutation_id).await?;
        if !applied {
            tracing::info!(%user_id, "Ignored replayed cart mutation");
        }

        Ok(CartMutationResponse {
            applied,
            cart: CartView::from_cart(cart)?,
        })
    }

    /// Set a line's quantity; 0 removes it
    #[instrument(skip(self, input), fields(product_id = %input.product_id))]
    pub async fn set(&self, user_id: Uuid, input: SetCartQuantity) -> CartResult<CartView> {
        let cart = if input.quantity <= 0 {
            self.carts.remove(user_id, input.product_id).await?
        } else {
            let quantity = positive_quantity(input.quantity)?;
            let item = self.snapshot(input.product_id, quantity).await?;
            self.carts.set(user_id, item).await?
        };
        Ok(CartView::from_cart(cart)?)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: Uuid, product_id: Uuid) -> CartResult<CartView> {
        let cart = self.carts.remove(user_id, product_id).await?;
        Ok(CartView::from_cart(cart)?)
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> CartResult<CartView> {
        let cart = self.carts.clear(user_id).await?;
        Ok(CartView::from_cart(cart)?)
    }

    async fn snapshot(&self, product_id: Uuid, quantity: u32) -> CartResult<CartItem> {
        let product = self
            .products
            .get_by_id(product_id)
            .await?
            .filter(|p| p.is_active())
            .ok_or(CartError::ProductNotFound(product_id))?;
        Ok(CartItem::from_product(&product, quantity))
    }
}

fn positive_quantity(quantity: i64) -> CartResult<u32> {
    u32::try_from(quantity)
        .ok()
        .filter(|q| *q >= 1)
        .ok_or(CartError::InvalidQuantity)
}
