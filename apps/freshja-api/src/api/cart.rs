//! Server-side cart routes

use axum::Router;
use domain_cart::{CartService, cart_router};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let service = CartService::new(state.repos.carts.clone(), state.repos.products.clone());
    cart_router(service, state.auth.clone())
}
