//! Order routes

use axum::Router;
use domain_orders::{OrderService, orders_router};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let service = OrderService::new(state.repos.orders.clone(), state.repos.products.clone());
    orders_router(service, state.auth.clone())
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    state.repos.orders.init_indexes().await?;
    Ok(())
}
