//! Products API routes

use axum::Router;
use domain_products::{ProductService, handlers};

use crate::state::AppState;

pub fn router(state: &AppState) -> Router {
    let service = ProductService::from_shared(state.repos.products.clone());
    handlers::router(service, state.auth.clone())
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    state.repos.products.init_indexes().await?;
    Ok(())
}
