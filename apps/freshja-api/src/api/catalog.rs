//! Categories, banners and the `/user` storefront

use axum::Router;
use domain_catalog::{
    CatalogService, StorefrontService, banners_router, categories_router, storefront_router,
};

use crate::state::AppState;

fn service(state: &AppState) -> CatalogService<domain_catalog::MongoCatalogRepository> {
    CatalogService::new(state.repos.catalog.clone())
}

pub fn categories(state: &AppState) -> Router {
    categories_router(service(state), state.auth.clone())
}

pub fn banners(state: &AppState) -> Router {
    banners_router(service(state), state.auth.clone())
}

pub fn storefront(state: &AppState) -> Router {
    storefront_router(StorefrontService::new(
        state.repos.catalog.clone(),
        state.repos.products.clone(),
    ))
}

/// Indexes plus the default categories and banners on an empty database
pub async fn init(state: &AppState) -> eyre::Result<()> {
    state.repos.catalog.init_indexes().await?;
    service(state).ensure_defaults().await?;
    Ok(())
}
