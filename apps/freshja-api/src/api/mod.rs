//! API routes
//!
//! Everything here is nested under `/api` by `axum_helpers::create_router`.

pub mod cart;
pub mod catalog;
pub mod health;
pub mod orders;
pub mod products;
pub mod seed;
pub mod users;

use axum::Router;
use tracing::info;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    let router = Router::new()
        .nest("/auth", users::auth(state))
        .nest("/likes", users::likes(state))
        .nest("/reset", users::reset(state))
        .nest("/products", products::router(state))
        .nest("/user", catalog::storefront(state))
        .nest("/categories", catalog::categories(state))
        .nest("/banners", catalog::banners(state))
        .nest("/cart", cart::router(state))
        .nest("/orders", orders::router(state));

    if state.config.seed_enabled() {
        info!("Seed routes enabled at /api/seed");
        router.nest("/seed", seed::router(state))
    } else {
        router
    }
}

/// Indexes for every collection, then the default catalog entries
pub async fn init(state: &AppState) -> eyre::Result<()> {
    users::init_indexes(state).await?;
    products::init_indexes(state).await?;
    orders::init_indexes(state).await?;
    catalog::init(state).await?;
    Ok(())
}
