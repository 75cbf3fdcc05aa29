//! `/seed` routes, mounted in development only

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_helpers::AppError;
use domain_catalog::MongoCatalogRepository;
use domain_products::MongoProductRepository;
use domain_users::MongoUserRepository;
use std::sync::Arc;

use crate::seed::{SeedReport, SeedStatus, Seeder};
use crate::state::AppState;

type MongoSeeder = Seeder<MongoUserRepository, MongoProductRepository, MongoCatalogRepository>;

pub fn router(state: &AppState) -> Router {
    let seeder = Seeder::new(
        state.repos.users.clone(),
        state.repos.products.clone(),
        state.repos.catalog.clone(),
    );

    Router::new()
        .route("/", post(run_seed).get(seed_status))
        .with_state(Arc::new(seeder))
}

async fn run_seed(
    State(seeder): State<Arc<MongoSeeder>>,
) -> Result<(StatusCode, Json<SeedReport>), AppError> {
    let report = seeder.run().await?;
    Ok((StatusCode::CREATED, Json(report)))
}

async fn seed_status(State(seeder): State<Arc<MongoSeeder>>) -> Result<Json<SeedStatus>, AppError> {
    Ok(Json(seeder.status().await?))
}
