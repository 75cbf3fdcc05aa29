use axum_helpers::JwtAuth;
use axum_helpers::server::{ShutdownCoordinator, create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{InMemoryResetCodeStore, spawn_purge_task};
use email::Mailer;
use std::sync::Arc;
use tracing::info;

mod api;
mod config;
mod openapi;
mod seed;
mod state;

use config::{Config, RESET_PURGE_INTERVAL, SHUTDOWN_TIMEOUT};
use state::{AppState, Repositories};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = mongo_client.database(config.mongodb.database());

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let state = AppState {
        repos: Repositories::new(&db),
        auth: JwtAuth::new(&config.jwt),
        mailer: Mailer::from_env()?,
        reset_codes: Arc::new(InMemoryResetCodeStore::new()),
        mongo_client,
        config,
    };

    api::init(&state).await?;

    let (coordinator, _shutdown_rx) = ShutdownCoordinator::new();
    let purge = spawn_purge_task(
        state.reset_codes.clone(),
        RESET_PURGE_INTERVAL,
        coordinator.subscribe(),
    );

    let api_routes = api::routes(&state);
    let router =
        axum_helpers::create_router::<openapi::ApiDoc>(api_routes, &state.config.environment)
            .await?;

    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::health::router(state.mongo_client.clone()));

    info!(
        "Starting FreshJA API with graceful shutdown ({:?} timeout)",
        SHUTDOWN_TIMEOUT
    );

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, SHUTDOWN_TIMEOUT, coordinator, async move {
        purge.await.ok();
        info!("Shutting down: closing MongoDB connections");
        state.mongo_client.shutdown().await;
        info!("MongoDB connection closed successfully");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("FreshJA API shutdown complete");
    Ok(())
}
