//! # Axum Helpers
//!
//! Shared building blocks for the FreshJA HTTP API.
//!
//! ## Modules
//!
//! - **[`auth`]**: stateless JWT issuing/verification, auth middleware, `CurrentUser`
//! - **[`server`]**: router assembly with OpenAPI UIs, health checks, graceful shutdown
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: `AppError` and the `{code, error, message, details}` error body
//! - **[`extractors`]**: `UuidPath`, `ValidatedJson`
//!
//! ## Quick Start
//!
//! ```ignore
//! use axum::Router;
//! use axum_helpers::server::{ShutdownCoordinator, create_production_app, create_router};
//! use core_config::{Environment, server::ServerConfig};
//! use utoipa::OpenApi;
//!
//! #[derive(OpenApi)]
//! #[openapi(paths())]
//! struct ApiDoc;
//!
//! let router = create_router::<ApiDoc>(Router::new(), &Environment::Development).await?;
//! let (coordinator, _rx) = ShutdownCoordinator::new();
//! create_production_app(router, &ServerConfig::default(), timeout, coordinator, async {}).await?;
//! ```

pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    CurrentUser, JwtAuth, JwtClaims, JwtConfig, TokenSubject, jwt_auth_middleware,
    optional_jwt_auth_middleware,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer_from_env, create_cors_layer, create_permissive_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{UuidPath, ValidatedJson};
