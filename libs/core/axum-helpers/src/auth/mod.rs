//! Bearer token authentication.
//!
//! - [`JwtAuth`] issues and verifies HS256 tokens (stateless, no server side store)
//! - [`jwt_auth_middleware`] guards routes and stores [`JwtClaims`] in extensions
//! - [`CurrentUser`] pulls the caller back out in handlers
//!
//! ```ignore
//! use axum_helpers::auth::{JwtAuth, JwtConfig, jwt_auth_middleware};
//! use core_config::FromEnv;
//!
//! let auth = JwtAuth::new(&JwtConfig::from_env()?);
//!
//! let protected = Router::new()
//!     .route("/api/cart", get(handler))
//!     .layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use config::JwtConfig;
pub use extractor::CurrentUser;
pub use jwt::{JwtAuth, JwtClaims, TokenSubject};
pub use middleware::{
    extract_token_from_request, jwt_auth_middleware, optional_jwt_auth_middleware,
};
