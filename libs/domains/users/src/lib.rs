//! Users Domain
//!
//! Accounts, authentication, liked products and password reset.
//!
//! - Password hashing with Argon2
//! - HS256 bearer tokens issued through [`axum_helpers::JwtAuth`]
//! - Likes kept as a set on the user document, mutated atomically
//! - Reset codes held in a [`ResetCodeStore`] with a 15 minute lifetime
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Handlers: /auth   /likes   /reset        │
//! └──────┬──────────────┬───────────┬────────┘
//!        │              │           │
//! ┌──────▼──────┐ ┌─────▼─────┐ ┌───▼──────────┐
//! │ UserService │ │LikeService│ │ ResetService │
//! └──────┬──────┘ └─────┬─────┘ └───┬──────┬───┘
//!        │              │           │      │
//! ┌──────▼──────────────▼───────────▼┐ ┌───▼────────────┐
//! │ UserRepository (+ products)      │ │ ResetCodeStore │
//! └──────────────────────────────────┘ └────────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod likes;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod reset;
pub mod service;

pub use error::{UserError, UserResult};
pub use handlers::{AuthApiDoc, LikesApiDoc, ResetApiDoc, auth_router, likes_router, reset_router};
pub use likes::LikeService;
pub use models::{
    Address, AuthResponse, Documents, LikeStateResponse, LikesResponse, LoginRequest,
    Membership, RegisterRequest, Role, ToggleLikeResponse, User, UserProfile, UserStatus,
};
pub use self::mongodb::MongoUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use reset::{InMemoryResetCodeStore, ResetCodeStore, ResetService, spawn_purge_task};
pub use service::{UserService, hash_password};
