//! Auth, likes and password reset routes

use axum::Router;
use domain_users::{LikeService, ResetService, UserService, auth_router, likes_router, reset_router};

use crate::state::AppState;

pub fn auth(state: &AppState) -> Router {
    auth_router(UserService::from_shared(
        state.repos.users.clone(),
        state.auth.clone(),
        state.mailer.clone(),
    ))
}

pub fn likes(state: &AppState) -> Router {
    let service = LikeService::new(state.repos.users.clone(), state.repos.products.clone());
    likes_router(service, state.auth.clone())
}

pub fn reset(state: &AppState) -> Router {
    reset_router(ResetService::new(
        state.repos.users.clone(),
        state.reset_codes.clone(),
        state.mailer.clone(),
    ))
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    state.repos.users.init_indexes().await?;
    Ok(())
}
