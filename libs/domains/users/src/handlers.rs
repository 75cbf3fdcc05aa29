//! HTTP handlers for auth, likes and password reset

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post},
};
use axum_helpers::{
    CurrentUser, JwtAuth, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ForbiddenResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use domain_products::{Product, ProductRepository};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::UserResult;
use crate::likes::LikeService;
use crate::models::{
    Address, AuthResponse, Documents, ForgotPasswordRequest, ForgotPasswordResponse,
    LikeStateResponse, LikesResponse, LoginRequest, MeResponse, Membership, MessageResponse,
    RegisterRequest, ResetPasswordRequest, Role, SetLikeRequest, ToggleLikeRequest,
    ToggleLikeResponse, UserProfile, UserStatus, VerifyCodeRequest,
};
use crate::repository::UserRepository;
use crate::reset::{ResetCodeStore, ResetService};
use crate::service::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(register, login, me),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, MeResponse, UserProfile, Role,
            Membership, UserStatus, Address, Documents
        ),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login and the current user")
    )
)]
pub struct AuthApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(list_likes, set_like, toggle_like, unlike),
    components(
        schemas(
            ToggleLikeRequest, SetLikeRequest, ToggleLikeResponse, LikeStateResponse,
            LikesResponse, Product
        ),
        responses(
            BadRequestUuidResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Likes", description = "Products the caller has liked")
    )
)]
pub struct LikesApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(forgot_password, verify_code, reset_password),
    components(
        schemas(
            ForgotPasswordRequest, ForgotPasswordResponse, VerifyCodeRequest,
            ResetPasswordRequest, MessageResponse
        ),
        responses(
            BadRequestValidationResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Password reset", description = "Emailed code based password reset")
    )
)]
pub struct ResetApiDoc;

/// `/auth` routes. `/me` needs a bearer token.
pub fn auth_router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let auth = service.auth().clone();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// `/likes` routes, all authenticated
pub fn likes_router<R, P>(service: LikeService<R, P>, auth: JwtAuth) -> Router
where
    R: UserRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/", get(list_likes).post(set_like))
        .route("/toggle", post(toggle_like))
        .route("/{productId}", delete(unlike))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// `/reset` routes, public
pub fn reset_router<R, S>(service: ResetService<R, S>) -> Router
where
    R: UserRepository + 'static,
    S: ResetCodeStore + 'static,
{
    Router::new()
        .route("/forgot", post(forgot_password))
        .route("/verify-code", post(verify_code))
        .route("/reset", post(reset_password))
        .with_state(Arc::new(service))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/register",
    tag = "Auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> UserResult<impl IntoResponse> {
    let response = service.register(input).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<AuthResponse>> {
    Ok(Json(service.login(input).await?))
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = "Auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn me<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    user: CurrentUser,
) -> UserResult<Json<MeResponse>> {
    let user = service.me(user.id).await?;
    Ok(Json(MeResponse { user }))
}

/// Liked product ids and the products they resolve to
#[utoipa::path(
    get,
    path = "",
    tag = "Likes",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Liked products", body = LikesResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_likes<R: UserRepository, P: ProductRepository>(
    State(service): State<Arc<LikeService<R, P>>>,
    user: CurrentUser,
) -> UserResult<Json<LikesResponse>> {
    Ok(Json(service.list(user.id).await?))
}

/// Set like membership; replaying the same request is a no-op
#[utoipa::path(
    post,
    path = "",
    tag = "Likes",
    request_body = SetLikeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Like state after the request", body = LikeStateResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_like<R: UserRepository, P: ProductRepository>(
    State(service): State<Arc<LikeService<R, P>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<SetLikeRequest>,
) -> UserResult<Json<LikeStateResponse>> {
    let state = service.set(user.id, input.product_id, input.liked).await?;
    Ok(Json(state))
}

/// Flip the like state of a product
#[utoipa::path(
    post,
    path = "/toggle",
    tag = "Likes",
    request_body = ToggleLikeRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "New like state", body = ToggleLikeResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn toggle_like<R: UserRepository, P: ProductRepository>(
    State(service): State<Arc<LikeService<R, P>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<ToggleLikeRequest>,
) -> UserResult<Json<ToggleLikeResponse>> {
    Ok(Json(service.toggle(user.id, input.product_id).await?))
}

/// Remove a product from the liked set
#[utoipa::path(
    delete,
    path = "/{productId}",
    tag = "Likes",
    params(("productId" = Uuid, Path, description = "Product ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Like state after the request", body = LikeStateResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn unlike<R: UserRepository, P: ProductRepository>(
    State(service): State<Arc<LikeService<R, P>>>,
    user: CurrentUser,
    UuidPath(product_id): UuidPath,
) -> UserResult<Json<LikeStateResponse>> {
    Ok(Json(service.set(user.id, product_id, false).await?))
}

/// Email a reset code
#[utoipa::path(
    post,
    path = "/forgot",
    tag = "Password reset",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Code sent", body = ForgotPasswordResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn forgot_password<R: UserRepository, S: ResetCodeStore>(
    State(service): State<Arc<ResetService<R, S>>>,
    ValidatedJson(input): ValidatedJson<ForgotPasswordRequest>,
) -> UserResult<Json<ForgotPasswordResponse>> {
    Ok(Json(service.forgot(&input.email).await?))
}

/// Check a reset code
#[utoipa::path(
    post,
    path = "/verify-code",
    tag = "Password reset",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code verified", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn verify_code<R: UserRepository, S: ResetCodeStore>(
    State(service): State<Arc<ResetService<R, S>>>,
    ValidatedJson(input): ValidatedJson<VerifyCodeRequest>,
) -> UserResult<Json<MessageResponse>> {
    Ok(Json(service.verify_code(input).await?))
}

/// Set a new password with a verified code
#[utoipa::path(
    post,
    path = "/reset",
    tag = "Password reset",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn reset_password<R: UserRepository, S: ResetCodeStore>(
    State(service): State<Arc<ResetService<R, S>>>,
    ValidatedJson(input): ValidatedJson<ResetPasswordRequest>,
) -> UserResult<Json<MessageResponse>> {
    Ok(Json(service.reset_password(input).await?))
}
