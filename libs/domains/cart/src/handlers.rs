use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{delete, get},
};
use axum_helpers::{
    CurrentUser, JwtAuth, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse, UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use domain_products::ProductRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::CartResult;
use crate::models::{AddToCart, CartItem, CartMutationResponse, CartView, SetCartQuantity};
use crate::repository::CartRepository;
use crate::service::CartService;

#[derive(OpenApi)]
#[openapi(
    paths(get_cart, add_to_cart, set_quantity, clear_cart, remove_item),
    components(
        schemas(CartItem, CartView, CartMutationResponse, AddToCart, SetCartQuantity),
        responses(
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Cart", description = "Server-side cart of the signed-in user")
    )
)]
pub struct ApiDoc;

/// `/cart` routes; every route needs a bearer token
pub fn cart_router<R, P>(service: CartService<R, P>, auth: JwtAuth) -> Router
where
    R: CartRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route(
            "/",
            get(get_cart)
                .post(add_to_cart)
                .put(set_quantity)
                .delete(clear_cart),
        )
        .route("/{productId}", delete(remove_item))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

/// Current cart
#[utoipa::path(
    get,
    path = "",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart contents", body = CartView),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_cart<R: CartRepository, P: ProductRepository>(
    State(service): State<Arc<CartService<R, P>>>,
    user: CurrentUser,
) -> CartResult<Json<CartView>> {
    Ok(Json(service.get(user.id).await?))
}

/// Add a quantity of a product
///
/// Sending the same `mutationId` again returns `applied: false` and the
/// current cart, so offline replays never double-count.
#[utoipa::path(
    post,
    path = "",
    tag = "Cart",
    request_body = AddToCart,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart after the add", body = CartMutationResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_to_cart<R: CartRepository, P: ProductRepository>(
    State(service): State<Arc<CartService<R, P>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<AddToCart>,
) -> CartResult<Json<CartMutationResponse>> {
    Ok(Json(service.add(user.id, input).await?))
}

/// Set the quantity of a line; 0 removes it
#[utoipa::path(
    put,
    path = "",
    tag = "Cart",
    request_body = SetCartQuantity,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart after the change", body = CartView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn set_quantity<R: CartRepository, P: ProductRepository>(
    State(service): State<Arc<CartService<R, P>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<SetCartQuantity>,
) -> CartResult<Json<CartView>> {
    Ok(Json(service.set(user.id, input).await?))
}

/// Empty the cart
#[utoipa::path(
    delete,
    path = "",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Empty cart", body = CartView),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn clear_cart<R: CartRepository, P: ProductRepository>(
    State(service): State<Arc<CartService<R, P>>>,
    user: CurrentUser,
) -> CartResult<Json<CartView>> {
    Ok(Json(service.clear(user.id).await?))
}

/// Remove one product from the cart
#[utoipa::path(
    delete,
    path = "/{productId}",
    tag = "Cart",
    params(("productId" = Uuid, Path, description = "Product ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart after the removal", body = CartView),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn remove_item<R: CartRepository, P: ProductRepository>(
    State(service): State<Arc<CartService<R, P>>>,
    user: CurrentUser,
    UuidPath(product_id): UuidPath,
) -> CartResult<Json<CartView>> {
    Ok(Json(service.remove(user.id, product_id).await?))
}
