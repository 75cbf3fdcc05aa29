use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    AppError, CurrentUser, JwtAuth, UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, BadRequestUuidResponse, BadRequestValidationResponse,
        ForbiddenResponse, InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
    optional_jwt_auth_middleware,
};
use domain_products::ProductRepository;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{
    ADMIN_ROLE, Actor, CreateOrder, DELIVERY_ROLE, Order, OrderEnvelope, OrderItem,
    OrderLineInput, OrderListQuery, OrderStatus, ShippingAddress, UpdateOrderStatus,
};
use crate::repository::OrderRepository;
use crate::service::OrderService;

#[derive(OpenApi)]
#[openapi(
    paths(create_order, list_orders, my_orders, get_order, update_status, cancel_order),
    components(
        schemas(
            Order, OrderItem, OrderStatus, ShippingAddress, CreateOrder, OrderLineInput,
            UpdateOrderStatus, OrderEnvelope
        ),
        responses(
            BadRequestResponse,
            BadRequestUuidResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            ForbiddenResponse,
            NotFoundResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Orders", description = "Order placement and fulfilment")
    )
)]
pub struct ApiDoc;

/// `/orders` routes; every route needs a bearer token
pub fn orders_router<R, P>(service: OrderService<R, P>, auth: JwtAuth) -> Router
where
    R: OrderRepository + 'static,
    P: ProductRepository + 'static,
{
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/my-orders", get(my_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", put(update_status))
        .route("/{id}/cancel", put(cancel_order))
        .with_state(Arc::new(service))
        .layer(middleware::from_fn_with_state(
            auth,
            optional_jwt_auth_middleware,
        ))
}

fn actor(user: &CurrentUser) -> Actor<'_> {
    Actor {
        id: user.id,
        role: user.role(),
    }
}

/// Place an order
///
/// Totals are computed from current catalog prices. A repeated `clientRef`
/// returns the order created the first time with status 200.
#[utoipa::path(
    post,
    path = "",
    tag = "Orders",
    request_body = CreateOrder,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order created", body = OrderEnvelope),
        (status = 200, description = "Order already placed with this clientRef", body = OrderEnvelope),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_order<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
    ValidatedJson(input): ValidatedJson<CreateOrder>,
) -> Result<impl IntoResponse, AppError> {
    let placed = service.create(user.id, input).await?;
    let status = if placed.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(OrderEnvelope::ok(placed.order))))
}

/// All orders, optionally by status (admin and delivery)
#[utoipa::path(
    get,
    path = "",
    tag = "Orders",
    params(OrderListQuery),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_orders<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    user.require_any_role(&[ADMIN_ROLE, DELIVERY_ROLE], "Only staff can list all orders")?;
    Ok(Json(service.list(query.status).await?))
}

/// Orders placed by the caller
#[utoipa::path(
    get,
    path = "/my-orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders, newest first", body = Vec<Order>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn my_orders<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
) -> Result<Json<Vec<Order>>, AppError> {
    Ok(Json(service.my_orders(user.id).await?))
}

/// Get one order (owner, admin or delivery)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_order<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<Order>, AppError> {
    Ok(Json(service.get(actor(&user), id).await?))
}

/// Advance an order's status (admin and delivery)
#[utoipa::path(
    put,
    path = "/{id}/status",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatus,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order after the change", body = OrderEnvelope),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, description = "Order changed concurrently"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_status<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateOrderStatus>,
) -> Result<Json<OrderEnvelope>, AppError> {
    user.require_any_role(
        &[ADMIN_ROLE, DELIVERY_ROLE],
        "Only admin or delivery can update order status",
    )?;
    let order = service.update_status(id, input.status).await?;
    Ok(Json(OrderEnvelope::ok(order)))
}

/// Cancel an order that has not shipped (owner or admin)
#[utoipa::path(
    put,
    path = "/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "Order ID")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cancelled order", body = OrderEnvelope),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 403, response = ForbiddenResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, description = "Order changed concurrently"),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn cancel_order<R: OrderRepository, P: ProductRepository>(
    State(service): State<Arc<OrderService<R, P>>>,
    user: CurrentUser,
    UuidPath(id): UuidPath,
) -> Result<Json<OrderEnvelope>, AppError> {
    let order = service.cancel(actor(&user), id).await?;
    Ok(Json(OrderEnvelope::ok(order)))
}
