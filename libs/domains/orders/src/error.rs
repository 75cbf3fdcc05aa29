use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_pricing::PricingError;
use domain_products::ProductError;
use thiserror::Error;
use uuid::Uuid;

use crate::models::OrderStatus;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Not allowed to access this order")]
    Forbidden,

    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order can no longer be cancelled")]
    NotCancellable(OrderStatus),

    #[error("Order was modified concurrently")]
    Conflict,

    #[error("Order with this client reference already exists")]
    DuplicateClientRef,

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Product(#[from] ProductError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => AppError::NotFound("Order not found".to_string()),
            OrderError::ProductNotFound(_) => {
                AppError::NotFound("Product not found".to_string())
            }
            OrderError::Forbidden => AppError::Forbidden(err.to_string()),
            OrderError::InvalidTransition { .. }
            | OrderError::NotCancellable(_)
            | OrderError::Validation(_) => AppError::BadRequest(err.to_string()),
            OrderError::Pricing(e) => AppError::BadRequest(e.to_string()),
            OrderError::Conflict | OrderError::DuplicateClientRef => {
                AppError::Conflict(err.to_string())
            }
            OrderError::Database(msg) => AppError::InternalServerError(msg),
            OrderError::Product(err) => err.into(),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for OrderError {
    fn from(err: mongodb::error::Error) -> Self {
        if axum_helpers::errors::is_duplicate_key(&err) {
            return OrderError::DuplicateClientRef;
        }
        OrderError::Database(err.to_string())
    }
}
