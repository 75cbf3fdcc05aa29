use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use domain_pricing::PricingError;
use domain_products::ProductError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Product(#[from] ProductError),
}

pub type CartResult<T> = Result<T, CartError>;

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound(_) => AppError::NotFound("Product not found".to_string()),
            CartError::InvalidQuantity => {
                AppError::BadRequest("Quantity must be at least 1".to_string())
            }
            CartError::Pricing(e) => AppError::BadRequest(e.to_string()),
            CartError::Database(msg) => AppError::InternalServerError(msg),
            CartError::Product(err) => err.into(),
        }
    }
}

impl IntoResponse for CartError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for CartError {
    fn from(err: mongodb::error::Error) -> Self {
        CartError::Database(err.to_string())
    }
}
