use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    #[error("Invalid price: {0}")]
    InvalidPrice(f64),

    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    #[error("Amount overflow")]
    Overflow,
}

pub type PricingResult<T> = Result<T, PricingError>;
