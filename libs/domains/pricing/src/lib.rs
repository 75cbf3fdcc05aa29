//! Pricing Domain
//!
//! Checkout arithmetic shared by the API (authoritative order totals) and the
//! client (local orders and the checkout preview).
//!
//! ```text
//! subtotal = sum(unit price * quantity)
//! tax      = 15% of subtotal
//! discount = 30% of subtotal
//! total    = subtotal + tax - discount + delivery (500)
//! ```
//!
//! All amounts are [`Money`], an integer count of minor units (JMD cents),
//! so totals never drift from floating point error. Each percentage is
//! rounded half away from zero on its own before summing.

pub mod error;
pub mod models;

pub use error::{PricingError, PricingResult};
pub use models::{
    Checkout, DELIVERY_FEE, DISCOUNT_RATE_PERCENT, LineItem, Money, TAX_RATE_PERCENT, checkout,
};
