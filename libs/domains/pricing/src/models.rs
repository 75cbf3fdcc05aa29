use crate::error::{PricingError, PricingResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const TAX_RATE_PERCENT: i64 = 15;
pub const DISCOUNT_RATE_PERCENT: i64 = 30;
pub const DELIVERY_FEE: Money = Money::from_major(500);

const MINOR_PER_MAJOR: i64 = 100;

/// Amount in minor currency units (cents)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    ToSchema,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    pub const fn from_major(major: i64) -> Self {
        Self(major * MINOR_PER_MAJOR)
    }

    /// Convert a decimal price (e.g. `249.99`) rounding to the nearest cent.
    /// Negative and non-finite values are rejected.
    pub fn from_decimal(value: f64) -> PricingResult<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(PricingError::InvalidPrice(value));
        }
        let minor = (value * MINOR_PER_MAJOR as f64).round();
        if minor > i64::MAX as f64 {
            return Err(PricingError::Overflow);
        }
        Ok(Self(minor as i64))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    /// `percent`% of this amount, rounded half away from zero
    pub fn percent(self, percent: i64) -> Money {
        let scaled = self.0 as i128 * percent as i128;
        let quotient = scaled / 100;
        let remainder = scaled % 100;
        let rounded = if remainder.abs() * 2 >= 100 {
            quotient + scaled.signum()
        } else {
            quotient
        };
        Money(rounded as i64)
    }

    pub fn checked_add(self, other: Money) -> PricingResult<Money> {
        self.0.checked_add(other.0).map(Money).ok_or(PricingError::Overflow)
    }

    pub fn checked_sub(self, other: Money) -> PricingResult<Money> {
        self.0.checked_sub(other.0).map(Money).ok_or(PricingError::Overflow)
    }

    pub fn checked_mul(self, quantity: u32) -> PricingResult<Money> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Money)
            .ok_or(PricingError::Overflow)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}JMD {}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

/// One priced cart line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    pub unit_price: Money,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(unit_price: Money, quantity: u32) -> PricingResult<Self> {
        if quantity == 0 {
            return Err(PricingError::InvalidQuantity);
        }
        Ok(Self {
            unit_price,
            quantity,
        })
    }

    pub fn line_total(&self) -> PricingResult<Money> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Order summary in minor units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Checkout {
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub delivery: Money,
    pub total: Money,
}

impl Checkout {
    /// Whether a client-computed decimal total disagrees by at least a cent
    pub fn differs_from(&self, client_total: f64) -> bool {
        match Money::from_decimal(client_total) {
            Ok(client) => client != self.total,
            Err(_) => true,
        }
    }
}

/// Price a set of lines with the fixed tax, discount and delivery rules.
pub fn checkout(items: &[LineItem]) -> PricingResult<Checkout> {
    let subtotal = items.iter().try_fold(Money::ZERO, |acc, item| {
        acc.checked_add(item.line_total()?)
    })?;

    let tax = subtotal.percent(TAX_RATE_PERCENT);
    let discount = subtotal.percent(DISCOUNT_RATE_PERCENT);
    let total = subtotal
        .checked_add(tax)?
        .checked_sub(discount)?
        .checked_add(DELIVERY_FEE)?;

    Ok(Checkout {
        subtotal,
        tax,
        discount,
        delivery: DELIVERY_FEE,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, qty: u32) -> LineItem {
        LineItem::new(Money::from_decimal(price).unwrap(), qty).unwrap()
    }

    #[test]
    fn test_subtotal_1000_totals_1350() {
        let summary = checkout(&[line(1000.0, 1)]).unwrap();
        assert_eq!(summary.subtotal, Money::from_major(1000));
        assert_eq!(summary.tax, Money::from_major(150));
        assert_eq!(summary.discount, Money::from_major(300));
        assert_eq!(summary.delivery, Money::from_major(500));
        assert_eq!(summary.total, Money::from_major(1350));
    }

    #[test]
    fn test_multiple_lines() {
        // 250 x 2 + 150 x 3 = 950
        let summary = checkout(&[line(250.0, 2), line(150.0, 3)]).unwrap();
        assert_eq!(summary.subtotal, Money::from_major(950));
        assert_eq!(summary.tax.minor(), 14_250);
        assert_eq!(summary.discount.minor(), 28_500);
        assert_eq!(summary.total.minor(), 95_000 + 14_250 - 28_500 + 50_000);
    }

    #[test]
    fn test_empty_cart_is_delivery_only() {
        let summary = checkout(&[]).unwrap();
        assert_eq!(summary.subtotal, Money::ZERO);
        assert_eq!(summary.total, DELIVERY_FEE);
    }

    #[test]
    fn test_percent_rounds_half_away_from_zero() {
        // 15% of 0.10 = 0.015 -> 0.02
        assert_eq!(Money::from_minor(10).percent(15), Money::from_minor(2));
        // 15% of 0.09 = 0.0135 -> 0.01
        assert_eq!(Money::from_minor(9).percent(15), Money::from_minor(1));
        // 30% of 0.05 = 0.015 -> 0.02
        assert_eq!(Money::from_minor(5).percent(30), Money::from_minor(2));
        assert_eq!(Money::from_minor(-10).percent(15), Money::from_minor(-2));
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(249.99).unwrap().minor(), 24_999);
        assert_eq!(Money::from_decimal(0.005).unwrap().minor(), 1);
        assert!(Money::from_decimal(-1.0).is_err());
        assert!(Money::from_decimal(f64::NAN).is_err());
        assert!(Money::from_decimal(f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert_eq!(
            LineItem::new(Money::from_major(1), 0),
            Err(PricingError::InvalidQuantity)
        );
    }

    #[test]
    fn test_overflow_detected() {
        let huge = LineItem::new(Money::from_minor(i64::MAX / 2), 3).unwrap();
        assert_eq!(checkout(&[huge]), Err(PricingError::Overflow));
    }

    #[test]
    fn test_differs_from_client_total() {
        let summary = checkout(&[line(1000.0, 1)]).unwrap();
        assert!(!summary.differs_from(1350.0));
        assert!(!summary.differs_from(1350.001));
        assert!(summary.differs_from(1349.0));
        assert!(summary.differs_from(f64::NAN));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(135_005).to_string(), "JMD 1350.05");
        assert_eq!(Money::from_minor(-250).to_string(), "-JMD 2.50");
    }

    #[test]
    fn test_money_serializes_as_minor_units() {
        let json = serde_json::to_string(&Money::from_major(5)).unwrap();
        assert_eq!(json, "500");
    }
}
