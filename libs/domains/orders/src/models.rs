use chrono::{DateTime, Utc};
use domain_pricing::Checkout;
use domain_products::Product;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const ADMIN_ROLE: &str = "admin";
pub const DELIVERY_ROLE: &str = "delivery";

/// Order lifecycle. Orders move forward along
/// `pending -> confirmed -> processing -> in-transit -> delivered`;
/// `cancelled` is reachable only through a cancel.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    InTransit,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    fn rank(self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::InTransit => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Forward moves only; steps may be skipped
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next > current,
            _ => false,
        }
    }

    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }
}

/// Priced line, copied from the product at order time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItem {
    pub product: Uuid,
    pub quantity: u32,
    /// Unit price in JMD
    pub price: f64,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product: product.id,
            quantity,
            price: product.effective_price(),
            name: product.name.clone(),
            image: product.first_image().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ShippingAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// e.g. `home`, `work`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user: Uuid,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub delivery: f64,
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_slot: Option<String>,
    /// Idempotency key chosen by the client
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ref: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user: Uuid, items: Vec<OrderItem>, totals: Checkout, input: &CreateOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            user,
            items,
            subtotal: totals.subtotal.to_decimal(),
            tax: totals.tax.to_decimal(),
            discount: totals.discount.to_decimal(),
            delivery: totals.delivery.to_decimal(),
            total: totals.total.to_decimal(),
            status: OrderStatus::Pending,
            shipping_address: input.shipping_address.clone(),
            payment_method: input.payment_method.clone(),
            delivery_date: input.delivery_date,
            time_slot: input.time_slot.clone(),
            client_ref: input.client_ref.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderLineInput {
    #[serde(alias = "productId")]
    pub product: Uuid,
    #[validate(range(min = 1, max = 999, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    #[validate(
        length(min = 1, message = "Order must contain at least one item"),
        nested
    )]
    pub items: Vec<OrderLineInput>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_slot: Option<String>,
    /// Total the client computed; informational only
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub client_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: Order,
}

impl OrderEnvelope {
    pub fn ok(order: Order) -> Self {
        Self {
            success: true,
            order,
        }
    }
}

/// Who is acting on an order
#[derive(Debug, Clone, Copy)]
pub struct Actor<'a> {
    pub id: Uuid,
    pub role: &'a str,
}

impl Actor<'_> {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }

    /// Admin or delivery
    pub fn is_staff(&self) -> bool {
        self.is_admin() || self.role == DELIVERY_ROLE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::InTransit).unwrap(),
            "\"in-transit\""
        );
        assert_eq!(
            OrderStatus::from_str("in-transit").unwrap(),
            OrderStatus::InTransit
        );
    }

    #[test]
    fn test_forward_transitions_only() {
        assert!(OrderStatus::Pending.can_advance_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_advance_to(OrderStatus::InTransit));
        assert!(!OrderStatus::Processing.can_advance_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Delivered.can_advance_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_advance_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_advance_to(OrderStatus::Confirmed));
    }

    #[test]
    fn test_cancellable_states() {
        assert!(OrderStatus::Processing.is_cancellable());
        assert!(!OrderStatus::InTransit.is_cancellable());
        assert!(!OrderStatus::Cancelled.is_cancellable());
    }

    #[test]
    fn test_create_order_validation() {
        let empty = CreateOrder {
            items: vec![],
            shipping_address: None,
            payment_method: None,
            delivery_date: None,
            time_slot: None,
            total: None,
            client_ref: None,
        };
        assert!(empty.validate().is_err());

        let zero: CreateOrder = serde_json::from_value(serde_json::json!({
            "items": [{ "productId": Uuid::now_v7(), "quantity": 0 }]
        }))
        .unwrap();
        assert!(zero.validate().is_err());
    }
}
