use chrono::{DateTime, Utc};
use domain_pricing::{Money, PricingResult};
use domain_products::Product;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// How many applied mutation ids a cart remembers
pub const MUTATION_HISTORY: usize = 100;

/// Line in a cart, with a display snapshot of the product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: u32,
    pub name: String,
    /// Unit price in JMD when the item was last touched
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
}

impl CartItem {
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id,
            quantity,
            name: product.name.clone(),
            price: product.effective_price(),
            image: product.first_image().map(str::to_string),
        }
    }
}

/// One cart document per user, keyed by the user id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(rename = "_id", alias = "userId")]
    pub user_id: Uuid,
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Most recent applied mutation ids, oldest first
    #[serde(default)]
    pub applied_mutations: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            applied_mutations: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    pub fn has_applied(&self, mutation_id: &str) -> bool {
        self.applied_mutations.iter().any(|m| m == mutation_id)
    }

    /// Add `item.quantity` to the matching line, or append the item.
    /// Returns false without changes when `mutation_id` was already applied.
    pub fn add(&mut self, item: CartItem, mutation_id: Option<&str>) -> bool {
        if let Some(id) = mutation_id {
            if self.has_applied(id) {
                return false;
            }
        }

        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.name = item.name;
                existing.price = item.price;
                existing.image = item.image;
            }
            None => self.items.push(item),
        }

        if let Some(id) = mutation_id {
            self.remember(id);
        }
        self.updated_at = Utc::now();
        true
    }

    /// Set the line quantity; 0 removes the line
    pub fn set(&mut self, item: CartItem) {
        if item.quantity == 0 {
            self.remove(item.product_id);
            return;
        }
        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.updated_at = Utc::now();
    }

    pub fn remove(&mut self, product_id: Uuid) {
        self.items.retain(|i| i.product_id != product_id);
        self.updated_at = Utc::now();
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = Utc::now();
    }

    fn remember(&mut self, mutation_id: &str) {
        self.applied_mutations.push(mutation_id.to_string());
        if self.applied_mutations.len() > MUTATION_HISTORY {
            let excess = self.applied_mutations.len() - MUTATION_HISTORY;
            self.applied_mutations.drain(..excess);
        }
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn subtotal(&self) -> PricingResult<Money> {
        self.items.iter().try_fold(Money::ZERO, |acc, item| {
            Money::from_decimal(item.price)?
                .checked_mul(item.quantity)
                .and_then(|line| acc.checked_add(line))
        })
    }
}

/// Cart as returned over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: u32,
    /// JMD
    pub subtotal: f64,
}

impl CartView {
    pub fn from_cart(cart: Cart) -> PricingResult<Self> {
        let subtotal = cart.subtotal()?.to_decimal();
        Ok(Self {
            item_count: cart.item_count(),
            subtotal,
            items: cart.items,
        })
    }
}

/// Result of an add; `applied` is false when the mutation id was a replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartMutationResponse {
    pub applied: bool,
    pub cart: CartView,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCart {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 999, message = "Quantity must be at least 1"))]
    pub quantity: i64,
    /// Client generated id; a repeated id is acknowledged but not re-applied
    #[serde(default)]
    #[validate(length(min = 1, max = 64))]
    pub mutation_id: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetCartQuantity {
    pub product_id: Uuid,
    /// 0 removes the item
    #[validate(range(min = 0, max = 999))]
    pub quantity: i64,
}
