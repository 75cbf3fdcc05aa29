use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Product visibility
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

/// Product entity, stored as-is in the `products` collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub title: String,
    /// Display name of the farmer selling the product
    pub seller: String,
    #[serde(default)]
    pub seller_id: Option<Uuid>,
    pub category: String,
    /// Price in JMD
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub nutrition: Option<String>,
    #[serde(default)]
    pub fact: Option<String>,
    #[serde(default = "default_grading")]
    pub grading: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub percentage: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub fiber: Option<f64>,
    #[serde(default)]
    pub vitamin: Option<f64>,
    #[serde(default)]
    pub potassium: Option<f64>,
    /// Image file names
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_grading() -> String {
    "A".to_string()
}

fn default_unit() -> String {
    "kg".to_string()
}

/// Caller details stamped onto a new product
#[derive(Debug, Clone, Copy)]
pub struct Seller<'a> {
    pub id: Uuid,
    pub name: &'a str,
}

/// DTO for creating a product
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Discount price must not be negative"))]
    pub discount_price: Option<f64>,
    pub description: Option<String>,
    pub about: Option<String>,
    pub nutrition: Option<String>,
    pub fact: Option<String>,
    pub grading: Option<String>,
    pub topic: Option<String>,
    pub percentage: Option<String>,
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub fat: Option<f64>,
    pub fiber: Option<f64>,
    pub vitamin: Option<f64>,
    pub potassium: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_organic: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub unit: Option<String>,
}

/// DTO for a partial product update; unset fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grading: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_organic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Product {
    pub fn new(seller: Seller<'_>, input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            title: input.title,
            seller: seller.name.to_string(),
            seller_id: Some(seller.id),
            category: input.category,
            price: input.price,
            discount_price: input.discount_price,
            description: input.description,
            about: input.about,
            nutrition: input.nutrition,
            fact: input.fact,
            grading: input.grading.unwrap_or_else(default_grading),
            topic: input.topic,
            percentage: input.percentage,
            calories: input.calories,
            carbs: input.carbs,
            protein: input.protein,
            fat: input.fat,
            fiber: input.fiber,
            vitamin: input.vitamin,
            potassium: input.potassium,
            images: input.images,
            is_organic: input.is_organic,
            is_featured: input.is_featured,
            rating: input.rating.unwrap_or(0.0),
            status: ProductStatus::Active,
            stock: input.stock.unwrap_or(0),
            unit: input.unit.unwrap_or_else(default_unit),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { self.$field = v; })*
            };
        }
        macro_rules! set_opt {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { self.$field = Some(v); })*
            };
        }

        set!(name, title, category, price, grading, images, is_organic, is_featured, rating, status, stock, unit);
        set_opt!(discount_price, description, about, nutrition, fact, topic, percentage);
        self.updated_at = Utc::now();
    }

    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Price a buyer pays per unit: the discount price when one is set
    pub fn effective_price(&self) -> f64 {
        match self.discount_price {
            Some(discount) if discount > 0.0 && discount < self.price => discount,
            _ => self.price,
        }
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Which text fields a search term is matched against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchScope {
    /// name, title, seller, category
    #[default]
    Catalog,
    /// name, title, description, seller
    Storefront,
}

impl SearchScope {
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            SearchScope::Catalog => &["name", "title", "seller", "category"],
            SearchScope::Storefront => &["name", "title", "description", "seller"],
        }
    }
}

/// Repository-level filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub scope: SearchScope,
    pub seller_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub skip: u64,
    /// 0 means no limit
    pub limit: i64,
}

impl ProductFilter {
    /// Active products only
    pub fn active() -> Self {
        Self {
            status: Some(ProductStatus::Active),
            ..Default::default()
        }
    }

    /// Apply a category from a query string; `all`, `null` and blank mean no filter
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .map(str::trim)
            .filter(|c| !c.is_empty() && *c != "all" && *c != "null")
            .map(str::to_string);
        self
    }

    pub fn with_search(mut self, search: Option<&str>, scope: SearchScope) -> Self {
        self.search = search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        self.scope = scope;
        self
    }

    pub fn paged(mut self, pagination: Pagination) -> Self {
        self.skip = pagination.skip();
        self.limit = pagination.limit;
        self
    }

    /// In-memory equivalent of the Mongo filter
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(status) = self.status {
            if product.status != status {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(seller_id) = self.seller_id {
            if product.seller_id != Some(seller_id) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.is_featured != featured {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let hit = self.scope.fields().iter().any(|field| {
                let value = match *field {
                    "name" => Some(product.name.as_str()),
                    "title" => Some(product.title.as_str()),
                    "seller" => Some(product.seller.as_str()),
                    "category" => Some(product.category.as_str()),
                    "description" => product.description.as_deref(),
                    _ => None,
                };
                value.is_some_and(|v| v.to_lowercase().contains(&needle))
            });
            if !hit {
                return false;
            }
        }
        true
    }
}

/// Page request, normalized: page >= 1, 1 <= limit <= 100
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub limit: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl Pagination {
    pub fn new(page: Option<u64>, limit: Option<i64>) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            limit: limit
                .filter(|l| *l >= 1)
                .map(|l| l.min(MAX_PAGE_LIMIT))
                .unwrap_or(DEFAULT_PAGE_LIMIT),
        }
    }

    /// Documents to skip, capped at what the Mongo driver can encode (an i64)
    pub fn skip(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.limit as u64)
            .min(i64::MAX as u64)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

/// Query parameters for `GET /products`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    /// Category name; `all` or `null` disables the filter
    pub category: Option<String>,
    /// Case-insensitive match on name, title, seller or category
    pub search: Option<String>,
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Page size (default 20, max 100)
    pub limit: Option<i64>,
}

impl ProductListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Page query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// One page of products
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total: u64,
}

impl ProductPage {
    pub fn new(products: Vec<Product>, total: u64, pagination: Pagination) -> Self {
        Self {
            products,
            total_pages: pagination.total_pages(total),
            current_page: pagination.page,
            total,
        }
    }
}

/// `{ product }` wrapper returned by create and update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductEnvelope {
    pub product: Product,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
