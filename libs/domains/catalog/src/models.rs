use chrono::{DateTime, Utc};
use domain_products::{Pagination, Product};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Products shown in the home page featured strip
pub const HOME_FEATURED_LIMIT: i64 = 8;
/// Products returned by `/user/featured`
pub const FEATURED_LIMIT: i64 = 12;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayStatus {
    #[default]
    Active,
    Inactive,
}

/// Product category shown on the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub status: DisplayStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub status: DisplayStatus,
}

impl Category {
    pub fn new(input: CreateCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            title: input.title,
            description: input.description,
            image: input.image,
            order: input.order,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Promotional banner shown on the home page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub image: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub status: DisplayStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBanner {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub subtitle: Option<String>,
    pub text: Option<String>,
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
    pub link: Option<String>,
    #[serde(default)]
    pub order: i32,
    #[serde(default)]
    pub status: DisplayStatus,
}

impl Banner {
    pub fn new(input: CreateBanner) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            subtitle: input.subtitle,
            text: input.text,
            image: input.image,
            link: input.link,
            order: input.order,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `{success, data}` wrapper used by the storefront and catalog endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerList {
    pub banners: Vec<Banner>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryEnvelope {
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BannerEnvelope {
    pub banner: Banner,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomePagination {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_products: u64,
}

/// Everything the home screen needs in one response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HomeData {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub banners: Vec<Banner>,
    pub featured_products: Vec<Product>,
    pub pagination: HomePagination,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total: u64,
}

impl PageInfo {
    pub fn new(total: u64, pagination: Pagination) -> Self {
        Self {
            current_page: pagination.page,
            total_pages: pagination.total_pages(total),
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResults {
    pub products: Vec<Product>,
    pub pagination: PageInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedData {
    pub featured_products: Vec<Product>,
}

/// Query parameters for `GET /user`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HomeQuery {
    /// Category name; `all` or `null` disables the filter
    pub category: Option<String>,
    /// Case-insensitive match on name, title, description or seller
    pub search: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

impl HomeQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Query parameters for `GET /user/search`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search term, required
    pub q: Option<String>,
    pub category: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}
