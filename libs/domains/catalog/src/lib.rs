//! Catalog Domain
//!
//! Categories and banners (admin-managed display metadata) plus the
//! storefront views the customer app lands on. Storefront reads go through
//! [`domain_products::ProductRepository`].
//!
//! Responses are wrapped as `{ "success": true, "data": ... }`.

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod storefront;

pub use error::{CatalogError, CatalogResult};
pub use handlers::{
    BannersApiDoc, CategoriesApiDoc, StorefrontApiDoc, banners_router, categories_router,
    storefront_router,
};
pub use models::{
    Banner, Category, CreateBanner, CreateCategory, DisplayStatus, Envelope, FeaturedData,
    HomeData, ProductResults,
};
pub use self::mongodb::MongoCatalogRepository;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
pub use service::CatalogService;
pub use storefront::StorefrontService;
