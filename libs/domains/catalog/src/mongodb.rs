//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::CatalogResult;
use crate::models::{Banner, Category};
use crate::repository::CatalogRepository;

pub const CATEGORIES: &str = "categories";
pub const BANNERS: &str = "banners";

pub struct MongoCatalogRepository {
    categories: Collection<Category>,
    banners: Collection<Banner>,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection::<Category>(CATEGORIES),
            banners: db.collection::<Banner>(BANNERS),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        let by_order = || {
            IndexModel::builder()
                .keys(doc! { "status": 1, "order": 1 })
                .options(IndexOptions::builder().name("idx_status_order".to_string()).build())
                .build()
        };

        self.categories.create_index(by_order()).await?;
        self.banners.create_index(by_order()).await?;
        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    fn ordered() -> FindOptions {
        FindOptions::builder().sort(doc! { "order": 1 }).build()
    }
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self))]
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let cursor = self
            .categories
            .find(doc! { "status": "active" })
            .with_options(Self::ordered())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn create_category(&self, category: Category) -> CatalogResult<Category> {
        self.categories.insert_one(&category).await?;
        tracing::info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn count_categories(&self) -> CatalogResult<u64> {
        Ok(self.categories.count_documents(doc! {}).await?)
    }

    #[instrument(skip(self))]
    async fn list_banners(&self) -> CatalogResult<Vec<Banner>> {
        let cursor = self
            .banners
            .find(doc! { "status": "active" })
            .with_options(Self::ordered())
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, banner), fields(title = %banner.title))]
    async fn create_banner(&self, banner: Banner) -> CatalogResult<Banner> {
        self.banners.insert_one(&banner).await?;
        tracing::info!(banner_id = %banner.id, "Banner created");
        Ok(banner)
    }

    #[instrument(skip(self))]
    async fn count_banners(&self) -> CatalogResult<u64> {
        Ok(self.banners.count_documents(doc! {}).await?)
    }
}
