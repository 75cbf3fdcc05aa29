use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CatalogResult;
use crate::models::{Banner, Category, DisplayStatus};

/// Categories and banners; both listed active-only by ascending `order`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>>;

    async fn create_category(&self, category: Category) -> CatalogResult<Category>;

    async fn count_categories(&self) -> CatalogResult<u64>;

    async fn list_banners(&self) -> CatalogResult<Vec<Banner>>;

    async fn create_banner(&self, banner: Banner) -> CatalogResult<Banner>;

    async fn count_banners(&self) -> CatalogResult<u64>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    categories: Arc<RwLock<Vec<Category>>>,
    banners: Arc<RwLock<Vec<Banner>>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        let mut active: Vec<Category> = self
            .categories
            .read()
            .await
            .iter()
            .filter(|c| c.status == DisplayStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|c| c.order);
        Ok(active)
    }

    async fn create_category(&self, category: Category) -> CatalogResult<Category> {
        self.categories.write().await.push(category.clone());
        Ok(category)
    }

    async fn count_categories(&self) -> CatalogResult<u64> {
        Ok(self.categories.read().await.len() as u64)
    }

    async fn list_banners(&self) -> CatalogResult<Vec<Banner>> {
        let mut active: Vec<Banner> = self
            .banners
            .read()
            .await
            .iter()
            .filter(|b| b.status == DisplayStatus::Active)
            .cloned()
            .collect();
        active.sort_by_key(|b| b.order);
        Ok(active)
    }

    async fn create_banner(&self, banner: Banner) -> CatalogResult<Banner> {
        self.banners.write().await.push(banner.clone());
        Ok(banner)
    }

    async fn count_banners(&self) -> CatalogResult<u64> {
        Ok(self.banners.read().await.len() as u64)
    }
}
