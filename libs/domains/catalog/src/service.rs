use std::sync::Arc;
use tracing::instrument;

use crate::error::CatalogResult;
use crate::models::{Banner, Category, CreateBanner, CreateCategory};
use crate::repository::CatalogRepository;

/// Admin-managed display metadata
pub struct CatalogService<C: CatalogRepository> {
    repository: Arc<C>,
}

impl<C: CatalogRepository> Clone for CatalogService<C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<C: CatalogRepository> CatalogService<C> {
    pub fn new(repository: Arc<C>) -> Self {
        Self { repository }
    }

    pub async fn list_categories(&self) -> CatalogResult<Vec<Category>> {
        self.repository.list_categories().await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(&self, input: CreateCategory) -> CatalogResult<Category> {
        self.repository.create_category(Category::new(input)).await
    }

    pub async fn list_banners(&self) -> CatalogResult<Vec<Banner>> {
        self.repository.list_banners().await
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_banner(&self, input: CreateBanner) -> CatalogResult<Banner> {
        self.repository.create_banner(Banner::new(input)).await
    }

    /// Insert the default categories and banners into empty collections.
    /// Returns how many of each were created.
    #[instrument(skip(self))]
    pub async fn ensure_defaults(&self) -> CatalogResult<(u64, u64)> {
        let mut categories = 0;
        if self.repository.count_categories().await? == 0 {
            for input in default_categories() {
                self.repository.create_category(Category::new(input)).await?;
                categories += 1;
            }
        }

        let mut banners = 0;
        if self.repository.count_banners().await? == 0 {
            for input in default_banners() {
                self.repository.create_banner(Banner::new(input)).await?;
                banners += 1;
            }
        }

        if categories + banners > 0 {
            tracing::info!(categories, banners, "Inserted default catalog entries");
        }
        Ok((categories, banners))
    }
}

pub fn default_categories() -> Vec<CreateCategory> {
    [
        ("vegetables", "Vegetables", "Fresh local vegetables", "vegetables.jpg"),
        ("fruits", "Fruits", "Tropical and seasonal fruits", "fruits.jpg"),
        ("ground-provisions", "Ground Provisions", "Yam, dasheen and cassava", "provisions.jpg"),
        ("herbs", "Herbs & Spices", "Thyme, scallion and peppers", "herbs.jpg"),
    ]
    .into_iter()
    .enumerate()
    .map(|(order, (name, title, description, image))| CreateCategory {
        name: name.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        image: Some(image.to_string()),
        order: order as i32,
        ..Default::default()
    })
    .collect()
}

pub fn default_banners() -> Vec<CreateBanner> {
    vec![
        CreateBanner {
            title: "Farm Fresh Produce".to_string(),
            subtitle: Some("Straight from Jamaican farms".to_string()),
            text: Some("Shop local and eat fresh".to_string()),
            image: "banner_fresh.jpg".to_string(),
            order: 0,
            ..Default::default()
        },
        CreateBanner {
            title: "Organic Picks".to_string(),
            subtitle: Some("Grown without pesticides".to_string()),
            image: "banner_organic.jpg".to_string(),
            order: 1,
            ..Default::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryCatalogRepository, MockCatalogRepository};

    #[tokio::test]
    async fn test_ensure_defaults_only_fills_empty_collections() {
        let service = CatalogService::new(Arc::new(InMemoryCatalogRepository::new()));

        let (categories, banners) = service.ensure_defaults().await.unwrap();
        assert_eq!(categories, default_categories().len() as u64);
        assert_eq!(banners, default_banners().len() as u64);

        assert_eq!(service.ensure_defaults().await.unwrap(), (0, 0));
        assert_eq!(service.list_categories().await.unwrap()[0].name, "vegetables");
    }

    #[tokio::test]
    async fn test_ensure_defaults_skips_existing_categories() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_count_categories().returning(|| Ok(3));
        repo.expect_create_category().times(0);
        repo.expect_count_banners().returning(|| Ok(0));
        repo.expect_create_banner()
            .times(default_banners().len())
            .returning(Ok);

        let service = CatalogService::new(Arc::new(repo));
        let (categories, banners) = service.ensure_defaults().await.unwrap();
        assert_eq!(categories, 0);
        assert_eq!(banners, 2);
    }
}
