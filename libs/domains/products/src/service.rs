//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{
    CreateProduct, Pagination, Product, ProductFilter, ProductListQuery, ProductPage, SearchScope,
    Seller, UpdateProduct,
};
use crate::repository::ProductRepository;

pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn from_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Active products filtered by category and search, newest first
    #[instrument(skip(self))]
    pub async fn list_products(&self, query: ProductListQuery) -> ProductResult<ProductPage> {
        let pagination = query.pagination();
        let filter = ProductFilter::active()
            .with_category(query.category.as_deref())
            .with_search(query.search.as_deref(), SearchScope::Catalog);

        self.page(filter, pagination).await
    }

    /// Every product the seller owns, any status
    #[instrument(skip(self))]
    pub async fn my_products(
        &self,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> ProductResult<ProductPage> {
        let filter = ProductFilter {
            seller_id: Some(seller_id),
            ..Default::default()
        };
        self.page(filter, pagination).await
    }

    /// Run a filter as one page plus the total count
    pub async fn page(
        &self,
        filter: ProductFilter,
        pagination: Pagination,
    ) -> ProductResult<ProductPage> {
        let total = self.repository.count(filter.clone()).await?;
        let products = self.repository.list(filter.paged(pagination)).await?;
        Ok(ProductPage::new(products, total, pagination))
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> ProductResult<Product> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, input), fields(product_name = %input.name, seller_id = %seller.id))]
    pub async fn create_product(
        &self,
        seller: Seller<'_>,
        input: CreateProduct,
    ) -> ProductResult<Product> {
        if let Some(discount) = input.discount_price {
            if discount > input.price {
                return Err(ProductError::Validation(
                    "Discount price cannot exceed price".to_string(),
                ));
            }
        }

        self.repository.create(Product::new(seller, input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        seller_id: Uuid,
        id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<Product> {
        self.repository
            .update_owned(id, seller_id, input)
            .await?
            .ok_or(ProductError::NotOwned(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, seller_id: Uuid, id: Uuid) -> ProductResult<()> {
        if self.repository.delete_owned(id, seller_id).await? {
            Ok(())
        } else {
            Err(ProductError::NotOwned(id))
        }
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductStatus;
    use crate::repository::MockProductRepository;
    use mockall::predicate::{always, eq};

    #[tokio::test]
    async fn test_list_products_filters_active_and_ignores_all_category() {
        let mut mock_repo = MockProductRepository::new();

        mock_repo
            .expect_count()
            .withf(|f| f.status == Some(ProductStatus::Active) && f.category.is_none())
            .returning(|_| Ok(45));
        mock_repo
            .expect_list()
            .withf(|f| f.skip == 20 && f.limit == 20)
            .returning(|_| Ok(vec![]));

        let service = ProductService::new(mock_repo);
        let page = service
            .list_products(ProductListQuery {
                category: Some("all".to_string()),
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total, 45);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_not_found_or_unauthorized() {
        let mut mock_repo = MockProductRepository::new();
        let id = Uuid::now_v7();
        let stranger = Uuid::now_v7();

        mock_repo
            .expect_update_owned()
            .with(eq(id), eq(stranger), always())
            .returning(|_, _, _| Ok(None));

        let service = ProductService::new(mock_repo);
        let err = service
            .update_product(stranger, id, UpdateProduct::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProductError::NotOwned(e) if e == id));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_fails() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_delete_owned().returning(|_, _| Ok(false));

        let service = ProductService::new(mock_repo);
        let result = service.delete_product(Uuid::now_v7(), Uuid::now_v7()).await;
        assert!(matches!(result, Err(ProductError::NotOwned(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_discount_above_price() {
        let mock_repo = MockProductRepository::new();
        let service = ProductService::new(mock_repo);

        let result = service
            .create_product(
                Seller {
                    id: Uuid::now_v7(),
                    name: "John Brown",
                },
                CreateProduct {
                    name: "Callaloo".to_string(),
                    title: "Callaloo".to_string(),
                    category: "vegetables".to_string(),
                    price: 100.0,
                    discount_price: Some(150.0),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(ProductError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let mut mock_repo = MockProductRepository::new();
        mock_repo.expect_get_by_id().returning(|_| Ok(None));

        let service = ProductService::new(mock_repo);
        let result = service.get_product(Uuid::now_v7()).await;
        assert!(matches!(result, Err(ProductError::NotFound(_))));
    }
}
