use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Product, ProductFilter, UpdateProduct};

/// Data access for products.
///
/// Owner-scoped mutations return `None`/`false` when no product matches both
/// the id and the seller, so callers cannot tell "missing" from "not yours".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> ProductResult<Product>;

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>>;

    /// Fetch several products; unknown ids are skipped
    async fn get_many(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>>;

    /// Matching products, newest first
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>>;

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64>;

    async fn update_owned(
        &self,
        id: Uuid,
        seller_id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>>;

    async fn delete_owned(&self, id: Uuid, seller_id: Uuid) -> ProductResult<bool>;

    async fn insert_many(&self, products: Vec<Product>) -> ProductResult<u64>;

    async fn delete_all(&self) -> ProductResult<u64>;
}

/// In-memory ProductRepository for tests and local runs
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn newest_first(mut products: Vec<Product>) -> Vec<Product> {
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        products
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        tracing::info!(product_id = %product.id, "Created product");
        Ok(product)
    }

    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
    }

    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let products = self.products.read().await;
        let matching: Vec<Product> = products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        let limit = if filter.limit > 0 {
            filter.limit as usize
        } else {
            usize::MAX
        };
        Ok(Self::newest_first(matching)
            .into_iter()
            .skip(filter.skip as usize)
            .take(limit)
            .collect())
    }

    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        let products = self.products.read().await;
        Ok(products.values().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn update_owned(
        &self,
        id: Uuid,
        seller_id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let mut products = self.products.write().await;
        match products.get_mut(&id) {
            Some(product) if product.seller_id == Some(seller_id) => {
                product.apply_update(input);
                Ok(Some(product.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_owned(&self, id: Uuid, seller_id: Uuid) -> ProductResult<bool> {
        let mut products = self.products.write().await;
        let owned = products
            .get(&id)
            .is_some_and(|p| p.seller_id == Some(seller_id));
        if owned {
            products.remove(&id);
        }
        Ok(owned)
    }

    async fn insert_many(&self, items: Vec<Product>) -> ProductResult<u64> {
        let mut products = self.products.write().await;
        let count = items.len() as u64;
        for product in items {
            products.insert(product.id, product);
        }
        Ok(count)
    }

    async fn delete_all(&self) -> ProductResult<u64> {
        let mut products = self.products.write().await;
        let count = products.len() as u64;
        products.clear();
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateProduct, Pagination, Seller};

    fn product(seller_id: Uuid, name: &str, category: &str) -> Product {
        Product::new(
            Seller {
                id: seller_id,
                name: "John Brown",
            },
            CreateProduct {
                name: name.to_string(),
                title: name.to_string(),
                category: category.to_string(),
                price: 100.0,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_paged() {
        let repo = InMemoryProductRepository::new();
        let seller = Uuid::now_v7();
        for i in 0..5 {
            repo.create(product(seller, &format!("p{i}"), "fruits"))
                .await
                .unwrap();
        }

        let page = repo
            .list(ProductFilter::active().paged(Pagination::new(Some(1), Some(2))))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "p4");

        let last = repo
            .list(ProductFilter::active().paged(Pagination::new(Some(3), Some(2))))
            .await
            .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "p0");
    }

    #[tokio::test]
    async fn test_owner_scoped_mutations() {
        let repo = InMemoryProductRepository::new();
        let owner = Uuid::now_v7();
        let stranger = Uuid::now_v7();
        let created = repo.create(product(owner, "Yam", "vegetables")).await.unwrap();

        let update = UpdateProduct {
            stock: Some(3),
            ..Default::default()
        };
        assert!(
            repo.update_owned(created.id, stranger, update.clone())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete_owned(created.id, stranger).await.unwrap());

        let updated = repo
            .update_owned(created.id, owner, update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.stock, 3);
        assert!(repo.delete_owned(created.id, owner).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_many_skips_unknown() {
        let repo = InMemoryProductRepository::new();
        let created = repo
            .create(product(Uuid::now_v7(), "Ackee", "fruits"))
            .await
            .unwrap();
        let found = repo
            .get_many(vec![created.id, Uuid::now_v7()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }
}
