//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson, to_document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::ProductResult;
use crate::models::{Product, ProductFilter, UpdateProduct};
use crate::repository::ProductRepository;

pub const COLLECTION: &str = "products";

pub struct MongoProductRepository {
    collection: Collection<Product>,
}

impl MongoProductRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Product>(COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> ProductResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "status": 1, "category": 1, "createdAt": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_status_category".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "sellerId": 1, "createdAt": -1 })
                .options(IndexOptions::builder().name("idx_seller".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "isFeatured": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_featured".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    pub(crate) fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(status) = filter.status {
            doc.insert("status", status.to_string());
        }

        if let Some(ref category) = filter.category {
            doc.insert("category", category);
        }

        if let Some(seller_id) = filter.seller_id {
            doc.insert("sellerId", id_bson(seller_id));
        }

        if let Some(featured) = filter.featured {
            doc.insert("isFeatured", featured);
        }

        if let Some(ref search) = filter.search {
            let pattern = regex::escape(search);
            let clauses: Vec<Document> = filter
                .scope
                .fields()
                .iter()
                .map(|field| {
                    let mut clause = Document::new();
                    clause.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
                    clause
                })
                .collect();
            doc.insert("$or", clauses);
        }

        doc
    }
}

pub(crate) fn id_bson(id: Uuid) -> Bson {
    to_bson(&id).unwrap_or(Bson::Null)
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    async fn create(&self, product: Product) -> ProductResult<Product> {
        self.collection.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        Ok(self.collection.find_one(doc! { "_id": id_bson(id) }).await?)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn get_many(&self, ids: Vec<Uuid>) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Bson> = ids.into_iter().map(id_bson).collect();
        let cursor = self.collection.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ProductFilter) -> ProductResult<Vec<Product>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.skip)
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ProductFilter) -> ProductResult<u64> {
        Ok(self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?)
    }

    #[instrument(skip(self, input))]
    async fn update_owned(
        &self,
        id: Uuid,
        seller_id: Uuid,
        input: UpdateProduct,
    ) -> ProductResult<Option<Product>> {
        let mut set = to_document(&input)?;
        set.insert("updatedAt", to_bson(&chrono::Utc::now())?);

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id_bson(id), "sellerId": id_bson(seller_id) },
                doc! { "$set": set },
            )
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(product_id = %id, "Product updated successfully");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_owned(&self, id: Uuid, seller_id: Uuid) -> ProductResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id_bson(id), "sellerId": id_bson(seller_id) })
            .await?;
        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn insert_many(&self, products: Vec<Product>) -> ProductResult<u64> {
        if products.is_empty() {
            return Ok(0);
        }
        let result = self.collection.insert_many(&products).await?;
        Ok(result.inserted_ids.len() as u64)
    }

    #[instrument(skip(self))]
    async fn delete_all(&self) -> ProductResult<u64> {
        Ok(self.collection.delete_many(doc! {}).await?.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProductStatus, SearchScope};

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoProductRepository::build_filter(&ProductFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_active_category() {
        let filter = ProductFilter::active().with_category(Some("fruits"));
        let doc = MongoProductRepository::build_filter(&filter);
        assert_eq!(doc.get_str("status").unwrap(), "active");
        assert_eq!(doc.get_str("category").unwrap(), "fruits");
    }

    #[test]
    fn test_build_filter_search_scopes() {
        let filter = ProductFilter::active().with_search(Some("yam"), SearchScope::Catalog);
        let doc = MongoProductRepository::build_filter(&filter);
        let or = doc.get_array("$or").unwrap();
        assert_eq!(or.len(), 4);

        let filter = ProductFilter {
            status: Some(ProductStatus::Active),
            ..Default::default()
        }
        .with_search(Some("yam"), SearchScope::Storefront);
        let doc = MongoProductRepository::build_filter(&filter);
        let fields: Vec<String> = doc
            .get_array("$or")
            .unwrap()
            .iter()
            .filter_map(|b| b.as_document())
            .filter_map(|d| d.keys().next().cloned())
            .collect();
        assert!(fields.contains(&"description".to_string()));
        assert!(!fields.contains(&"category".to_string()));
    }

    #[test]
    fn test_build_filter_search_matches_literally() {
        let filter = ProductFilter::active().with_search(Some("ackee (1.5kg)"), SearchScope::Catalog);
        let doc = MongoProductRepository::build_filter(&filter);
        let first = doc.get_array("$or").unwrap()[0].as_document().unwrap();
        let clause = first.values().next().unwrap().as_document().unwrap();

        assert_eq!(clause.get_str("$regex").unwrap(), r"ackee \(1\.5kg\)");
        assert_eq!(clause.get_str("$options").unwrap(), "i");
    }
}
