//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::{Order, OrderStatus};
use crate::repository::OrderRepository;

pub const COLLECTION: &str = "orders";

pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Order>(COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> OrderResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "user": 1, "createdAt": -1 })
                .options(IndexOptions::builder().name("idx_user".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "status": 1, "createdAt": -1 })
                .options(IndexOptions::builder().name("idx_status".to_string()).build())
                .build(),
            // Only orders that carry a clientRef take part in the constraint
            IndexModel::builder()
                .keys(doc! { "user": 1, "clientRef": 1 })
                .options(
                    IndexOptions::builder()
                        .name("uniq_user_client_ref".to_string())
                        .unique(true)
                        .partial_filter_expression(doc! { "clientRef": { "$type": "string" } })
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Order indexes created successfully");
        Ok(())
    }

    async fn find_sorted(&self, filter: Document) -> OrderResult<Vec<Order>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }
}

fn id_bson(id: Uuid) -> Bson {
    to_bson(&id).unwrap_or(Bson::Null)
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn create(&self, order: Order) -> OrderResult<Order> {
        self.collection.insert_one(&order).await?;
        tracing::info!(order_id = %order.id, total = order.total, "Order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(doc! { "_id": id_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn find_by_client_ref(
        &self,
        user_id: Uuid,
        client_ref: &str,
    ) -> OrderResult<Option<Order>> {
        Ok(self
            .collection
            .find_one(doc! { "user": id_bson(user_id), "clientRef": client_ref })
            .await?)
    }

    #[instrument(skip(self))]
    async fn list_by_user(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        self.find_sorted(doc! { "user": id_bson(user_id) }).await
    }

    #[instrument(skip(self))]
    async fn list(&self, status: Option<OrderStatus>) -> OrderResult<Vec<Order>> {
        let mut filter = Document::new();
        if let Some(status) = status {
            filter.insert("status", status.to_string());
        }
        self.find_sorted(filter).await
    }

    #[instrument(skip(self))]
    async fn transition(
        &self,
        id: Uuid,
        from: OrderStatus,
        to: OrderStatus,
    ) -> OrderResult<Option<Order>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": id_bson(id), "status": from.to_string() },
                doc! {
                    "$set": {
                        "status": to.to_string(),
                        "updatedAt": to_bson(&chrono::Utc::now()).unwrap_or(Bson::Null),
                    }
                },
            )
            .with_options(options)
            .await?;

        if updated.is_some() {
            tracing::info!(order_id = %id, %from, %to, "Order status changed");
        }
        Ok(updated)
    }
}
