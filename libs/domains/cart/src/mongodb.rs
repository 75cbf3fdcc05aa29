//! MongoDB implementation of CartRepository
//!
//! Every mutation is a single-document update guarded by filter conditions,
//! so concurrent devices never overwrite each other's lines.

use async_trait::async_trait;
use mongodb::{
    Collection, Database,
    bson::{Bson, Document, doc, to_bson},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CartError, CartResult};
use crate::models::{Cart, CartItem, MUTATION_HISTORY};
use crate::repository::CartRepository;

pub const COLLECTION: &str = "carts";

pub struct MongoCartRepository {
    collection: Collection<Cart>,
}

impl MongoCartRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Cart>(COLLECTION),
        }
    }

    fn after_update() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }

    /// Create an empty cart document if the user has none
    async fn ensure_cart(&self, user_id: Uuid) -> CartResult<()> {
        self.collection
            .update_one(
                doc! { "_id": id_bson(user_id) },
                doc! { "$setOnInsert": { "items": [], "appliedMutations": [], "updatedAt": now_bson() } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn apply(&self, filter: Document, update: Document) -> CartResult<Option<Cart>> {
        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .with_options(Self::after_update())
            .await?)
    }

    /// Like `apply`, with `$[line]` bound to the item for `product`
    async fn apply_to_line(
        &self,
        filter: Document,
        update: Document,
        product: Bson,
    ) -> CartResult<Option<Cart>> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .array_filters(vec![doc! { "line.productId": product }])
            .build();
        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .with_options(options)
            .await?)
    }

    async fn load(&self, user_id: Uuid) -> CartResult<Cart> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id_bson(user_id) })
            .await?
            .unwrap_or_else(|| Cart::empty(user_id)))
    }
}

fn id_bson(id: Uuid) -> Bson {
    to_bson(&id).unwrap_or(Bson::Null)
}

fn now_bson() -> Bson {
    to_bson(&chrono::Utc::now()).unwrap_or(Bson::Null)
}

fn item_bson(item: &CartItem) -> CartResult<Bson> {
    to_bson(item).map_err(|e| CartError::Database(e.to_string()))
}

#[async_trait]
impl CartRepository for MongoCartRepository {
    #[instrument(skip(self))]
    async fn get(&self, user_id: Uuid) -> CartResult<Cart> {
        self.load(user_id).await
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn add(
        &self,
        user_id: Uuid,
        item: CartItem,
        mutation_id: Option<String>,
    ) -> CartResult<(bool, Cart)> {
        self.ensure_cart(user_id).await?;

        let product = id_bson(item.product_id);
        let mut guard = doc! { "_id": id_bson(user_id) };
        let mut remember = Document::new();
        if let Some(ref id) = mutation_id {
            guard.insert("appliedMutations", doc! { "$ne": id.as_str() });
            remember.insert(
                "$push",
                doc! { "appliedMutations": { "$each": [id.as_str()], "$slice": -(MUTATION_HISTORY as i64) } },
            );
        }

        // Two attempts: a concurrent insert of the same product between the
        // increment and the push makes the first round miss both filters.
        for _ in 0..2 {
            let mut filter = guard.clone();
            filter.insert("items.productId", product.clone());
            let mut update = remember.clone();
            update.insert(
                "$inc",
                doc! { "items.$[line].quantity": i64::from(item.quantity) },
            );
            update.insert(
                "$set",
                doc! {
                    "items.$[line].name": item.name.as_str(),
                    "items.$[line].price": item.price,
                    "items.$[line].image": item.image.as_deref(),
                    "updatedAt": now_bson(),
                },
            );
            if let Some(cart) = self.apply_to_line(filter, update, product.clone()).await? {
                return Ok((true, cart));
            }

            let mut filter = guard.clone();
            filter.insert("items.productId", doc! { "$ne": product.clone() });
            let mut update = Document::new();
            let mut push = doc! { "items": item_bson(&item)? };
            if let Some(ref id) = mutation_id {
                push.insert(
                    "appliedMutations",
                    doc! { "$each": [id.as_str()], "$slice": -(MUTATION_HISTORY as i64) },
                );
            }
            update.insert("$push", push);
            update.insert("$set", doc! { "updatedAt": now_bson() });
            if let Some(cart) = self.apply(filter, update).await? {
                return Ok((true, cart));
            }

            let cart = self.load(user_id).await?;
            if let Some(ref id) = mutation_id {
                if cart.has_applied(id) {
                    tracing::debug!(mutation_id = %id, "Cart mutation already applied");
                    return Ok((false, cart));
                }
            }
        }

        Err(CartError::Database(
            "Cart changed concurrently, retry the request".to_string(),
        ))
    }

    #[instrument(skip(self, item), fields(product_id = %item.product_id))]
    async fn set(&self, user_id: Uuid, item: CartItem) -> CartResult<Cart> {
        if item.quantity == 0 {
            return self.remove(user_id, item.product_id).await;
        }
        self.ensure_cart(user_id).await?;

        let product = id_bson(item.product_id);
        let replaced = self
            .apply_to_line(
                doc! { "_id": id_bson(user_id), "items.productId": product.clone() },
                doc! { "$set": { "items.$[line]": item_bson(&item)?, "updatedAt": now_bson() } },
                product.clone(),
            )
            .await?;
        if let Some(cart) = replaced {
            return Ok(cart);
        }

        let pushed = self
            .apply(
                doc! { "_id": id_bson(user_id), "items.productId": { "$ne": product } },
                doc! { "$push": { "items": item_bson(&item)? }, "$set": { "updatedAt": now_bson() } },
            )
            .await?;
        match pushed {
            Some(cart) => Ok(cart),
            None => self.load(user_id).await,
        }
    }

    #[instrument(skip(self))]
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> CartResult<Cart> {
        let updated = self
            .apply(
                doc! { "_id": id_bson(user_id) },
                doc! {
                    "$pull": { "items": { "productId": id_bson(product_id) } },
                    "$set": { "updatedAt": now_bson() },
                },
            )
            .await?;
        Ok(updated.unwrap_or_else(|| Cart::empty(user_id)))
    }

    #[instrument(skip(self))]
    async fn clear(&self, user_id: Uuid) -> CartResult<Cart> {
        let updated = self
            .apply(
                doc! { "_id": id_bson(user_id) },
                doc! { "$set": { "items": [], "updatedAt": now_bson() } },
            )
            .await?;
        Ok(updated.unwrap_or_else(|| Cart::empty(user_id)))
    }
}
