//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use axum_helpers::errors::is_duplicate_key;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, doc, to_bson},
    options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;
use crate::repository::UserRepository;

pub const COLLECTION: &str = "users";

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<User>(COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> UserResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("idx_email_unique".to_string())
                        .build(),
                )
                .build(),
            IndexModel::builder()
                .keys(doc! { "role": 1, "status": 1 })
                .options(IndexOptions::builder().name("idx_role".to_string()).build())
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("User indexes created successfully");
        Ok(())
    }

    fn after_update() -> FindOneAndUpdateOptions {
        FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build()
    }
}

fn id_bson(id: Uuid) -> Bson {
    to_bson(&id).unwrap_or(Bson::Null)
}

fn now_bson() -> Bson {
    to_bson(&chrono::Utc::now()).unwrap_or(Bson::Null)
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: User) -> UserResult<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => {
                tracing::info!(user_id = %user.id, "User created successfully");
                Ok(user)
            }
            Err(e) if is_duplicate_key(&e) => Err(UserError::AlreadyExists(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id_bson(id) }).await?)
    }

    #[instrument(skip(self))]
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "email": email })
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: Uuid, password_hash: String) -> UserResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id_bson(id) },
                doc! { "$set": { "password": password_hash, "updatedAt": now_bson() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn set_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        liked: bool,
    ) -> UserResult<Option<Vec<Uuid>>> {
        let product = id_bson(product_id);
        let update = if liked {
            doc! {
                "$addToSet": { "likedProducts": product },
                "$set": { "updatedAt": now_bson() },
            }
        } else {
            doc! {
                "$pull": { "likedProducts": product },
                "$set": { "updatedAt": now_bson() },
            }
        };

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id_bson(user_id) }, update)
            .with_options(Self::after_update())
            .await?;
        Ok(updated.map(|user| user.liked_products))
    }

    /// Single pipeline update so concurrent toggles never lose a write
    #[instrument(skip(self))]
    async fn toggle_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> UserResult<Option<(bool, Vec<Uuid>)>> {
        let product = id_bson(product_id);
        let current = doc! { "$ifNull": ["$likedProducts", []] };
        let pipeline = vec![doc! {
            "$set": {
                "likedProducts": {
                    "$cond": [
                        { "$in": [product.clone(), current.clone()] },
                        {
                            "$filter": {
                                "input": current.clone(),
                                "cond": { "$ne": ["$$this", product.clone()] },
                            }
                        },
                        { "$concatArrays": [current, [product]] },
                    ]
                },
                "updatedAt": now_bson(),
            }
        }];

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id_bson(user_id) }, pipeline)
            .with_options(Self::after_update())
            .await?;

        Ok(updated.map(|user| {
            let liked = user.liked_products.contains(&product_id);
            (liked, user.liked_products)
        }))
    }

    #[instrument(skip(self, users), fields(count = users.len()))]
    async fn insert_many(&self, users: Vec<User>) -> UserResult<u64> {
        if users.is_empty() {
            return Ok(0);
        }
        let result = self.collection.insert_many(&users).await?;
        Ok(result.inserted_ids.len() as u64)
    }

    #[instrument(skip(self))]
    async fn count(&self) -> UserResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn delete_all(&self) -> UserResult<u64> {
        Ok(self.collection.delete_many(doc! {}).await?.deleted_count)
    }
}
