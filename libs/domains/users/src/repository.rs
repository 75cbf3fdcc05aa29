use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::User;

/// Repository trait for User persistence.
///
/// Like mutations are single-document updates and return the resulting
/// liked list, or `None` when the user does not exist.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; fails with `AlreadyExists` on a taken email
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Lookup by normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    async fn email_exists(&self, email: &str) -> UserResult<bool>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> UserResult<bool>;

    /// Add or remove `product_id` from the liked set
    async fn set_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        liked: bool,
    ) -> UserResult<Option<Vec<Uuid>>>;

    /// Flip membership of `product_id`; returns the new state and list
    async fn toggle_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> UserResult<Option<(bool, Vec<Uuid>)>>;

    async fn insert_many(&self, users: Vec<User>) -> UserResult<u64>;

    async fn count(&self) -> UserResult<u64>;

    async fn delete_all(&self) -> UserResult<u64>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::AlreadyExists(user.email));
        }

        users.insert(user.id, user.clone());
        tracing::info!(user_id = %user.id, email = %user.email, "Created user");
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> UserResult<bool> {
        let mut users = self.users.write().await;
        match users.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash;
                user.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        liked: bool,
    ) -> UserResult<Option<Vec<Uuid>>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(None);
        };

        let present = user.liked_products.contains(&product_id);
        if liked && !present {
            user.liked_products.push(product_id);
        } else if !liked && present {
            user.liked_products.retain(|id| *id != product_id);
        }
        Ok(Some(user.liked_products.clone()))
    }

    async fn toggle_like(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> UserResult<Option<(bool, Vec<Uuid>)>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(None);
        };

        let liked = if user.liked_products.contains(&product_id) {
            user.liked_products.retain(|id| *id != product_id);
            false
        } else {
            user.liked_products.push(product_id);
            true
        };
        Ok(Some((liked, user.liked_products.clone())))
    }

    async fn insert_many(&self, items: Vec<User>) -> UserResult<u64> {
        let mut users = self.users.write().await;
        let count = items.len() as u64;
        for user in items {
            users.insert(user.id, user);
        }
        Ok(count)
    }

    async fn count(&self) -> UserResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn delete_all(&self) -> UserResult<u64> {
        let mut users = self.users.write().await;
        let count = users.len() as u64;
        users.clear();
        Ok(count)
    }
}
