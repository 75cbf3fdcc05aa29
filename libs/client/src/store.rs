//! Device-local key/value storage
//!
//! Values are JSON documents stored under fixed keys, mirroring what the
//! mobile app keeps in its async storage.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{ClientError, ClientResult};

pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const USER_DATA_KEY: &str = "userData";
pub const CART_KEY: &str = "freshja_cart";
pub const LIKES_KEY: &str = "freshja_likes";
pub const ORDERS_KEY: &str = "freshja_orders";
pub const OUTBOX_KEY: &str = "freshja_outbox";

#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_raw(&self, key: &str) -> ClientResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String) -> ClientResult<()>;

    async fn remove(&self, key: &str) -> ClientResult<()>;
}

/// Typed access on top of [`LocalStore`]
#[async_trait]
pub trait LocalStoreExt: LocalStore {
    async fn get_json<T: DeserializeOwned + Send>(&self, key: &str) -> ClientResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize + Sync>(&self, key: &str, value: &T) -> ClientResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, raw).await
    }

    /// Missing or unreadable lists read as empty
    async fn get_list<T: DeserializeOwned + Send>(&self, key: &str) -> Vec<T> {
        match self.get_json::<Vec<T>>(key).await {
            Ok(list) => list.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding unreadable local list");
                Vec::new()
            }
        }
    }
}

impl<S: LocalStore + ?Sized> LocalStoreExt for S {}

pub type SharedStore = Arc<dyn LocalStore>;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_raw(&self, key: &str) -> ClientResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> ClientResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a data directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Create the directory if needed
    pub async fn open(dir: impl AsRef<Path>) -> ClientResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> ClientResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(ClientError::Storage(format!("Invalid storage key: {}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl LocalStore for FileStore {
    async fn get_raw(&self, key: &str) -> ClientResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)?).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_raw(&self, key: &str, value: String) -> ClientResult<()> {
        let path = self.path_for(key)?;
        // Write then rename so a crash never leaves a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> ClientResult<()> {
        match tokio::fs::remove_file(self.path_for(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
