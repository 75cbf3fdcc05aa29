use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

/// Reset codes are valid for this many minutes after issue
pub const CODE_TTL_MINUTES: i64 = 15;

/// A pending password reset for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetEntry {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub verified: bool,
}

impl ResetEntry {
    pub fn new(code: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            expires_at: issued_at + Duration::minutes(CODE_TTL_MINUTES),
            verified: false,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, code: &str) -> bool {
        self.code == code.trim()
    }
}

/// Storage for reset codes, one entry per user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResetCodeStore: Send + Sync {
    /// Store a new entry, replacing any previous one for the user
    async fn issue(&self, user_id: Uuid, entry: ResetEntry);

    async fn get(&self, user_id: Uuid) -> Option<ResetEntry>;

    /// Returns false when there is no entry
    async fn mark_verified(&self, user_id: Uuid) -> bool;

    async fn remove(&self, user_id: Uuid);

    /// Drop every entry expired at `now`; returns how many were removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryResetCodeStore {
    entries: Arc<RwLock<HashMap<Uuid, ResetEntry>>>,
}

impl InMemoryResetCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResetCodeStore for InMemoryResetCodeStore {
    async fn issue(&self, user_id: Uuid, entry: ResetEntry) {
        self.entries.write().await.insert(user_id, entry);
    }

    async fn get(&self, user_id: Uuid) -> Option<ResetEntry> {
        self.entries.read().await.get(&user_id).cloned()
    }

    async fn mark_verified(&self, user_id: Uuid) -> bool {
        match self.entries.write().await.get_mut(&user_id) {
            Some(entry) => {
                entry.verified = true;
                true
            }
            None => false,
        }
    }

    async fn remove(&self, user_id: Uuid) {
        self.entries.write().await.remove(&user_id);
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

/// Periodically purge expired codes until `shutdown` fires
pub fn spawn_purge_task<S>(
    store: Arc<S>,
    interval: std::time::Duration,
    mut shutdown: broadcast::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    S: ResetCodeStore + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = store.purge_expired(Utc::now()).await;
                    if purged > 0 {
                        tracing::debug!(purged, "Purged expired reset codes");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Reset code purge task stopped");
                    break;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_supersedes_previous_code() {
        let store = InMemoryResetCodeStore::new();
        let user_id = Uuid::now_v7();

        store.issue(user_id, ResetEntry::new("111111", Utc::now())).await;
        store.mark_verified(user_id).await;
        store.issue(user_id, ResetEntry::new("222222", Utc::now())).await;

        let entry = store.get(user_id).await.unwrap();
        assert_eq!(entry.code, "222222");
        assert!(!entry.verified);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = InMemoryResetCodeStore::new();
        let now = Utc::now();
        store
            .issue(Uuid::now_v7(), ResetEntry::new("111111", now - Duration::hours(1)))
            .await;
        store.issue(Uuid::now_v7(), ResetEntry::new("222222", now)).await;

        assert_eq!(store.purge_expired(now).await, 1);
        assert_eq!(store.len().await, 1);
    }

    #[test]
    fn test_entry_expiry_and_match() {
        let issued = Utc::now();
        let entry = ResetEntry::new("123456", issued);
        assert!(!entry.is_expired(issued + Duration::minutes(CODE_TTL_MINUTES)));
        assert!(entry.is_expired(issued + Duration::minutes(CODE_TTL_MINUTES + 1)));
        assert!(entry.matches(" 123456 "));
        assert!(!entry.matches("654321"));
    }

    #[test]
    fn test_codes_last_fifteen_minutes() {
        let issued = Utc::now();
        let entry = ResetEntry::new("123456", issued);
        assert_eq!(entry.expires_at - issued, Duration::minutes(15));
    }

    #[tokio::test]
    async fn test_purge_task_stops_on_shutdown() {
        let store = Arc::new(InMemoryResetCodeStore::new());
        store
            .issue(
                Uuid::now_v7(),
                ResetEntry::new("111111", Utc::now() - Duration::hours(1)),
            )
            .await;

        let (tx, rx) = broadcast::channel(1);
        let handle = spawn_purge_task(store.clone(), std::time::Duration::from_millis(10), rx);

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(store.len().await, 0);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
