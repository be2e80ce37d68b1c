//! Session persistence.

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use super::SessionError;
use crate::background;

/// What a store keeps per token.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionRecord {
    pub data: HashMap<String, String>,
    /// After this instant the record must no longer be returned by `load`.
    pub deadline: DateTime<Utc>,
}

/// Backend the [`SessionManager`](super::SessionManager) persists sessions to.
///
/// Implementations are shared by every in-flight request and must be safe
/// for concurrent use.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Returns the record for `token`, or `None` if unknown or expired.
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Inserts or replaces the record for `token`.
    async fn save(&self, token: &str, record: SessionRecord) -> Result<(), SessionError>;

    /// Removes `token`. Deleting an unknown token is not an error.
    async fn delete(&self, token: &str) -> Result<(), SessionError>;
}

/// In-process session store.
///
/// Expired records are ignored by [`load`](SessionStore::load) and removed
/// by [`sweep`](MemoryStore::sweep), which
/// [`start_sweeper`](MemoryStore::start_sweeper) runs periodically.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Copy of every record keyed by token, expired ones included.
    pub async fn snapshot(&self) -> HashMap<String, SessionRecord> {
        self.records.read().await.clone()
    }

    /// Removes every expired record and returns how many were dropped.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.deadline > now);
        before - records.len()
    }

    /// Sweeps every `interval` until the store is dropped.
    pub fn start_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        background::spawn("session-sweeper", async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = weak.upgrade() else { break };
                let removed = store.sweep().await;
                if removed > 0 {
                    debug!(removed, "swept expired sessions");
                }
            }
        })
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, SessionError> {
        let records = self.records.read().await;
        Ok(records
            .get(token)
            .filter(|r| r.deadline > Utc::now())
            .cloned())
    }

    async fn save(&self, token: &str, record: SessionRecord) -> Result<(), SessionError> {
        self.records.write().await.insert(token.to_owned(), record);
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), SessionError> {
        self.records.write().await.remove(token);
        Ok(())
    }
}
