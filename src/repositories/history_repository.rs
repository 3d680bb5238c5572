use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{errors::AppResult, models::domain::Snapshot};

/// Maximum number of snapshots retained; older ones are dropped.
pub const HISTORY_LIMIT: usize = 10;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Stores a snapshot as the newest entry.
    async fn push(&self, snapshot: Snapshot) -> AppResult<()>;
    /// Newest first.
    async fn list(&self) -> AppResult<Vec<Snapshot>>;
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Snapshot>>;
    async fn count(&self) -> AppResult<usize>;
    async fn clear(&self) -> AppResult<()>;
}

pub struct InMemoryHistoryRepository {
    snapshots: RwLock<VecDeque<Snapshot>>,
    limit: usize,
}

impl InMemoryHistoryRepository {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            snapshots: RwLock::new(VecDeque::with_capacity(limit)),
            limit,
        }
    }
}

impl Default for InMemoryHistoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryRepository for InMemoryHistoryRepository {
    async fn push(&self, snapshot: Snapshot) -> AppResult<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.push_front(snapshot);
        snapshots.truncate(self.limit);
        Ok(())
    }

    async fn list(&self) -> AppResult<Vec<Snapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.iter().cloned().collect())
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Snapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.iter().find(|s| s.id == *id).cloned())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.snapshots.read().await.len())
    }

    async fn clear(&self) -> AppResult<()> {
        self.snapshots.write().await.clear();
        Ok(())
    }
}
