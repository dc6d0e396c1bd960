//! In-memory task store (non-persistent).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::model::{Task, TaskChanges};

#[derive(Default)]
struct Inner {
    // Insertion sequence per task; breaks `created_at` ties.
    tasks: HashMap<Uuid, (u64, Task)>,
    next_seq: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryTaskStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, text: String) -> Result<Task, StoreError> {
        let task = Task::new(text, Utc::now());
        let mut inner = self.inner.write().await;
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.tasks.insert(task.id, (seq, task.clone()));
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&(u64, Task)> = inner.tasks.values().collect();
        entries.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b_seq.cmp(a_seq))
        });
        Ok(entries.into_iter().map(|(_, task)| task.clone()).collect())
    }

    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some((_, task)) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(task, Utc::now());
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.tasks.remove(&id).is_some())
    }

    async fn ping(&self) -> bool {
        true
    }
}
