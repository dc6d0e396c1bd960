//! Task storage with pluggable backends.
//!
//! Supports:
//! - `memory`: In-memory storage (non-persistent, for tests and local runs)
//! - `redis`: Redis document store, one JSON document per task

mod memory;
mod redis;

pub use self::memory::InMemoryTaskStore;
pub use self::redis::RedisTaskStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::model::{Task, TaskChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("task store unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Backend(String),

    #[error("corrupt task record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("unsupported task store URL: {0}")]
    UnsupportedUrl(String),
}

/// Task store trait - implemented by all storage backends.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Persist a new uncompleted task with the given (already validated) text.
    async fn insert(&self, text: String) -> Result<Task, StoreError>;

    /// All tasks, newest `created_at` first.
    async fn list(&self) -> Result<Vec<Task>, StoreError>;

    /// Apply `changes` to the task with `id`. `None` when no such task exists.
    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError>;

    /// Remove the task with `id`. `false` when no such task exists.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    /// Whether the backend currently answers.
    async fn ping(&self) -> bool;
}

pub type SharedStore = Arc<dyn TaskStore>;

/// Open the store named by `config.store_url`.
pub async fn connect(config: &Config) -> Result<SharedStore, StoreError> {
    let url = config.store_url.as_str();
    let scheme = url.split_once("://").map(|(scheme, _)| scheme).unwrap_or("");
    match scheme {
        "memory" => Ok(Arc::new(InMemoryTaskStore::new())),
        "redis" | "rediss" => {
            let store = RedisTaskStore::connect(url, config.store_credentials.as_ref()).await?;
            Ok(Arc::new(store))
        }
        _ => Err(StoreError::UnsupportedUrl(url.to_string())),
    }
}
