//! Redis-backed task store.
//!
//! Each task is a JSON document under `task:{id}`. The sorted set
//! `tasks:created` indexes ids by an insertion sequence drawn from the
//! `tasks:seq` counter, which orders them by creation time.

use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, Client, IntoConnectionInfo, RedisError};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use super::{StoreError, TaskStore};
use crate::config::StoreCredentials;
use crate::model::{Task, TaskChanges};

const INDEX_KEY: &str = "tasks:created";
const SEQ_KEY: &str = "tasks:seq";

fn task_key(id: &str) -> String {
    format!("task:{id}")
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            StoreError::Unavailable(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

fn decode(id: &str, raw: &str) -> Result<Task, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Corrupt {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

fn encode(task: &Task) -> Result<String, StoreError> {
    serde_json::to_string(task).map_err(|e| StoreError::Backend(e.to_string()))
}

#[derive(Clone)]
pub struct RedisTaskStore {
    conn: MultiplexedConnection,
}

impl RedisTaskStore {
    /// Connect to `url`, overriding any URL credentials with `credentials`.
    pub async fn connect(
        url: &str,
        credentials: Option<&StoreCredentials>,
    ) -> Result<Self, StoreError> {
        let mut info = url
            .into_connection_info()
            .map_err(|e| StoreError::UnsupportedUrl(format!("{url}: {e}")))?;
        if let Some(creds) = credentials {
            info.redis.username = Some(creds.username.clone());
            info.redis.password = Some(creds.password.clone());
        }

        let client = Client::open(info)?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let store = Self { conn };
        if !store.ping().await {
            return Err(StoreError::Unavailable("PING failed".to_string()));
        }
        info!(authenticated = credentials.is_some(), "Connected to task store");
        Ok(store)
    }
}

#[async_trait]
impl TaskStore for RedisTaskStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn insert(&self, text: String) -> Result<Task, StoreError> {
        let task = Task::new(text, Utc::now());
        let id = task.id.to_string();
        let doc = encode(&task)?;

        let mut conn = self.conn.clone();
        let seq: u64 = conn.incr(SEQ_KEY, 1u64).await?;
        ::redis::pipe()
            .atomic()
            .set(task_key(&id), doc)
            .ignore()
            .zadd(INDEX_KEY, &id, seq)
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;
        debug!(%id, seq, "Inserted task");
        Ok(task)
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let mut conn = self.conn.clone();
        let ids: Vec<String> = conn.zrevrange(INDEX_KEY, 0, -1).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = ids.iter().map(|id| task_key(id)).collect();
        let docs: Vec<Option<String>> = ::redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut tasks = Vec::with_capacity(ids.len());
        for (id, raw) in ids.iter().zip(docs) {
            // Deleted between the index read and the document read.
            if let Some(raw) = raw {
                tasks.push(decode(id, &raw)?);
            }
        }
        Ok(tasks)
    }

    async fn update(&self, id: Uuid, changes: &TaskChanges) -> Result<Option<Task>, StoreError> {
        let id = id.to_string();
        let key = task_key(&id);
        let mut conn = self.conn.clone();

        let raw: Option<String> = conn.get(&key).await?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut task = decode(&id, &raw)?;
        changes.apply(&mut task, Utc::now());

        // XX: write only if the document still exists, so an update racing a
        // delete cannot bring the task back.
        let written: Option<String> = ::redis::cmd("SET")
            .arg(&key)
            .arg(encode(&task)?)
            .arg("XX")
            .query_async(&mut conn)
            .await?;
        if written.is_none() {
            return Ok(None);
        }
        Ok(Some(task))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let id = id.to_string();
        let mut conn = self.conn.clone();
        let (removed, _): (usize, usize) = ::redis::pipe()
            .atomic()
            .del(task_key(&id))
            .zrem(INDEX_KEY, &id)
            .query_async(&mut conn)
            .await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        ::redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}
