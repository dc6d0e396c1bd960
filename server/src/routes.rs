use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::ApiError;
use crate::model::{CreateTask, Task, UpdateTask, ValidationError};
use crate::store::SharedStore;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseState {
    Connected,
    Disconnected,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
    pub database: DatabaseState,
}

fn parse_id(raw: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(raw).map_err(|_| ValidationError::InvalidId(raw.to_string()))
}

pub async fn health(State(store): State<SharedStore>) -> Json<Health> {
    let database = if store.ping().await {
        DatabaseState::Connected
    } else {
        DatabaseState::Disconnected
    };
    Json(Health {
        status: "ok".to_string(),
        database,
    })
}

pub async fn create_task(
    State(store): State<SharedStore>,
    payload: Result<Json<CreateTask>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let Json(input) = payload?;
    let text = input.validate()?;
    let task = store.insert(text).await.map_err(|e| {
        error!(error = %e, "Create task error");
        ApiError::BadRequest(e.to_string())
    })?;
    debug!(id = %task.id, "Created task");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(State(store): State<SharedStore>) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = store.list().await.map_err(|e| {
        error!(error = %e, "Get tasks error");
        ApiError::Internal("Failed to fetch tasks")
    })?;
    Ok(Json(tasks))
}

pub async fn update_task(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTask>, JsonRejection>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(&id)?;
    let Json(input) = payload?;
    let changes = input.validate()?;
    let updated = store.update(id, &changes).await.map_err(|e| {
        error!(error = %e, %id, "Update task error");
        ApiError::BadRequest(e.to_string())
    })?;
    updated.map(Json).ok_or(ApiError::NotFound)
}

pub async fn delete_task(
    State(store): State<SharedStore>,
    Path(id): Path<String>,
) -> Result<Json<DeleteConfirmation>, ApiError> {
    let id = parse_id(&id).map_err(|e| {
        error!(error = %e, "Delete task error");
        ApiError::Internal("Failed to delete task")
    })?;
    let removed = store.delete(id).await.map_err(|e| {
        error!(error = %e, %id, "Delete task error");
        ApiError::Internal("Failed to delete task")
    })?;
    if !removed {
        return Err(ApiError::NotFound);
    }
    Ok(Json(DeleteConfirmation {
        message: "Task deleted successfully".to_string(),
    }))
}
