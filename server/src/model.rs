//! Task records and the request payloads that create or change them.
//!
//! # Design
//! Payloads are deserialized leniently (every field optional or defaulted)
//! and then validated into `TaskChanges`, so a missing `text` and a blank
//! `text` produce the same `ValidationError` instead of a serde rejection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Upper bound on `Task::text`, counted in characters after trimming.
pub const MAX_TEXT_LEN: usize = 500;

/// A single task as persisted by a `TaskStore` and returned by the API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// A fresh, uncompleted task stamped with `now`.
    pub fn new(text: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Task text is required")]
    MissingText,

    #[error("Task text must be at most 500 characters")]
    TextTooLong,

    #[error("Invalid request body: {0}")]
    MalformedBody(String),

    #[error("Invalid task id: {0}")]
    InvalidId(String),
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTask {
    #[serde(default, alias = "task")]
    pub text: Option<String>,
}

impl CreateTask {
    /// The normalized text of the task to insert.
    pub fn validate(self) -> Result<String, ValidationError> {
        normalize_text(self.text.as_deref().unwrap_or_default())
    }
}

/// Body of `PUT /api/tasks/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTask {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl UpdateTask {
    pub fn validate(self) -> Result<TaskChanges, ValidationError> {
        let text = self.text.as_deref().map(normalize_text).transpose()?;
        Ok(TaskChanges {
            text,
            completed: self.completed,
        })
    }
}

/// A validated partial update, ready to be applied by a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub text: Option<String>,
    pub completed: Option<bool>,
}

impl TaskChanges {
    pub fn apply(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(text) = &self.text {
            task.text = text.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = now;
    }
}

/// Trim `raw` and check it against the text constraints.
pub fn normalize_text(raw: &str) -> Result<String, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingText);
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TextTooLong);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_serializes_with_camel_case_timestamps() {
        let now = Utc::now();
        let mut task = Task::new("Test".to_string(), now);
        task.id = Uuid::nil();
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["text"], "Test");
        assert_eq!(json["completed"], false);
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn new_task_starts_uncompleted_with_equal_timestamps() {
        let task = Task::new("Fresh".to_string(), Utc::now());
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn normalize_trims_surrounding_whitespace() {
        assert_eq!(normalize_text("  Buy milk \n").unwrap(), "Buy milk");
    }

    #[test]
    fn normalize_rejects_empty_and_blank() {
        assert_eq!(normalize_text(""), Err(ValidationError::MissingText));
        assert_eq!(normalize_text("   \t"), Err(ValidationError::MissingText));
    }

    #[test]
    fn normalize_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_TEXT_LEN);
        assert!(normalize_text(&at_limit).is_ok());
        let over = "a".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(normalize_text(&over), Err(ValidationError::TextTooLong));
    }

    #[test]
    fn create_task_missing_text_is_a_validation_error() {
        let input: CreateTask = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(input.validate(), Err(ValidationError::MissingText));
    }

    #[test]
    fn create_task_accepts_legacy_task_field() {
        let input: CreateTask = serde_json::from_str(r#"{"task":" Walk dog "}"#).unwrap();
        assert_eq!(input.validate().unwrap(), "Walk dog");
    }

    #[test]
    fn update_task_all_fields_optional() {
        let input: UpdateTask = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(input.validate().unwrap(), TaskChanges::default());
    }

    #[test]
    fn update_task_validates_text_when_present() {
        let input: UpdateTask = serde_json::from_str(r#"{"text":"  "}"#).unwrap();
        assert_eq!(input.validate(), Err(ValidationError::MissingText));
    }

    #[test]
    fn changes_apply_only_present_fields() {
        let created = Utc::now();
        let mut task = Task::new("Keep".to_string(), created);
        let later = created + chrono::Duration::seconds(5);
        let changes = TaskChanges {
            text: None,
            completed: Some(true),
        };
        changes.apply(&mut task, later);
        assert_eq!(task.text, "Keep");
        assert!(task.completed);
        assert_eq!(task.created_at, created);
        assert_eq!(task.updated_at, later);
    }
}
