//! Stateless HTTP request builder and response parser for the task API.
//!
//! # Design
//! `TaskApi` holds only the server origin and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. A `Transport` performs the round-trip in between.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTask, DeleteConfirmation, Health, Task, UpdateTask};

/// Path under which the task resources live.
pub const BASE_PATH: &str = "/api/tasks";

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct TaskApi {
    origin: String,
}

impl TaskApi {
    /// `origin` is scheme, host and port, e.g. `http://localhost:8080`.
    pub fn new(origin: &str) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}{BASE_PATH}", self.origin)
    }

    fn task_url(&self, id: Uuid) -> String {
        format!("{}{BASE_PATH}/{id}", self.origin)
    }

    pub fn build_health(&self) -> HttpRequest {
        bodyless(HttpMethod::Get, format!("{}/ok", self.origin))
    }

    pub fn build_list_tasks(&self) -> HttpRequest {
        bodyless(HttpMethod::Get, self.tasks_url())
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Post, self.tasks_url(), input)
    }

    pub fn build_update_task(&self, id: Uuid, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        with_json_body(HttpMethod::Put, self.task_url(id), input)
    }

    pub fn build_delete_task(&self, id: Uuid) -> HttpRequest {
        bodyless(HttpMethod::Delete, self.task_url(id))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<Health, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<Vec<Task>, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response, 201)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response, 200)
    }

    pub fn parse_delete_task(
        &self,
        response: HttpResponse,
    ) -> Result<DeleteConfirmation, ApiError> {
        parse_json(response, 200)
    }
}

fn bodyless(method: HttpMethod, url: String) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: vec![("accept".to_string(), JSON.to_string())],
        body: None,
    }
}

fn with_json_body<T: Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![
            ("accept".to_string(), JSON.to_string()),
            ("content-type".to_string(), JSON.to_string()),
        ],
        body: Some(body),
    })
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
