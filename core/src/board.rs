//! Client-side task list with optimistic updates.
//!
//! # Design
//! `TaskBoard` mirrors the server's list and a draft input buffer. Toggle
//! and remove change the local list before the request goes out; if the
//! request fails the list is restored from a snapshot taken just before the
//! change. Failures are logged and returned, never retried. Overlapping
//! actions on the same task are not coordinated: the last response wins.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::TaskApi;
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{CreateTask, Task, UpdateTask};

pub struct TaskBoard<T> {
    api: TaskApi,
    transport: T,
    tasks: Vec<Task>,
    draft: String,
}

impl<T: Transport> TaskBoard<T> {
    pub fn new(api: TaskApi, transport: T) -> Self {
        Self {
            api,
            transport,
            tasks: Vec::new(),
            draft: String::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Replace the local list with the server's. On failure the list is
    /// left as it was.
    pub fn load(&mut self) -> Result<(), ApiError> {
        let request = self.api.build_list_tasks();
        let outcome = self
            .transport
            .execute(request)
            .and_then(|response| self.api.parse_list_tasks(response));
        match outcome {
            Ok(tasks) => {
                debug!(count = tasks.len(), "Loaded tasks");
                self.tasks = tasks;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Failed to load tasks");
                Err(err)
            }
        }
    }

    /// Create a task from the draft. A blank draft sends nothing and
    /// returns `Ok(None)`; on success the new task is appended and the
    /// draft cleared.
    pub fn submit(&mut self) -> Result<Option<Uuid>, ApiError> {
        if self.draft.trim().is_empty() {
            return Ok(None);
        }
        let input = CreateTask {
            text: self.draft.clone(),
        };
        let outcome = self
            .api
            .build_create_task(&input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.api.parse_create_task(response));
        match outcome {
            Ok(task) => {
                let id = task.id;
                self.tasks.push(task);
                self.draft.clear();
                Ok(Some(id))
            }
            Err(err) => {
                warn!(error = %err, "Failed to create task");
                Err(err)
            }
        }
    }

    /// Flip `completed` on the task with `id`, reverting if the server
    /// rejects the change.
    pub fn toggle(&mut self, id: Uuid) -> Result<(), ApiError> {
        let snapshot = self.tasks.clone();
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            warn!(%id, "Toggle of unknown task");
            return Err(ApiError::NotFound);
        };
        task.completed = !task.completed;
        let input = UpdateTask {
            text: None,
            completed: Some(task.completed),
        };

        let outcome = self
            .api
            .build_update_task(id, &input)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| self.api.parse_update_task(response));
        let updated = self.settle(snapshot, outcome, "toggle")?;
        if let Some(local) = self.tasks.iter_mut().find(|t| t.id == id) {
            *local = updated;
        }
        Ok(())
    }

    /// Drop the task with `id` locally, then on the server. The local list
    /// is restored if the server delete fails.
    pub fn remove(&mut self, id: Uuid) -> Result<(), ApiError> {
        let snapshot = self.tasks.clone();
        self.tasks.retain(|t| t.id != id);

        let request = self.api.build_delete_task(id);
        let outcome = self
            .transport
            .execute(request)
            .and_then(|response| self.api.parse_delete_task(response));
        self.settle(snapshot, outcome, "remove").map(|_| ())
    }

    fn settle<R>(
        &mut self,
        snapshot: Vec<Task>,
        outcome: Result<R, ApiError>,
        action: &str,
    ) -> Result<R, ApiError> {
        outcome.map_err(|err| {
            warn!(error = %err, action, "Request failed, reverting local tasks");
            self.tasks = snapshot;
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn respond(self, status: u16, body: impl Into<String>) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.into(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.borrow().clone()
        }
    }

    impl Transport for ScriptedTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected request")
        }
    }

    fn task(n: u128, text: &str, completed: bool) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Task {
            id: Uuid::from_u128(n),
            text: text.to_string(),
            completed,
            created_at: at,
            updated_at: at,
        }
    }

    fn json(value: &impl serde::Serialize) -> String {
        serde_json::to_string(value).unwrap()
    }

    /// A board whose initial `load` returns `tasks`; responses already
    /// scripted on `transport` are served after it.
    fn loaded_board(transport: ScriptedTransport, tasks: &[Task]) -> TaskBoard<ScriptedTransport> {
        transport.responses.borrow_mut().push_front(Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: json(&tasks),
        }));
        let mut board = TaskBoard::new(TaskApi::new("http://tasks.test"), transport);
        board.load().unwrap();
        board
    }

    #[test]
    fn load_replaces_tasks() {
        let tasks = vec![task(2, "b", false), task(1, "a", true)];
        let board = loaded_board(ScriptedTransport::default(), &tasks);
        assert_eq!(board.tasks(), tasks.as_slice());
        assert_eq!(board.transport().requests()[0].method, HttpMethod::Get);
    }

    #[test]
    fn load_failure_leaves_tasks_empty() {
        let transport =
            ScriptedTransport::default().respond(500, r#"{"error":"Failed to fetch tasks"}"#);
        let mut board = TaskBoard::new(TaskApi::new("http://tasks.test"), transport);
        let err = board.load().unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
        assert!(board.tasks().is_empty());
    }

    #[test]
    fn blank_submit_sends_nothing() {
        let before = vec![task(1, "a", false)];
        let mut board = loaded_board(ScriptedTransport::default(), &before);
        board.set_draft("   ");
        assert_eq!(board.submit().unwrap(), None);
        assert_eq!(board.tasks(), before.as_slice());
        assert_eq!(board.transport().requests().len(), 1); // only the load
        assert_eq!(board.draft(), "   ");
    }

    #[test]
    fn submit_appends_created_task_and_clears_draft() {
        let created = task(2, "Buy milk", false);
        let transport = ScriptedTransport::default().respond(201, json(&created));
        let mut board = loaded_board(transport, &[task(1, "a", false)]);

        board.set_draft("  Buy milk ");
        assert_eq!(board.submit().unwrap(), Some(created.id));
        assert_eq!(board.tasks().last(), Some(&created));
        assert_eq!(board.draft(), "");

        let sent = &board.transport().requests()[1];
        assert_eq!(sent.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["text"], "  Buy milk ");
    }

    #[test]
    fn submit_failure_keeps_draft() {
        let transport = ScriptedTransport::default().fail("timed out");
        let mut board = loaded_board(transport, &[]);
        board.set_draft("Walk dog");
        assert!(board.submit().is_err());
        assert!(board.tasks().is_empty());
        assert_eq!(board.draft(), "Walk dog");
    }

    #[test]
    fn toggle_takes_server_copy_on_success() {
        let mut server_copy = task(1, "a", true);
        server_copy.updated_at = Utc.with_ymd_and_hms(2024, 5, 1, 11, 0, 0).unwrap();
        let transport = ScriptedTransport::default().respond(200, json(&server_copy));
        let mut board = loaded_board(transport, &[task(1, "a", false)]);

        board.toggle(Uuid::from_u128(1)).unwrap();
        assert_eq!(board.tasks(), &[server_copy]);

        let sent = &board.transport().requests()[1];
        assert_eq!(sent.method, HttpMethod::Put);
        let body: serde_json::Value = serde_json::from_str(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({ "completed": true }));
    }

    #[test]
    fn toggle_failure_reverts_to_snapshot() {
        let before = vec![task(2, "b", false), task(1, "a", true)];
        let transport = ScriptedTransport::default().respond(400, r#"{"error":"write refused"}"#);
        let mut board = loaded_board(transport, &before);

        let err = board.toggle(Uuid::from_u128(1)).unwrap_err();
        assert_eq!(err.server_message().as_deref(), Some("write refused"));
        assert_eq!(board.tasks(), before.as_slice());
    }

    #[test]
    fn toggle_of_unknown_task_sends_nothing() {
        let before = vec![task(1, "a", false)];
        let mut board = loaded_board(ScriptedTransport::default(), &before);
        let err = board.toggle(Uuid::from_u128(99)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(board.tasks(), before.as_slice());
        assert_eq!(board.transport().requests().len(), 1);
    }

    #[test]
    fn remove_drops_task_on_success() {
        let transport =
            ScriptedTransport::default().respond(200, r#"{"message":"Task deleted successfully"}"#);
        let mut board = loaded_board(transport, &[task(2, "b", false), task(1, "a", false)]);

        board.remove(Uuid::from_u128(2)).unwrap();
        assert_eq!(board.tasks(), &[task(1, "a", false)]);
        assert_eq!(board.transport().requests()[1].method, HttpMethod::Delete);
    }

    #[test]
    fn remove_failure_restores_task_in_place() {
        let before = vec![task(3, "c", false), task(2, "b", true), task(1, "a", false)];
        let transport = ScriptedTransport::default().fail("connection reset");
        let mut board = loaded_board(transport, &before);

        assert!(board.remove(Uuid::from_u128(2)).is_err());
        assert_eq!(board.tasks(), before.as_slice());
    }
}
