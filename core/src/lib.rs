//! Client core for the task service.
//!
//! # Overview
//! `TaskApi` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). A `Transport`
//! executes the round-trip, and `TaskBoard` keeps the client-side list in
//! step with the server using optimistic updates.
//!
//! # Design
//! - `TaskApi` is stateless; it holds only the server origin.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod board;
pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use board::TaskBoard;
pub use client::{TaskApi, BASE_PATH};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, UreqTransport};
pub use types::{CreateTask, DatabaseState, DeleteConfirmation, Health, Task, UpdateTask};
