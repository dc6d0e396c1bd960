//! REST service for short text tasks.
//!
//! # Overview
//! An axum router over a pluggable `TaskStore`. Handlers validate input,
//! call the store, and map the outcome to a status code and JSON body.
//! The only shared state is the store handle.

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod store;

use axum::{
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::ApiError;
pub use model::{Task, MAX_TEXT_LEN};
pub use routes::{DatabaseState, DeleteConfirmation, Health};
pub use store::{InMemoryTaskStore, SharedStore, StoreError, TaskStore};

pub fn app(store: SharedStore) -> Router {
    Router::new()
        .route("/ok", get(routes::health))
        .route(
            "/api/tasks",
            get(routes::list_tasks).post(routes::create_task),
        )
        .route(
            "/api/tasks/{id}",
            put(routes::update_task).delete(routes::delete_task),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

pub async fn run(listener: TcpListener, store: SharedStore) -> Result<(), std::io::Error> {
    axum::serve(listener, app(store)).await
}
