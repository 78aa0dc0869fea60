//! HTTP server module

mod api;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use crate::AppState;

pub use api::{
    CommandRequest, DeletedResponse, HealthResponse, KnowledgeListResponse, MessageResponse,
    TeachRequest, TeachResponse,
};

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/teach", post(api::teach))
        .route("/command", post(api::command))
        .route(
            "/knowledge",
            get(api::list_knowledge).delete(api::delete_all_knowledge),
        )
        .route(
            "/knowledge/:topic",
            get(api::get_knowledge).delete(api::delete_knowledge),
        )
        .route("/concepts", get(api::list_concepts))
        .route("/concepts/:word", get(api::get_concept))
        .route("/experiences", get(api::list_experiences))
        .route("/reset", post(api::reset))
        .with_state(state)
}
