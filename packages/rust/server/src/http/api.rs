//! REST API handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use webbaby_core::{CommandResult, topic_key};
use webbaby_shared::{Concept, Experience, WebKnowledge};

use crate::AppState;
use crate::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Default page size for list endpoints.
const DEFAULT_LIMIT: u32 = 20;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
}

#[derive(Debug, Deserialize)]
pub struct TeachRequest {
    pub word: String,
    pub true_label: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TeachResponse {
    pub message: String,
    pub word: String,
    pub label: String,
    pub seen_count: i64,
    pub correct_count: i64,
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub message: String,
    #[serde(flatten)]
    pub result: CommandResult,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KnowledgeListResponse {
    /// Total stored records, not just the ones returned.
    pub total: u64,
    pub items: Vec<WebKnowledge>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// GET /
pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Web Baby backend running.".into(),
    })
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    })
}

/// POST /teach
pub async fn teach(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TeachRequest>,
) -> ApiResult<TeachResponse> {
    let concept = webbaby_core::teach(state.storage(), &req.word, &req.true_label).await?;
    Ok(Json(TeachResponse {
        message: "Baby learned!".into(),
        word: concept.word,
        label: concept.label,
        seen_count: concept.seen_count,
        correct_count: concept.correct_count,
    }))
}

/// POST /command
pub async fn command(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CommandRequest>,
) -> ApiResult<CommandResponse> {
    let result = state.pipeline.handle(&req.command).await?;
    Ok(Json(CommandResponse {
        message: "Command processed.".into(),
        result,
    }))
}

/// GET /knowledge?limit=N
pub async fn list_knowledge(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<KnowledgeListResponse> {
    let storage = state.storage();
    let items = storage
        .list_knowledge(query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    let total = storage.count_knowledge().await?;
    Ok(Json(KnowledgeListResponse { total, items }))
}

/// GET /knowledge/:topic
pub async fn get_knowledge(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> ApiResult<WebKnowledge> {
    let record = state.storage().get_knowledge(&topic_key(&topic)).await?;
    Ok(Json(record))
}

/// DELETE /knowledge/:topic
pub async fn delete_knowledge(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> ApiResult<DeletedResponse> {
    state.storage().delete_knowledge(&topic_key(&topic)).await?;
    Ok(Json(DeletedResponse { deleted: 1 }))
}

/// DELETE /knowledge
pub async fn delete_all_knowledge(
    State(state): State<Arc<AppState>>,
) -> ApiResult<DeletedResponse> {
    let deleted = state.storage().delete_all_knowledge().await?;
    Ok(Json(DeletedResponse { deleted }))
}

/// GET /concepts
pub async fn list_concepts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Concept>> {
    Ok(Json(state.storage().list_concepts().await?))
}

/// GET /concepts/:word
///
/// Words are case-sensitive, so the path segment is used verbatim.
pub async fn get_concept(
    State(state): State<Arc<AppState>>,
    Path(word): Path<String>,
) -> ApiResult<Concept> {
    Ok(Json(state.storage().get_concept(&word).await?))
}

/// GET /experiences?limit=N
pub async fn list_experiences(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Vec<Experience>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    Ok(Json(state.storage().list_experiences(limit).await?))
}

/// POST /reset
pub async fn reset(State(state): State<Arc<AppState>>) -> ApiResult<MessageResponse> {
    state.storage().reset_all().await?;
    tracing::info!("all memory cleared");
    Ok(Json(MessageResponse {
        message: "All memory cleared.".into(),
    }))
}
