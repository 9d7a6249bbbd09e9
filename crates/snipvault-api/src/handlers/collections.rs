//! Collection handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use snipvault_core::{CollectionRepository, UpsertCollectionRequest};

use crate::error::ApiError;
use crate::state::AppState;

/// Body for collection create and update.
#[derive(Debug, Deserialize)]
pub struct CollectionPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Body for `POST /api/collections/:id/snippets`.
#[derive(Debug, Deserialize)]
pub struct AssignSnippetsPayload {
    pub snippet_ids: Vec<Uuid>,
}

impl From<CollectionPayload> for UpsertCollectionRequest {
    fn from(payload: CollectionPayload) -> Self {
        Self {
            name: payload.name,
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
        }
    }
}

pub async fn list_collections(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let collections = state.db.collections.list().await?;
    Ok(Json(collections))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state
        .db
        .collections
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Collection {} not found", id)))?;
    Ok(Json(collection))
}

pub async fn create_collection(
    State(state): State<AppState>,
    Json(payload): Json<CollectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state.db.collections.create(payload.into()).await?;
    info!(
        subsystem = "api",
        op = "create_collection",
        collection_id = %collection.id,
        "Collection created"
    );
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn update_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CollectionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let collection = state.db.collections.update(id, payload.into()).await?;
    Ok(Json(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.collections.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_snippets(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignSnippetsPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .db
        .collections
        .assign_snippets(&payload.snippet_ids, Some(id))
        .await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}
