//! Snippet CRUD, search, and statistics handlers.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use snipvault_ai::AiOrchestrator;
use snipvault_core::{
    normalize_tags_with_language, CollectionRepository, Complexity, CreateSnippetRequest,
    SearchFilters, SnippetRepository, TagRepository, UpdateSnippetRequest,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Body for `POST /api/snippets`.
#[derive(Debug, Deserialize)]
pub struct CreateSnippetPayload {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub docs: String,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub collection_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Run analysis and merge its suggested tags before persisting.
    #[serde(default)]
    pub use_ai: bool,
}

/// Body for `PUT /api/snippets/:id`. All content fields are required for a
/// full update; a body carrying only `collection_id` is treated as a move.
#[derive(Debug, Deserialize)]
pub struct UpdateSnippetPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub is_pinned: Option<bool>,
    /// Missing and explicit null are distinct: null clears the assignment.
    #[serde(default, deserialize_with = "double_option")]
    pub collection_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    Ok(Some(Option::deserialize(de)?))
}

impl UpdateSnippetPayload {
    /// A body whose only present field is `collection_id`.
    fn is_move_only(&self) -> bool {
        self.collection_id.is_some()
            && self.title.is_none()
            && self.description.is_none()
            && self.language.is_none()
            && self.code.is_none()
            && self.docs.is_none()
            && self.is_pinned.is_none()
            && self.tags.is_none()
    }
}

/// Body for `POST /api/snippets/:id/move`.
#[derive(Debug, Deserialize)]
pub struct MoveSnippetPayload {
    /// None clears the assignment.
    pub collection_id: Option<Uuid>,
}

fn require_non_empty(value: &str, name: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} is required", name)));
    }
    Ok(())
}

/// Best-effort AI enrichment for snippet creation.
///
/// A missing or failing backend never fails the create; the snippet is
/// stored without enrichment instead.
async fn ai_enrichment(
    ai: Option<&AiOrchestrator>,
    code: &str,
    language: &str,
) -> (Vec<String>, String, Complexity) {
    let Some(ai) = ai else {
        return (Vec::new(), String::new(), Complexity::Beginner);
    };
    match ai.analyze_code(code, language).await {
        Ok(analysis) => (
            analysis.suggested_tags,
            analysis.explanation,
            analysis.complexity,
        ),
        Err(err) => {
            warn!(
                subsystem = "api",
                op = "create_snippet",
                error = %err,
                fallback = true,
                "AI analysis failed, storing snippet without enrichment"
            );
            (Vec::new(), String::new(), Complexity::Beginner)
        }
    }
}

/// Tags carried over when a full update omits `tags`: the previous
/// language's implicit tag is dropped so a language change cannot leave
/// both languages tagged.
fn carried_tags(current_tags: &[String], previous_language: &str) -> Vec<String> {
    current_tags
        .iter()
        .filter(|tag| !tag.eq_ignore_ascii_case(previous_language))
        .cloned()
        .collect()
}

pub async fn list_snippets(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let snippets = state.db.snippets.list().await?;
    Ok(Json(snippets))
}

pub async fn get_snippet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let snippet = state.db.snippets.fetch(id).await?;
    Ok(Json(snippet))
}

pub async fn create_snippet(
    State(state): State<AppState>,
    Json(payload): Json<CreateSnippetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require_non_empty(&payload.title, "title")?;
    require_non_empty(&payload.language, "language")?;
    require_non_empty(&payload.code, "code")?;

    let mut tags = payload.tags;
    let mut ai_explanation = String::new();
    let mut complexity = Complexity::Beginner;

    if payload.use_ai {
        let (suggested, explanation, estimated) =
            ai_enrichment(state.ai.as_ref(), &payload.code, &payload.language).await;
        tags.extend(suggested);
        ai_explanation = explanation;
        complexity = estimated;
    }

    let snippet = state
        .db
        .snippets
        .insert(CreateSnippetRequest {
            title: payload.title,
            description: payload.description,
            language: payload.language.clone(),
            code: payload.code,
            docs: payload.docs,
            is_pinned: payload.is_pinned,
            collection_id: payload.collection_id,
            ai_explanation,
            complexity,
            tags: normalize_tags_with_language(&tags, &payload.language),
        })
        .await?;

    info!(
        subsystem = "api",
        op = "create_snippet",
        snippet_id = %snippet.snippet.id,
        use_ai = payload.use_ai,
        "Snippet created"
    );
    Ok((StatusCode::CREATED, Json(snippet)))
}

pub async fn update_snippet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSnippetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    // Move-only bodies skip the tag resync entirely.
    if payload.is_move_only() {
        let collection_id = payload.collection_id.flatten();
        let snippet = state.db.snippets.move_to_collection(id, collection_id).await?;
        return Ok(Json(state.db.snippets.fetch(snippet.id).await?));
    }

    let title = payload
        .title
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;
    let language = payload
        .language
        .ok_or_else(|| ApiError::BadRequest("language is required".to_string()))?;
    let code = payload
        .code
        .ok_or_else(|| ApiError::BadRequest("code is required".to_string()))?;
    require_non_empty(&title, "title")?;
    require_non_empty(&language, "language")?;
    require_non_empty(&code, "code")?;

    let current = state.db.snippets.fetch(id).await?;
    let tags = payload
        .tags
        .unwrap_or_else(|| carried_tags(&current.tags, &current.snippet.language));

    let snippet = state
        .db
        .snippets
        .update(
            id,
            UpdateSnippetRequest {
                title,
                description: payload.description.unwrap_or(current.snippet.description),
                language: language.clone(),
                code,
                docs: payload.docs.unwrap_or(current.snippet.docs),
                is_pinned: payload.is_pinned.unwrap_or(current.snippet.is_pinned),
                collection_id: payload
                    .collection_id
                    .unwrap_or(current.snippet.collection_id),
                tags: normalize_tags_with_language(&tags, &language),
            },
        )
        .await?;

    Ok(Json(snippet))
}

pub async fn delete_snippet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.snippets.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_snippet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MoveSnippetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(collection_id) = payload.collection_id {
        if state.db.collections.get(collection_id).await?.is_none() {
            return Err(ApiError::NotFound(format!(
                "Collection {} not found",
                collection_id
            )));
        }
    }
    state
        .db
        .snippets
        .move_to_collection(id, payload.collection_id)
        .await?;
    Ok(Json(state.db.snippets.fetch(id).await?))
}

pub async fn search_snippets(
    State(state): State<AppState>,
    Json(filters): Json<SearchFilters>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.search.search(&filters).await?;
    Ok(Json(results))
}

pub async fn get_raw_code(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let code = state.db.snippets.fetch_raw_code(id).await?;
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], code))
}

/// Tag usage statistics: one row per distinct tag name, alphabetical.
/// Served from both `/api/tags` and `/api/snippets/statistics/count`.
pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = state.db.tags.usage_counts().await?;
    Ok(Json(counts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snipvault_ai::MockCompletionBackend;
    use std::sync::Arc;

    fn payload(json: &str) -> UpdateSnippetPayload {
        serde_json::from_str(json).unwrap()
    }

    fn orchestrator(backend: MockCompletionBackend) -> AiOrchestrator {
        AiOrchestrator::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_enrichment_survives_backend_failure() {
        let ai = orchestrator(MockCompletionBackend::new().with_failure());

        let (tags, explanation, complexity) =
            ai_enrichment(Some(&ai), "fn main() {}", "rust").await;
        assert!(tags.is_empty());
        assert!(explanation.is_empty());
        assert_eq!(complexity, Complexity::Beginner);
    }

    #[tokio::test]
    async fn test_enrichment_merges_analysis() {
        let ai = orchestrator(MockCompletionBackend::new().with_fixed_response(
            r#"{"explanation": "Entry point", "complexity": "advanced", "suggestedTags": ["cli"]}"#,
        ));

        let (tags, explanation, complexity) =
            ai_enrichment(Some(&ai), "fn main() {}", "rust").await;
        assert_eq!(tags, vec!["cli"]);
        assert_eq!(explanation, "Entry point");
        assert_eq!(complexity, Complexity::Advanced);
    }

    #[tokio::test]
    async fn test_enrichment_without_backend_is_empty() {
        let (tags, explanation, complexity) = ai_enrichment(None, "code", "rust").await;
        assert!(tags.is_empty());
        assert!(explanation.is_empty());
        assert_eq!(complexity, Complexity::Beginner);
    }

    #[test]
    fn test_carried_tags_drop_previous_language() {
        let current = vec!["js".to_string(), "react".to_string()];
        assert_eq!(carried_tags(&current, "js"), vec!["react"]);

        // Re-normalizing for the new language leaves exactly one language tag.
        let tags = normalize_tags_with_language(&carried_tags(&current, "js"), "python");
        assert_eq!(tags, vec!["react", "python"]);
    }

    #[test]
    fn test_move_only_detection() {
        assert!(payload(r#"{"collection_id": null}"#).is_move_only());
        assert!(payload(
            r#"{"collection_id": "2af1fd14-4d67-4a7c-bf3e-ad7a3a3f9ad5"}"#
        )
        .is_move_only());
        assert!(!payload(r#"{"collection_id": null, "title": "x"}"#).is_move_only());
        assert!(!payload(r#"{"title": "x"}"#).is_move_only());
        assert!(!payload(r#"{}"#).is_move_only());
    }

    #[test]
    fn test_create_payload_defaults() {
        let payload: CreateSnippetPayload = serde_json::from_str(
            r#"{"title": "t", "language": "rust", "code": "fn main() {}"}"#,
        )
        .unwrap();
        assert!(!payload.use_ai);
        assert!(!payload.is_pinned);
        assert!(payload.tags.is_empty());
        assert!(payload.collection_id.is_none());
    }
}
