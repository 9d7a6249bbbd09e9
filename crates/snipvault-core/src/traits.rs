//! Core traits for snipvault abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// SNIPPET REPOSITORY TRAITS
// =============================================================================

/// Request for creating a new snippet.
///
/// `language` is normalized (lowercased) by the repository; `tags` should
/// already include the implicit language tag (see
/// [`crate::tags::normalize_tags_with_language`]).
#[derive(Debug, Clone)]
pub struct CreateSnippetRequest {
    pub title: String,
    pub description: String,
    pub language: String,
    pub code: String,
    pub docs: String,
    pub is_pinned: bool,
    pub collection_id: Option<Uuid>,
    pub ai_explanation: String,
    pub complexity: Complexity,
    pub tags: Vec<String>,
}

/// Request for a full snippet update. Tags are a full replacement set.
#[derive(Debug, Clone)]
pub struct UpdateSnippetRequest {
    pub title: String,
    pub description: String,
    pub language: String,
    pub code: String,
    pub docs: String,
    pub is_pinned: bool,
    pub collection_id: Option<Uuid>,
    pub tags: Vec<String>,
}

/// Repository for snippet CRUD operations.
#[async_trait]
pub trait SnippetRepository: Send + Sync {
    /// Insert a new snippet with its tag set in one transaction.
    async fn insert(&self, req: CreateSnippetRequest) -> Result<SnippetWithTags>;

    /// Fetch a snippet by ID with tags and collection summary.
    async fn fetch(&self, id: Uuid) -> Result<SnippetWithTags>;

    /// List all snippets with tags and collection summaries.
    async fn list(&self) -> Result<Vec<SnippetWithTags>>;

    /// Full replace of metadata and tags in one transaction.
    async fn update(&self, id: Uuid, req: UpdateSnippetRequest) -> Result<SnippetWithTags>;

    /// Move a snippet to a collection (None clears the assignment).
    /// Skips tag resync entirely.
    async fn move_to_collection(&self, id: Uuid, collection_id: Option<Uuid>) -> Result<Snippet>;

    /// Delete a snippet (join rows cascade).
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Fetch just the raw code text of a snippet.
    async fn fetch_raw_code(&self, id: Uuid) -> Result<String>;

    /// Check if a snippet exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}

// =============================================================================
// TAG REPOSITORY TRAITS
// =============================================================================

/// Repository for tag operations.
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Get the tag names for a snippet, sorted.
    async fn get_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<String>>;

    /// Replace a snippet's tag set: delete every join row, then
    /// find-or-create each tag and relink, atomically.
    async fn set_for_snippet(&self, snippet_id: Uuid, tags: Vec<String>) -> Result<()>;

    /// Tag usage counts, one row per distinct name, ordered alphabetically.
    async fn usage_counts(&self) -> Result<Vec<TagCount>>;
}

// =============================================================================
// COLLECTION REPOSITORY TRAITS
// =============================================================================

/// Request for creating or updating a collection.
#[derive(Debug, Clone)]
pub struct UpsertCollectionRequest {
    pub name: String,
    pub description: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Repository for collection operations.
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// Create a collection. Always non-default.
    async fn create(&self, req: UpsertCollectionRequest) -> Result<Collection>;

    /// Get a collection by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Collection>>;

    /// List all collections, default first, then by name.
    async fn list(&self) -> Result<Vec<Collection>>;

    /// Update a collection. Renaming the default collection is rejected.
    async fn update(&self, id: Uuid, req: UpsertCollectionRequest) -> Result<Collection>;

    /// Delete a non-default collection, reassigning its snippets to the
    /// default collection first. Deleting the default is rejected.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Find the default collection, creating it if missing.
    async fn ensure_default(&self) -> Result<Collection>;

    /// Bulk-assign snippets to a collection (None clears the assignment).
    /// Returns the number of snippets updated.
    async fn assign_snippets(
        &self,
        snippet_ids: &[Uuid],
        collection_id: Option<Uuid>,
    ) -> Result<u64>;
}

// =============================================================================
// COMPLETION BACKEND
// =============================================================================

/// Capability interface over the external text-completion service.
///
/// The AI orchestrator depends only on this trait, which keeps the
/// defensive parsing and fallback logic independent of the transport and
/// unit-testable with a canned backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Complete a prompt, returning the raw text reply.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Complete a prompt with a system message for context.
    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
