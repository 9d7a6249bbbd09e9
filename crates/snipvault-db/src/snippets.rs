//! Snippet repository implementation.
//!
//! Create and update write the snippet row and resync its tag set inside
//! one transaction. Reads project the snippet together with its flattened
//! tag names and a compact collection summary.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use snipvault_core::{
    Complexity, CollectionSummary, CreateSnippetRequest, Error, Result, Snippet,
    SnippetRepository, SnippetWithTags, UpdateSnippetRequest,
};

use crate::tags::PgTagRepository;

/// PostgreSQL implementation of SnippetRepository.
#[derive(Clone)]
pub struct PgSnippetRepository {
    pool: Pool<Postgres>,
}

const SNIPPET_SELECT: &str = r#"
    SELECT s.id, s.title, s.description, s.language, s.code, s.docs,
           s.is_pinned, s.collection_id, s.ai_explanation, s.complexity,
           s.created_at_utc, s.updated_at_utc,
           c.name AS collection_name, c.color AS collection_color,
           c.icon AS collection_icon
    FROM snippet s
    LEFT JOIN collection c ON c.id = s.collection_id
"#;

fn snippet_from_row(row: &PgRow) -> Snippet {
    let complexity: String = row.get("complexity");
    Snippet {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        language: row.get("language"),
        code: row.get("code"),
        docs: row.get("docs"),
        is_pinned: row.get("is_pinned"),
        collection_id: row.get("collection_id"),
        ai_explanation: row.get("ai_explanation"),
        complexity: Complexity::from_str(&complexity).unwrap_or_default(),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
    }
}

fn collection_summary_from_row(row: &PgRow) -> Option<CollectionSummary> {
    let id: Option<Uuid> = row.get("collection_id");
    id.map(|id| CollectionSummary {
        id,
        name: row.get("collection_name"),
        color: row.get("collection_color"),
        icon: row.get("collection_icon"),
    })
}

impl PgSnippetRepository {
    /// Create a new PgSnippetRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_projected(&self, id: Uuid) -> Result<SnippetWithTags> {
        let sql = format!("{SNIPPET_SELECT} WHERE s.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::SnippetNotFound(id))?;

        let snippet = snippet_from_row(&row);
        let collection = collection_summary_from_row(&row);

        let tags = sqlx::query(
            "SELECT t.name FROM snippet_tag st
             JOIN tag t ON t.id = st.tag_id
             WHERE st.snippet_id = $1
             ORDER BY t.name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?
        .into_iter()
        .map(|row| row.get("name"))
        .collect();

        Ok(SnippetWithTags {
            snippet,
            tags,
            collection,
        })
    }

    /// Overwrite the AI-derived fields of a snippet, leaving its content
    /// and tag set untouched.
    pub async fn refresh_analysis(
        &self,
        id: Uuid,
        explanation: &str,
        complexity: Complexity,
    ) -> Result<SnippetWithTags> {
        let result = sqlx::query(
            "UPDATE snippet SET ai_explanation = $2, complexity = $3, updated_at_utc = $4
             WHERE id = $1",
        )
        .bind(id)
        .bind(explanation)
        .bind(complexity.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SnippetNotFound(id));
        }
        self.fetch_projected(id).await
    }

    /// Fetch tag names for all snippets in one query, keyed by snippet id.
    async fn tag_map(&self) -> Result<HashMap<Uuid, Vec<String>>> {
        let rows = sqlx::query(
            "SELECT st.snippet_id, t.name FROM snippet_tag st
             JOIN tag t ON t.id = st.tag_id
             ORDER BY t.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            let snippet_id: Uuid = row.get("snippet_id");
            map.entry(snippet_id).or_default().push(row.get("name"));
        }
        Ok(map)
    }
}

#[async_trait]
impl SnippetRepository for PgSnippetRepository {
    async fn insert(&self, req: CreateSnippetRequest) -> Result<SnippetWithTags> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let language = req.language.trim().to_lowercase();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            r#"
            INSERT INTO snippet (id, title, description, language, code, docs,
                                 is_pinned, collection_id, ai_explanation,
                                 complexity, created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&language)
        .bind(&req.code)
        .bind(&req.docs)
        .bind(req.is_pinned)
        .bind(req.collection_id)
        .bind(&req.ai_explanation)
        .bind(req.complexity.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        PgTagRepository::set_for_snippet_tx(&mut tx, id, req.tags).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "snippets",
            op = "insert",
            snippet_id = %id,
            language = %language,
            "Snippet created"
        );

        self.fetch_projected(id).await
    }

    async fn fetch(&self, id: Uuid) -> Result<SnippetWithTags> {
        self.fetch_projected(id).await
    }

    async fn list(&self) -> Result<Vec<SnippetWithTags>> {
        let sql = format!("{SNIPPET_SELECT} ORDER BY s.updated_at_utc DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut tags = self.tag_map().await?;

        Ok(rows
            .iter()
            .map(|row| {
                let snippet = snippet_from_row(row);
                let collection = collection_summary_from_row(row);
                let tags = tags.remove(&snippet.id).unwrap_or_default();
                SnippetWithTags {
                    snippet,
                    tags,
                    collection,
                }
            })
            .collect())
    }

    async fn update(&self, id: Uuid, req: UpdateSnippetRequest) -> Result<SnippetWithTags> {
        let now = Utc::now();
        let language = req.language.trim().to_lowercase();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let result = sqlx::query(
            r#"
            UPDATE snippet
            SET title = $2, description = $3, language = $4, code = $5,
                docs = $6, is_pinned = $7, collection_id = $8,
                updated_at_utc = $9
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(&language)
        .bind(&req.code)
        .bind(&req.docs)
        .bind(req.is_pinned)
        .bind(req.collection_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SnippetNotFound(id));
        }

        PgTagRepository::set_for_snippet_tx(&mut tx, id, req.tags).await?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "snippets",
            op = "update",
            snippet_id = %id,
            "Snippet updated"
        );

        self.fetch_projected(id).await
    }

    async fn move_to_collection(&self, id: Uuid, collection_id: Option<Uuid>) -> Result<Snippet> {
        let result = sqlx::query(
            "UPDATE snippet SET collection_id = $2, updated_at_utc = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(collection_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SnippetNotFound(id));
        }

        debug!(
            subsystem = "db",
            component = "snippets",
            op = "move",
            snippet_id = %id,
            collection_id = ?collection_id,
            "Snippet moved"
        );

        let sql = format!("{SNIPPET_SELECT} WHERE s.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(snippet_from_row(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM snippet WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::SnippetNotFound(id));
        }

        debug!(
            subsystem = "db",
            component = "snippets",
            op = "delete",
            snippet_id = %id,
            "Snippet deleted"
        );
        Ok(())
    }

    async fn fetch_raw_code(&self, id: Uuid) -> Result<String> {
        let row = sqlx::query("SELECT code FROM snippet WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::SnippetNotFound(id))?;
        Ok(row.get("code"))
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM snippet WHERE id = $1) AS present")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.get("present"))
    }
}
