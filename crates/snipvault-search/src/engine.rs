//! Composite snippet search.
//!
//! Three filter classes combine with logical AND:
//! - free-text query, matched as a substring of title, description, or code
//! - tag set, matched when the snippet carries any of the tags
//! - language set, matched when the snippet's language is in the set
//!
//! Membership inside the tag and language sets is OR. A request with no
//! active class returns an empty result set.

use std::collections::HashMap;
use std::time::Instant;

use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use snipvault_core::{
    CollectionSummary, Complexity, Result, SearchFilters, Snippet, SnippetWithTags,
};
use snipvault_db::escape_like;

use crate::filters::NormalizedFilters;

/// SQL-backed search engine over the snippet store.
#[derive(Clone)]
pub struct SnippetSearchEngine {
    pool: Pool<Postgres>,
}

impl SnippetSearchEngine {
    /// Create a new engine over the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run a composite search, returning matches newest-updated first.
    pub async fn search(&self, filters: &SearchFilters) -> Result<Vec<SnippetWithTags>> {
        let start = Instant::now();
        let normalized = NormalizedFilters::from(filters);

        if normalized.is_empty() {
            debug!(
                subsystem = "search",
                op = "search",
                result_count = 0usize,
                "Empty filters, returning no matches"
            );
            return Ok(Vec::new());
        }

        let mut conditions: Vec<String> = Vec::new();
        let mut param = 0u32;
        let mut next = || {
            param += 1;
            param
        };

        let query_pattern = if normalized.query.is_empty() {
            None
        } else {
            let n = next();
            conditions.push(format!(
                "(s.title LIKE ${n} ESCAPE '\\' OR s.description LIKE ${n} ESCAPE '\\' \
                 OR s.code LIKE ${n} ESCAPE '\\')"
            ));
            Some(format!("%{}%", escape_like(&normalized.query)))
        };

        let languages = if normalized.languages.is_empty() {
            None
        } else {
            let n = next();
            conditions.push(format!("s.language = ANY(${n})"));
            Some(normalized.languages.clone())
        };

        let tags = if normalized.tags.is_empty() {
            None
        } else {
            let n = next();
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM snippet_tag st \
                 JOIN tag t ON t.id = st.tag_id \
                 WHERE st.snippet_id = s.id AND t.name = ANY(${n}))"
            ));
            Some(normalized.tags.clone())
        };

        let sql = format!(
            r#"
            SELECT s.id, s.title, s.description, s.language, s.code, s.docs,
                   s.is_pinned, s.collection_id, s.ai_explanation, s.complexity,
                   s.created_at_utc, s.updated_at_utc,
                   c.name AS collection_name, c.color AS collection_color,
                   c.icon AS collection_icon
            FROM snippet s
            LEFT JOIN collection c ON c.id = s.collection_id
            WHERE {}
            ORDER BY s.updated_at_utc DESC
            "#,
            conditions.join(" AND ")
        );

        let mut query = sqlx::query(&sql);
        if let Some(pattern) = &query_pattern {
            query = query.bind(pattern);
        }
        if let Some(languages) = &languages {
            query = query.bind(languages);
        }
        if let Some(tags) = &tags {
            query = query.bind(tags);
        }

        let rows = query.fetch_all(&self.pool).await?;
        let ids: Vec<Uuid> = rows.iter().map(|row| row.get("id")).collect();
        let mut tag_map = self.tags_for(&ids).await?;

        let results: Vec<SnippetWithTags> = rows
            .iter()
            .map(|row| {
                let snippet = snippet_from_row(row);
                let tags = tag_map.remove(&snippet.id).unwrap_or_default();
                let collection = collection_summary_from_row(row);
                SnippetWithTags {
                    snippet,
                    tags,
                    collection,
                }
            })
            .collect();

        debug!(
            subsystem = "search",
            op = "search",
            query_len = normalized.query.len(),
            tag_filters = normalized.tags.len(),
            language_filters = normalized.languages.len(),
            result_count = results.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(results)
    }

    async fn tags_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<String>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query(
            "SELECT st.snippet_id, t.name FROM snippet_tag st
             JOIN tag t ON t.id = st.tag_id
             WHERE st.snippet_id = ANY($1)
             ORDER BY t.name",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut map: HashMap<Uuid, Vec<String>> = HashMap::new();
        for row in rows {
            let snippet_id: Uuid = row.get("snippet_id");
            map.entry(snippet_id).or_default().push(row.get("name"));
        }
        Ok(map)
    }
}

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
        complexity: Complexity::parse_or_default(&complexity),
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
