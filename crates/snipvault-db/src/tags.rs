//! Tag repository implementation.
//!
//! Tag sync is a full replacement: every join row for the snippet is
//! deleted, then one row per desired tag is inserted, with the tag row
//! find-or-created by normalized name. Both phases run in one transaction
//! so a concurrent reader never observes a half-synced snippet.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use uuid::Uuid;

use snipvault_core::{normalize_tags, Error, Result, TagCount, TagRepository};

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Find a tag by normalized name, creating it if it does not exist.
    /// Returns the tag id.
    async fn find_or_create_tx(
        tx: &mut Transaction<'_, Postgres>,
        name: &str,
    ) -> Result<Uuid> {
        sqlx::query("INSERT INTO tag (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        let row = sqlx::query("SELECT id FROM tag WHERE name = $1")
            .bind(name)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;

        Ok(row.get("id"))
    }

    /// Replace a snippet's tag set within an existing transaction.
    ///
    /// Used by the snippet repository so row write and tag resync share
    /// one unit of work.
    pub async fn set_for_snippet_tx(
        tx: &mut Transaction<'_, Postgres>,
        snippet_id: Uuid,
        tags: Vec<String>,
    ) -> Result<()> {
        let tags = normalize_tags(tags);

        // Remove existing joins
        sqlx::query("DELETE FROM snippet_tag WHERE snippet_id = $1")
            .bind(snippet_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        // Relink, creating tag rows as needed. Orphaned tag rows from the
        // delete are retained deliberately (see DESIGN.md).
        for name in tags {
            let tag_id = Self::find_or_create_tx(tx, &name).await?;
            sqlx::query(
                "INSERT INTO snippet_tag (snippet_id, tag_id) VALUES ($1, $2)
                 ON CONFLICT (snippet_id, tag_id) DO NOTHING",
            )
            .bind(snippet_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        Ok(())
    }

    /// Get tag names for a snippet within an existing transaction.
    pub async fn get_for_snippet_tx(
        tx: &mut Transaction<'_, Postgres>,
        snippet_id: Uuid,
    ) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT t.name FROM snippet_tag st
             JOIN tag t ON t.id = st.tag_id
             WHERE st.snippet_id = $1
             ORDER BY t.name",
        )
        .bind(snippet_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn get_for_snippet(&self, snippet_id: Uuid) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT t.name FROM snippet_tag st
             JOIN tag t ON t.id = st.tag_id
             WHERE st.snippet_id = $1
             ORDER BY t.name",
        )
        .bind(snippet_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.into_iter().map(|row| row.get("name")).collect())
    }

    async fn set_for_snippet(&self, snippet_id: Uuid, tags: Vec<String>) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        Self::set_for_snippet_tx(&mut tx, snippet_id, tags).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn usage_counts(&self) -> Result<Vec<TagCount>> {
        let rows = sqlx::query(
            r#"
            SELECT t.name, COUNT(st.snippet_id) as count
            FROM snippet_tag st
            INNER JOIN tag t ON st.tag_id = t.id
            GROUP BY t.name
            ORDER BY t.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| TagCount {
                name: row.get("name"),
                count: row.get("count"),
            })
            .collect())
    }
}
