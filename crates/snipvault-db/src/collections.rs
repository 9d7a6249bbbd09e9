//! Collection repository implementation.
//!
//! The default collection is a singleton with two hard rules: it cannot be
//! renamed and it cannot be deleted. Deleting any other collection first
//! reassigns its snippets to the default collection (creating it if it has
//! gone missing), all inside one transaction.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use snipvault_core::{
    Collection, CollectionRepository, Error, Result, UpsertCollectionRequest,
    DEFAULT_COLLECTION_COLOR, DEFAULT_COLLECTION_DESCRIPTION, DEFAULT_COLLECTION_ICON,
    DEFAULT_COLLECTION_NAME, DEFAULT_COLLECTION_SEED_COLOR,
};

/// PostgreSQL implementation of CollectionRepository.
#[derive(Clone)]
pub struct PgCollectionRepository {
    pool: Pool<Postgres>,
}

const COLLECTION_SELECT: &str = r#"
    SELECT c.id, c.name, c.description, c.color, c.icon, c.is_default,
           c.created_at_utc, c.updated_at_utc,
           COUNT(s.id) AS snippet_count
    FROM collection c
    LEFT JOIN snippet s ON s.collection_id = c.id
"#;

fn collection_from_row(row: &PgRow) -> Collection {
    Collection {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        color: row.get("color"),
        icon: row.get("icon"),
        is_default: row.get("is_default"),
        created_at_utc: row.get("created_at_utc"),
        updated_at_utc: row.get("updated_at_utc"),
        snippet_count: row.get("snippet_count"),
    }
}

impl PgCollectionRepository {
    /// Create a new PgCollectionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, id: Uuid) -> Result<Collection> {
        self.get_inner(id)
            .await?
            .ok_or(Error::CollectionNotFound(id))
    }

    async fn get_inner(&self, id: Uuid) -> Result<Option<Collection>> {
        let sql = format!("{COLLECTION_SELECT} WHERE c.id = $1 GROUP BY c.id");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(|row| collection_from_row(&row)))
    }

    /// Find the default collection inside a transaction, creating it if
    /// absent. Returns its id.
    async fn ensure_default_tx(tx: &mut Transaction<'_, Postgres>) -> Result<Uuid> {
        let existing = sqlx::query("SELECT id FROM collection WHERE is_default")
            .fetch_optional(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if let Some(row) = existing {
            return Ok(row.get("id"));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO collection (id, name, description, color, icon,
                                    is_default, created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
            "#,
        )
        .bind(id)
        .bind(DEFAULT_COLLECTION_NAME)
        .bind(DEFAULT_COLLECTION_DESCRIPTION)
        .bind(DEFAULT_COLLECTION_SEED_COLOR)
        .bind(DEFAULT_COLLECTION_ICON)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "collections",
            op = "ensure_default",
            collection_id = %id,
            "Default collection recreated"
        );
        Ok(id)
    }
}

#[async_trait]
impl CollectionRepository for PgCollectionRepository {
    async fn create(&self, req: UpsertCollectionRequest) -> Result<Collection> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Collection name is required".into()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();

        // User-created collections are never the default.
        sqlx::query(
            r#"
            INSERT INTO collection (id, name, description, color, icon,
                                    is_default, created_at_utc, updated_at_utc)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6, $6)
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&req.description)
        .bind(req.color.as_deref().unwrap_or(DEFAULT_COLLECTION_COLOR))
        .bind(req.icon.as_deref().unwrap_or(DEFAULT_COLLECTION_ICON))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "collections",
            op = "create",
            collection_id = %id,
            "Collection created"
        );

        self.fetch_one(id).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Collection>> {
        self.get_inner(id).await
    }

    async fn list(&self) -> Result<Vec<Collection>> {
        let sql =
            format!("{COLLECTION_SELECT} GROUP BY c.id ORDER BY c.is_default DESC, c.name ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(collection_from_row).collect())
    }

    async fn update(&self, id: Uuid, req: UpsertCollectionRequest) -> Result<Collection> {
        let existing = self.fetch_one(id).await?;

        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(Error::InvalidInput("Collection name is required".into()));
        }
        if existing.is_default && name != existing.name {
            return Err(Error::InvalidInput(
                "The default collection cannot be renamed".into(),
            ));
        }

        sqlx::query(
            r#"
            UPDATE collection
            SET name = $2, description = $3, color = $4, icon = $5,
                updated_at_utc = $6
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&name)
        .bind(&req.description)
        .bind(req.color.as_deref().unwrap_or(&existing.color))
        .bind(req.icon.as_deref().unwrap_or(&existing.icon))
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch_one(id).await
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let row = sqlx::query("SELECT is_default FROM collection WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::CollectionNotFound(id))?;

        let is_default: bool = row.get("is_default");
        if is_default {
            return Err(Error::InvalidInput(
                "The default collection cannot be deleted".into(),
            ));
        }

        let default_id = Self::ensure_default_tx(&mut tx).await?;

        let moved = sqlx::query(
            "UPDATE snippet SET collection_id = $1 WHERE collection_id = $2",
        )
        .bind(default_id)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        sqlx::query("DELETE FROM collection WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "collections",
            op = "delete",
            collection_id = %id,
            reassigned = moved,
            "Collection deleted"
        );
        Ok(())
    }

    async fn ensure_default(&self) -> Result<Collection> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let id = Self::ensure_default_tx(&mut tx).await?;
        tx.commit().await.map_err(Error::Database)?;
        self.fetch_one(id).await
    }

    async fn assign_snippets(
        &self,
        snippet_ids: &[Uuid],
        collection_id: Option<Uuid>,
    ) -> Result<u64> {
        if snippet_ids.is_empty() {
            return Ok(0);
        }

        if let Some(collection_id) = collection_id {
            // Assigning to a missing collection is a client error, not a
            // silent no-op.
            let present = sqlx::query(
                "SELECT EXISTS(SELECT 1 FROM collection WHERE id = $1) AS present",
            )
            .bind(collection_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
            let present: bool = present.get("present");
            if !present {
                return Err(Error::CollectionNotFound(collection_id));
            }
        }

        let updated = sqlx::query(
            "UPDATE snippet SET collection_id = $1, updated_at_utc = $2 WHERE id = ANY($3)",
        )
        .bind(collection_id)
        .bind(Utc::now())
        .bind(snippet_ids)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?
        .rows_affected();

        debug!(
            subsystem = "db",
            component = "collections",
            op = "assign_snippets",
            collection_id = ?collection_id,
            updated,
            "Snippets assigned"
        );
        Ok(updated)
    }
}
