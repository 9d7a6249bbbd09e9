//! # snipvault-db
//!
//! PostgreSQL database layer for snipvault.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for snippets, tags, and collections
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use snipvault_db::{Database, SnippetRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/snipvault").await?;
//!     let snippets = db.snippets.list().await?;
//!     println!("{} snippets", snippets.len());
//!     Ok(())
//! }
//! ```

pub mod collections;
pub mod pool;
pub mod snippets;
pub mod tags;

// Re-export core types
pub use snipvault_core::*;

pub use collections::PgCollectionRepository;
pub use pool::create_pool;
pub use snippets::PgSnippetRepository;
pub use tags::PgTagRepository;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Snippet repository for CRUD operations.
    pub snippets: PgSnippetRepository,
    /// Tag repository for tag sync and usage counts.
    pub tags: PgTagRepository,
    /// Collection repository with default-singleton invariants.
    pub collections: PgCollectionRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            snippets: PgSnippetRepository::new(pool.clone()),
            tags: PgTagRepository::new(pool.clone()),
            collections: PgCollectionRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_escape_like_escapes_backslash_first() {
        // A pre-escaped wildcard must not collapse back into one.
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }
}
