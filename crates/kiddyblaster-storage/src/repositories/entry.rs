#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::RegistryEntry;
use sqlx::SqlitePool;

/// Registry of provisioned cards.
///
/// This is the whole surface the provisioning workflow needs: a lookup by
/// the identifier read from a card, an insert that allocates the next
/// identifier, and an update of an existing entry.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait Registry: Send + Sync {
    /// Find the entry a card identifier refers to
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<RegistryEntry>>;

    /// Create an entry and return its newly allocated id
    async fn insert(&self, name: &str, uri: &str) -> StorageResult<i64>;

    /// Replace name and URI of an existing entry
    async fn update_by_id(&self, id: i64, name: &str, uri: &str) -> StorageResult<()>;
}

/// SQLite implementation of [`Registry`]
#[derive(Debug, Clone)]
pub struct SqliteRegistry {
    pool: SqlitePool,
}

impl SqliteRegistry {
    /// Create a new SQLite registry
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List all entries in id order
    pub async fn find_all(&self) -> StorageResult<Vec<RegistryEntry>> {
        let entries = sqlx::query_as::<_, RegistryEntry>(
            r#"
            SELECT id, name, uri, image
            FROM cards
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

fn validate(name: &str, uri: &str) -> StorageResult<()> {
    if name.trim().is_empty() {
        return Err(StorageError::Validation("name must not be empty".to_string()));
    }
    if uri.trim().is_empty() {
        return Err(StorageError::Validation("uri must not be empty".to_string()));
    }
    Ok(())
}

impl Registry for SqliteRegistry {
    async fn find_by_id(&self, id: i64) -> StorageResult<Option<RegistryEntry>> {
        let entry = sqlx::query_as::<_, RegistryEntry>(
            r#"
            SELECT id, name, uri, image
            FROM cards
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn insert(&self, name: &str, uri: &str) -> StorageResult<i64> {
        validate(name, uri)?;

        let result = sqlx::query("INSERT INTO cards (name, uri) VALUES (?, ?)")
            .bind(name)
            .bind(uri)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn update_by_id(&self, id: i64, name: &str, uri: &str) -> StorageResult<()> {
        validate(name, uri)?;

        let result = sqlx::query("UPDATE cards SET name = ?, uri = ? WHERE id = ?")
            .bind(name)
            .bind(uri)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::entry_not_found(id));
        }

        Ok(())
    }
}
