use thiserror::Error;

/// Errors raised by the card registry.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The SQLite query or connection failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No registry entry carries this id.
    #[error("No registry entry with id {id}")]
    NotFound { id: i64 },

    /// An entry field was rejected before reaching the database.
    #[error("Invalid registry entry: {0}")]
    Validation(String),

    /// The registry file could not be set up.
    #[error("Registry configuration error: {0}")]
    Configuration(String),
}

impl StorageError {
    pub fn entry_not_found(id: i64) -> Self {
        Self::NotFound { id }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
