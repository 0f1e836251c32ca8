//! SQLite connection pool for the card registry.
//!
//! The registry is a single SQLite file. [`Database::new`] creates the file
//! (and its directory) on first start and applies the embedded migrations,
//! so a fresh card box comes up with an empty `cards` table.

use crate::error::{StorageError, StorageResult};
use sqlx::ConnectOptions;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Registry file used when none is configured.
pub const DEFAULT_DATABASE_PATH: &str = "cards.sql";

/// How long a connection waits on a locked registry file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the registry lives and how the pool is sized.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,

    /// Timeout for acquiring a pooled connection.
    pub acquire_timeout: Duration,

    pub create_if_missing: bool,

    /// Apply pending migrations when the pool opens.
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            create_if_missing: true,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn auto_migrate(mut self, migrate: bool) -> Self {
        self.auto_migrate = migrate;
        self
    }
}

/// Pooled handle on the registry database.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open the registry file described by `config`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use kiddyblaster_storage::connection::{Database, DatabaseConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Database::new(DatabaseConfig::new("/home/pi/kiddyblaster/cards.sql")).await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// [`StorageError::Configuration`] if the directory cannot be created,
    /// otherwise the connection or migration failure.
    pub async fn new(config: DatabaseConfig) -> StorageResult<Self> {
        if config.create_if_missing {
            ensure_parent_dir(&config.path)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(BUSY_TIMEOUT)
            .disable_statement_logging();

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await?;
        debug!(path = %config.path.display(), "registry database opened");

        let db = Self { pool };
        if config.auto_migrate {
            db.migrate().await?;
        }

        Ok(db)
    }

    /// An empty, migrated registry that lives as long as the pool.
    ///
    /// Uses a single connection; every further connection would see its
    /// own empty database.
    pub async fn in_memory() -> StorageResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(SqliteConnectOptions::new().in_memory(true))
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Apply the migrations embedded from the workspace `migrations/`
    /// directory. Already applied migrations are skipped.
    pub async fn migrate(&self) -> StorageResult<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        info!("registry schema up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Wait for checked-out connections to return, then close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Configuration(format!(
                    "cannot create {}: {e}",
                    parent.display()
                ))
            })
        }
        _ => Ok(()),
    }
}
