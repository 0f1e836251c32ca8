pub mod read;
pub mod serve;
pub mod write;

use anyhow::{Context, Result};
use kiddyblaster_storage::Database;
use std::future::Future;

use crate::config::Config;

/// Open the registry, run `f` on it and close the pool whatever `f` returns.
pub async fn with_database<T, F, Fut>(config: &Config, f: F) -> Result<T>
where
    F: FnOnce(Database) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let db = Database::new(config.database_config())
        .await
        .context("Failed to open card registry")?;

    let result = f(db.clone()).await;
    db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.database.path = dir.path().join("cards.sql");
        config
    }

    #[tokio::test]
    async fn test_pool_closed_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let mut opened = None;

        let value = with_database(&config(&dir), |db| {
            opened = Some(db.clone());
            async move {
                db.health_check().await?;
                Ok(7)
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 7);
        assert!(opened.unwrap().pool().is_closed());
    }

    #[tokio::test]
    async fn test_pool_closed_after_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut opened = None;

        let result: Result<()> = with_database(&config(&dir), |db| {
            opened = Some(db);
            async { bail!("card scan failed") }
        })
        .await;

        assert_eq!(result.unwrap_err().to_string(), "card scan failed");
        assert!(opened.unwrap().pool().is_closed());
    }
}
