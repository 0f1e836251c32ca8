//! Configuration file.
//!
//! Every field has a default, so an empty or missing file is a valid
//! configuration:
//!
//! ```toml
//! [server]
//! bind = "0.0.0.0:4444"
//!
//! [database]
//! path = "cards.sql"
//! max_connections = 5
//!
//! [reader]
//! block = 8
//! key = "FFFFFFFFFFFF"
//! poll_interval_ms = 500
//! write_timeout_secs = 60
//! busy_timeout_secs = 5
//!
//! [library]
//! music_dir = "/home/pi/Music"
//! ```

use anyhow::{Context, Result, bail};
use kiddyblaster_core::constants::{
    BLOCK_COUNT, DATA_BLOCK, DEFAULT_BUSY_TIMEOUT_SECS, DEFAULT_MUSIC_DIR,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WRITE_TIMEOUT_SECS,
};
use kiddyblaster_hardware::{CardProtocol, MifareKey};
use kiddyblaster_scan::ScanConfig;
use kiddyblaster_storage::DatabaseConfig;
use kiddyblaster_storage::connection::DEFAULT_DATABASE_PATH;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "kiddyblaster.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseSection,
    pub reader: ReaderSection,
    pub library: LibrarySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 4444)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderSection {
    /// Block holding the card identifier.
    pub block: u8,
    /// Key A of the block's sector, 12 hex digits.
    pub key: String,
    pub poll_interval_ms: u64,
    pub write_timeout_secs: u64,
    pub busy_timeout_secs: u64,
}

impl Default for ReaderSection {
    fn default() -> Self {
        Self {
            block: DATA_BLOCK,
            key: MifareKey::default().to_hex(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            write_timeout_secs: DEFAULT_WRITE_TIMEOUT_SECS,
            busy_timeout_secs: DEFAULT_BUSY_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibrarySection {
    /// Root of the music library; card URIs are relative to it.
    pub music_dir: String,
}

impl Default for LibrarySection {
    fn default() -> Self {
        Self {
            music_dir: DEFAULT_MUSIC_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, [`DEFAULT_CONFIG_FILE`] is
    /// used if present and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse and validate a configuration document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let block = self.reader.block;
        if block == 0 {
            bail!("reader.block 0 is the manufacturer block");
        }
        if block >= BLOCK_COUNT {
            bail!("reader.block {block} is past the last block {}", BLOCK_COUNT - 1);
        }
        if block % 4 == 3 {
            bail!("reader.block {block} is a sector trailer");
        }
        if self.reader.poll_interval_ms == 0 {
            bail!("reader.poll_interval_ms must be positive");
        }
        self.key()?;
        Ok(())
    }

    fn key(&self) -> Result<MifareKey> {
        MifareKey::from_hex(&self.reader.key).context("Invalid reader.key")
    }

    pub fn protocol(&self) -> Result<CardProtocol> {
        Ok(CardProtocol::new(self.reader.block, self.key()?))
    }

    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_poll_interval(Duration::from_millis(self.reader.poll_interval_ms))
            .with_write_timeout(Duration::from_secs(self.reader.write_timeout_secs))
            .with_busy_timeout(Duration::from_secs(self.reader.busy_timeout_secs))
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database.path.clone())
            .max_connections(self.database.max_connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_empty_document_is_default() {
        let config = Config::from_toml("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.server.bind.port(), 4444);
        assert_eq!(config.database.path, PathBuf::from("cards.sql"));
        assert_eq!(config.library.music_dir, "/home/pi/Music");
        assert_eq!(config.protocol().unwrap(), CardProtocol::default());
        assert_eq!(config.scan_config(), ScanConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = Config::from_toml(
            r#"
            [server]
            bind = "127.0.0.1:8080"

            [reader]
            poll_interval_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.scan_config().poll_interval, Duration::from_millis(250));
        assert_eq!(config.reader.write_timeout_secs, 60);
    }

    #[rstest]
    #[case(1)]
    #[case(62)]
    fn test_block_in_range(#[case] block: u8) {
        let config = Config::from_toml(&format!("[reader]\nblock = {block}")).unwrap();
        assert_eq!(config.protocol().unwrap().block(), block);
    }

    #[test]
    fn test_default_key_hex() {
        assert_eq!(Config::default().reader.key, "FFFFFFFFFFFF");
    }

    #[test]
    fn test_custom_key() {
        let config = Config::from_toml("[reader]\nkey = \"a0a1a2a3a4a5\"").unwrap();
        assert_eq!(
            config.protocol().unwrap(),
            CardProtocol::new(8, MifareKey::new([0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5]))
        );
    }

    #[rstest]
    #[case("[reader]\nblock = 0")]
    #[case("[reader]\nblock = 7")]
    #[case("[reader]\nblock = 64")]
    #[case("[reader]\nblock = 254")]
    #[case("[reader]\npoll_interval_ms = 0")]
    #[case("[reader]\nkey = \"FFFF\"")]
    #[case("[reader]\nkey = \"GGGGGGGGGGGG\"")]
    #[case("[server]\nport = 80")]
    fn test_invalid_documents(#[case] content: &str) {
        assert!(Config::from_toml(content).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[library]\nmusic_dir = \"/srv/music\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.library.music_dir, "/srv/music");
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
