//! Configuration loading
//!
//! Layered, lowest precedence first:
//! 1. Built-in defaults
//! 2. `ggtable.toml` (or the file named by `GGTABLE_CONFIG`), if present
//! 3. Environment variables `GGTABLE__<SECTION>__<KEY>`, after `.env` is read

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

pub const CONFIG_PATH_ENV: &str = "GGTABLE_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "ggtable.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub genomes: GenomesConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub read_only: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/db/gene_table.db"),
            read_only: true,
            max_connections: 8,
            busy_timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub search_timeout_ms: u64,
    pub listing_timeout_ms: u64,
    pub count_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 1000,
            search_timeout_ms: 20_000,
            listing_timeout_ms: 10_000,
            count_timeout_ms: 5_000,
        }
    }
}

/// Engine-facing view of [`SearchConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    pub default_page_size: i64,
    pub max_page_size: i64,
    pub search_timeout: Duration,
    pub listing_timeout: Duration,
    pub count_timeout: Duration,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchConfig::default().limits()
    }
}

impl SearchConfig {
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
            search_timeout: Duration::from_millis(self.search_timeout_ms),
            listing_timeout: Duration::from_millis(self.listing_timeout_ms),
            count_timeout: Duration::from_millis(self.count_timeout_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GenomesConfig {
    /// Preferred display order of genome IDs; unnamed genomes follow by ID.
    pub order: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily | hourly | minutely | never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "./logs".to_string(),
            file_prefix: "ggtable".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl Config {
    /// Load from `.env`, the config file and `GGTABLE__*` variables.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&path)
    }

    /// Load with an explicit config file path; a missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = config::Config::try_from(&Config::default())
            .map_err(|e| Error::Config(format!("Failed to encode defaults: {e}")))?;

        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix("GGTABLE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("genomes.order")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

        settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Failed to parse configuration: {e}")))
    }

    pub fn validate(&self) -> Result<()> {
        let search = &self.search;
        if search.default_page_size < 1 {
            return Err(Error::Config(
                "search.default_page_size must be at least 1".to_string(),
            ));
        }
        if search.max_page_size < 1 {
            return Err(Error::Config(
                "search.max_page_size must be at least 1".to_string(),
            ));
        }
        if search.default_page_size > search.max_page_size {
            return Err(Error::Config(format!(
                "search.default_page_size ({}) exceeds search.max_page_size ({})",
                search.default_page_size, search.max_page_size
            )));
        }
        for (name, value) in [
            ("search.search_timeout_ms", search.search_timeout_ms),
            ("search.listing_timeout_ms", search.listing_timeout_ms),
            ("search.count_timeout_ms", search.count_timeout_ms),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("{name} must be greater than 0")));
            }
        }
        if self.database.max_connections == 0 {
            return Err(Error::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid server address: {e}")))
    }
}
