//! Database layer - connection pool, genome directory and cluster search

pub mod genomes;
pub mod search;
pub mod transaction;

pub use genomes::{GenomeDirectory, GenomeEntry, GenomeFilter};
pub use search::engine::SearchEngine;
pub use transaction::{ReadTransaction, TransactionSupervisor};

use crate::config::DatabaseConfig;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::time::Duration;

/// Open the gene table database.
///
/// The file must already exist; it is never created.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .read_only(config.read_only)
        .create_if_missing(false)
        .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| {
            Error::Config(format!(
                "Failed to open database {}: {e}",
                config.path.display()
            ))
        })?;

    tracing::info!(
        path = %config.path.display(),
        read_only = config.read_only,
        max_connections = config.max_connections,
        "Database pool ready"
    );

    Ok(pool)
}
