//! Read transaction supervision
//!
//! Every logical query runs in exactly one transaction on one connection, and
//! that transaction is always rolled back. TEMP relations created while it is
//! open are connection-local and disappear with the rollback, so nothing
//! outlives the query.

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::future::Future;
use std::time::Duration;

use crate::{Error, Result};

/// One read-only transaction pinned to a single pooled connection.
///
/// Dropping it unfinished (a cancelled or timed-out query) leaves the
/// rollback to sqlx, which issues it before the connection is reused.
pub struct ReadTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl ReadTransaction {
    pub async fn begin(pool: &SqlitePool) -> Result<Self> {
        let tx = pool.begin().await.map_err(Error::Database)?;
        Ok(Self { tx })
    }

    /// The connection every stage of the query must use.
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Roll back and hand `outcome` through.
    ///
    /// A rollback failure replaces a successful outcome; it never masks an
    /// earlier error.
    pub async fn finish<T>(self, outcome: Result<T>) -> Result<T> {
        let rolled_back = self.tx.rollback().await.map_err(Error::Database);

        match (outcome, rolled_back) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(rollback_err)) => {
                tracing::error!(error = %rollback_err, "Rollback failed after query error");
                Err(e)
            }
        }
    }
}

/// Runs read transactions against a pool under a deadline.
#[derive(Clone)]
pub struct TransactionSupervisor {
    pool: SqlitePool,
}

impl TransactionSupervisor {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn begin(&self) -> Result<ReadTransaction> {
        ReadTransaction::begin(&self.pool).await
    }

    /// Await `query` for at most `deadline`.
    ///
    /// On expiry the query future is dropped, which drops its
    /// [`ReadTransaction`] and rolls it back; no partial result escapes.
    pub async fn with_deadline<T, F>(
        &self,
        operation: &'static str,
        deadline: Duration,
        query: F,
    ) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(deadline, query).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    operation,
                    timeout_ms = deadline.as_millis() as u64,
                    "Query deadline exceeded"
                );
                Err(Error::QueryTimeout {
                    operation,
                    timeout: deadline,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    fn supervisor() -> TransactionSupervisor {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_lazy("sqlite::memory:")
            .unwrap();
        TransactionSupervisor::new(pool)
    }

    #[tokio::test]
    async fn deadline_passes_results_through() {
        let out = supervisor()
            .with_deadline("search", Duration::from_secs(5), async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_deadline_becomes_query_timeout() {
        let err = supervisor()
            .with_deadline("listing", Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::QueryTimeout {
                operation: "listing",
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn finish_rolls_back_temp_tables() {
        let supervisor = supervisor();

        let mut tx = supervisor.begin().await.unwrap();
        sqlx::query("CREATE TEMP TABLE scratch (x INTEGER)")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.finish(Ok(())).await.unwrap();

        let leftovers: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_temp_master WHERE type = 'table'")
                .fetch_all(supervisor.pool())
                .await
                .unwrap();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn dropped_transaction_still_rolls_back() {
        let supervisor = supervisor();

        {
            let mut tx = supervisor.begin().await.unwrap();
            sqlx::query("CREATE TEMP TABLE abandoned (x INTEGER)")
                .execute(tx.conn())
                .await
                .unwrap();
        }

        let leftovers: Vec<String> =
            sqlx::query_scalar("SELECT name FROM sqlite_temp_master WHERE type = 'table'")
                .fetch_all(supervisor.pool())
                .await
                .unwrap();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn finish_keeps_the_original_error() {
        let tx = supervisor().begin().await.unwrap();
        let err = tx
            .finish::<()>(Err(Error::NotFound("C9".into())))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
