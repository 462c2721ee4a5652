use super::{query_builder::BindValue, SearchEngine};
use crate::Result;
use sqlx::SqliteConnection;

impl SearchEngine {
    /// Run a statement that produces no rows (TEMP DDL, allowlist inserts).
    pub(super) async fn execute_statement(
        &self,
        conn: &mut SqliteConnection,
        sql: &str,
        bind_values: Vec<BindValue>,
    ) -> Result<()> {
        let mut query = sqlx::query(sql);
        for value in bind_values {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Integer(v) => query.bind(v),
            };
        }

        query
            .execute(&mut *conn)
            .await
            .map_err(crate::Error::Database)?;

        Ok(())
    }

    pub(super) async fn count_rows(
        &self,
        conn: &mut SqliteConnection,
        sql: &str,
        bind_values: Vec<BindValue>,
    ) -> Result<i64> {
        let mut query = sqlx::query_scalar::<_, i64>(sql);
        for value in bind_values {
            query = match value {
                BindValue::Text(v) => query.bind(v),
                BindValue::Integer(v) => query.bind(v),
            };
        }

        let total = query
            .fetch_one(&mut *conn)
            .await
            .map_err(crate::Error::Database)?;

        Ok(total)
    }
}
