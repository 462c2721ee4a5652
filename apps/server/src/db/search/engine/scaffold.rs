use super::{query_builder::GENOME_FILTER_DDL, QueryBuilder, SearchEngine};
use crate::models::ClusterProperty;
use crate::Result;
use sqlx::SqliteConnection;

const SCAFFOLD_PAGE_SQL: &str = "SELECT cluster_id, cog_id, expected_length, \
     function_description, representative_gene \
     FROM temp.cluster_scaffold ORDER BY position";

impl SearchEngine {
    /// Materialize the allowlist and, on the gene-name path, the distinct
    /// candidate clusters. Scaffold and count both start here.
    pub(super) async fn prepare_candidates(
        &self,
        conn: &mut SqliteConnection,
        query: &QueryBuilder,
    ) -> Result<()> {
        if !query.genome_filter().is_all() {
            self.execute_statement(conn, GENOME_FILTER_DDL, Vec::new())
                .await?;
            if let Some((sql, bind_values)) = query.build_genome_filter_insert() {
                self.execute_statement(conn, &sql, bind_values).await?;
            }
        }

        if let Some((sql, bind_values)) = query.build_matched_clusters_sql() {
            self.execute_statement(conn, &sql, bind_values).await?;
        }

        Ok(())
    }

    /// Build `temp.cluster_scaffold` and read it back in position order.
    ///
    /// The returned order is the only authoritative order for the page.
    #[tracing::instrument(name = "scaffold", skip_all, fields(path = query.path()))]
    pub(super) async fn build_scaffold(
        &self,
        conn: &mut SqliteConnection,
        query: &QueryBuilder,
    ) -> Result<Vec<ClusterProperty>> {
        self.prepare_candidates(conn, query).await?;

        let (sql, bind_values) = query.build_scaffold_sql();
        self.execute_statement(conn, &sql, bind_values).await?;

        let rows = sqlx::query_as::<_, ClusterProperty>(SCAFFOLD_PAGE_SQL)
            .fetch_all(&mut *conn)
            .await
            .map_err(crate::Error::Database)?;

        let pagination = query.pagination();
        tracing::debug!(
            rows = rows.len(),
            limit = pagination.limit(),
            offset = pagination.offset(),
            "Scaffold materialized"
        );
        Ok(rows)
    }

    /// Count the candidate relation the scaffold would paginate.
    #[tracing::instrument(name = "count", skip_all, fields(path = query.path()))]
    pub(super) async fn count_candidates(
        &self,
        conn: &mut SqliteConnection,
        query: &QueryBuilder,
    ) -> Result<i64> {
        self.prepare_candidates(conn, query).await?;

        let (sql, bind_values) = query.build_count_sql();
        self.count_rows(conn, &sql, bind_values).await
    }
}
