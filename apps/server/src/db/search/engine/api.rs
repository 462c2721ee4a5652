use super::{assemble, ClusterSearchRequest, QueryBuilder, QueryMode, SearchEngine};
use crate::config::SearchLimits;
use crate::db::genomes::GenomeDirectory;
use crate::db::transaction::TransactionSupervisor;
use crate::models::Cluster;
use crate::{Error, Result};
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::Arc;
use std::time::{Duration, Instant};

impl SearchEngine {
    /// Create a new search engine.
    pub fn new(pool: SqlitePool, genomes: Arc<GenomeDirectory>, limits: SearchLimits) -> Self {
        Self {
            supervisor: TransactionSupervisor::new(pool),
            genomes,
            limits,
        }
    }

    pub fn genomes(&self) -> &GenomeDirectory {
        &self.genomes
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Compile a request: restrict genomes, clamp pagination, pick the path.
    pub fn compile(&self, request: &ClusterSearchRequest, mode: QueryMode) -> QueryBuilder {
        let genome_filter = self.genomes.restrict(&request.genome_ids);
        let pagination = request.pagination(self.limits.max_page_size);
        QueryBuilder::new(request, mode, genome_filter, pagination)
    }

    /// Filtered search (text predicate applies).
    pub async fn search(&self, request: &ClusterSearchRequest) -> Result<Vec<Cluster>> {
        self.page(request, QueryMode::Search).await
    }

    /// Unfiltered listing; search field and term are ignored.
    pub async fn list(&self, request: &ClusterSearchRequest) -> Result<Vec<Cluster>> {
        self.page(request, QueryMode::Listing).await
    }

    /// One page of clusters in scaffold order. Never partial.
    #[tracing::instrument(
        name = "cluster_page",
        skip(self, request),
        fields(
            mode = mode.as_str(),
            search_field = request.search_field.as_str(),
            order_field = request.order_field.as_str(),
            page = request.page,
            page_size = request.page_size,
        )
    )]
    pub async fn page(
        &self,
        request: &ClusterSearchRequest,
        mode: QueryMode,
    ) -> Result<Vec<Cluster>> {
        let (operation, deadline) = self.deadline_for(mode);
        let query = self.compile(request, mode);

        let start = Instant::now();
        let outcome = self
            .supervisor
            .with_deadline(operation, deadline, self.fetch_clusters(&query))
            .await;
        crate::metrics::record_query(
            operation,
            start.elapsed(),
            &outcome,
            outcome.as_ref().ok().map(Vec::len),
        );

        outcome
    }

    /// Total number of clusters the matching page query would paginate over.
    #[tracing::instrument(
        name = "cluster_count",
        skip(self, request),
        fields(mode = mode.as_str())
    )]
    pub async fn count(&self, request: &ClusterSearchRequest, mode: QueryMode) -> Result<i64> {
        let query = self.compile(request, mode);

        let start = Instant::now();
        let outcome = self
            .supervisor
            .with_deadline("count", self.limits.count_timeout, self.fetch_count(&query))
            .await;
        crate::metrics::record_query("count", start.elapsed(), &outcome, None);

        outcome
    }

    /// Single-cluster lookup with every genome's hits.
    #[tracing::instrument(name = "cluster_lookup", skip(self))]
    pub async fn get_cluster(&self, cluster_id: &str) -> Result<Cluster> {
        let query = QueryBuilder::for_cluster(cluster_id);

        let start = Instant::now();
        let outcome = self
            .supervisor
            .with_deadline("cluster", self.limits.search_timeout, self.fetch_clusters(&query))
            .await
            .and_then(|clusters| {
                clusters
                    .into_iter()
                    .next()
                    .ok_or_else(|| Error::NotFound(format!("cluster {cluster_id}")))
            });
        crate::metrics::record_query("cluster", start.elapsed(), &outcome, None);

        outcome
    }

    /// Distinct, sorted IDs of the clusters containing `gene_id` in `genome_id`.
    pub async fn cluster_ids_for_gene(
        &self,
        genome_id: &str,
        gene_id: &str,
    ) -> Result<Vec<String>> {
        let lookup = async {
            let mut tx = self.supervisor.begin().await?;
            let outcome = sqlx::query_scalar::<_, String>(
                "SELECT DISTINCT cluster_id FROM gene_matches \
                 WHERE genome_id = ?1 AND gene_id = ?2 \
                 ORDER BY cluster_id",
            )
            .bind(genome_id)
            .bind(gene_id)
            .fetch_all(tx.conn())
            .await
            .map_err(Error::Database);
            tx.finish(outcome).await
        };

        self.supervisor
            .with_deadline("gene_lookup", self.limits.count_timeout, lookup)
            .await
    }

    /// The one cluster holding a gene; several is an ambiguity, none is a miss.
    pub async fn cluster_for_gene(&self, genome_id: &str, gene_id: &str) -> Result<Cluster> {
        let ids = self.cluster_ids_for_gene(genome_id, gene_id).await?;
        match ids.as_slice() {
            [] => Err(Error::NotFound(format!(
                "gene {gene_id} in genome {genome_id}"
            ))),
            [cluster_id] => self.get_cluster(cluster_id).await,
            _ => Err(Error::Ambiguous(format!(
                "gene {gene_id} in genome {genome_id} belongs to clusters {}",
                ids.join(", ")
            ))),
        }
    }

    fn deadline_for(&self, mode: QueryMode) -> (&'static str, Duration) {
        match mode {
            QueryMode::Search => ("search", self.limits.search_timeout),
            QueryMode::Listing => ("listing", self.limits.listing_timeout),
        }
    }

    /// Scaffold, hydrate and assemble inside one rolled-back transaction.
    async fn fetch_clusters(&self, query: &QueryBuilder) -> Result<Vec<Cluster>> {
        let mut tx = self.supervisor.begin().await?;
        let outcome = self.run_pipeline(tx.conn(), query).await;
        tx.finish(outcome).await
    }

    async fn fetch_count(&self, query: &QueryBuilder) -> Result<i64> {
        let mut tx = self.supervisor.begin().await?;
        let outcome = self.count_candidates(tx.conn(), query).await;
        tx.finish(outcome).await
    }

    async fn run_pipeline(
        &self,
        conn: &mut SqliteConnection,
        query: &QueryBuilder,
    ) -> Result<Vec<Cluster>> {
        let scaffold = self.build_scaffold(conn, query).await?;
        if scaffold.is_empty() {
            return Ok(Vec::new());
        }

        let hydrated = self.hydrate(conn, query).await?;
        let clusters = assemble::assemble(scaffold, hydrated);
        tracing::debug!(
            clusters = clusters.len(),
            genes = clusters.iter().map(Cluster::gene_count).sum::<usize>(),
            "Page assembled"
        );
        Ok(clusters)
    }
}
