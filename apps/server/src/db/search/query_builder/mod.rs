//! SQL query builder for cluster searches.
//!
//! Compiles a [`ClusterSearchRequest`] into the statements the engine runs
//! inside one transaction:
//! - the genome allowlist relation (`temp.genome_filter`)
//! - the gene-name candidate relation (`temp.matched_clusters`)
//! - the ordered, paginated scaffold (`temp.cluster_scaffold`)
//! - the count over the same candidate relation
//! - the gene and region hydration aggregates
//!
//! Only column and direction tokens from closed enums are ever interpolated;
//! every value is bound.

use super::escape::contains_pattern;
use super::params::{
    ClusterSearchRequest, OrderDirection, OrderField, Pagination, QueryMode, SearchField,
};
use crate::db::genomes::GenomeFilter;

mod bind;
mod hydration;

use bind::{push_integer, push_text};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Text(String),
    Integer(i64),
}

pub(crate) const GENOME_FILTER_DDL: &str =
    "CREATE TEMP TABLE genome_filter (genome_id TEXT PRIMARY KEY)";

/// Where candidate clusters come from.
#[derive(Debug, Clone, PartialEq)]
enum CandidateSource {
    /// Every cluster (unfiltered listing).
    All,
    /// Substring match on a scalar cluster column.
    Property { field: SearchField, pattern: String },
    /// Distinct clusters holding a gene with this exact identifier.
    GeneName(String),
    /// Exactly one cluster by ID (single-cluster lookup).
    ClusterId(String),
}

/// Query builder for cluster searches.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    source: CandidateSource,
    order_field: OrderField,
    direction: OrderDirection,
    genome_filter: GenomeFilter,
    pagination: Pagination,
}

impl QueryBuilder {
    pub fn new(
        request: &ClusterSearchRequest,
        mode: QueryMode,
        genome_filter: GenomeFilter,
        pagination: Pagination,
    ) -> Self {
        let source = match mode {
            QueryMode::Listing => CandidateSource::All,
            QueryMode::Search => match request.search_field {
                SearchField::GeneId => CandidateSource::GeneName(request.search_term.clone()),
                field => CandidateSource::Property {
                    field,
                    pattern: contains_pattern(&request.search_term),
                },
            },
        };

        Self {
            source,
            order_field: request.order_field,
            direction: request.order_direction,
            genome_filter,
            pagination,
        }
    }

    /// Single-cluster lookup across all genomes.
    pub fn for_cluster(cluster_id: &str) -> Self {
        Self {
            source: CandidateSource::ClusterId(cluster_id.to_string()),
            order_field: OrderField::ClusterId,
            direction: OrderDirection::Ascending,
            genome_filter: GenomeFilter::All,
            pagination: Pagination::clamp(1, 1, 1),
        }
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn genome_filter(&self) -> &GenomeFilter {
        &self.genome_filter
    }

    /// Which scaffold shape this query takes, for logs.
    pub fn path(&self) -> &'static str {
        match self.source {
            CandidateSource::All => "listing",
            CandidateSource::Property { .. } => "property",
            CandidateSource::GeneName(_) => "gene_name",
            CandidateSource::ClusterId(_) => "cluster_id",
        }
    }

    fn restricts_genomes(&self) -> bool {
        !self.genome_filter.is_all()
    }

    /// Multi-row insert into `temp.genome_filter`; `None` when there is
    /// nothing to insert.
    pub fn build_genome_filter_insert(&self) -> Option<(String, Vec<BindValue>)> {
        let ids = self.genome_filter.ids();
        if ids.is_empty() {
            return None;
        }

        let mut bind_params = Vec::with_capacity(ids.len());
        let rows: Vec<String> = ids
            .iter()
            .map(|id| format!("(?{})", push_text(&mut bind_params, id.clone())))
            .collect();

        let sql = format!(
            "INSERT OR IGNORE INTO temp.genome_filter (genome_id) VALUES {}",
            rows.join(", ")
        );
        Some((sql, bind_params))
    }

    /// Materialize the distinct gene-name hits; `None` on other paths.
    pub fn build_matched_clusters_sql(&self) -> Option<(String, Vec<BindValue>)> {
        let CandidateSource::GeneName(gene_id) = &self.source else {
            return None;
        };

        let mut bind_params = Vec::new();
        let idx = push_text(&mut bind_params, gene_id.clone());
        let mut sql = format!(
            "CREATE TEMP TABLE matched_clusters AS \
             SELECT DISTINCT gm.cluster_id AS cluster_id \
             FROM gene_matches gm \
             WHERE gm.gene_id = ?{}",
            idx
        );
        if self.restricts_genomes() {
            sql.push_str(" AND gm.genome_id IN (SELECT genome_id FROM temp.genome_filter)");
        }
        Some((sql, bind_params))
    }

    /// `CREATE TEMP TABLE cluster_scaffold AS …` with an absolute `position`.
    pub fn build_scaffold_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let order_by = self.order_by_clause();

        let mut sql = format!(
            "CREATE TEMP TABLE cluster_scaffold AS \
             SELECT ROW_NUMBER() OVER (ORDER BY {order_by}) AS position, \
             gc.cluster_id AS cluster_id, \
             COALESCE(gc.cog_id, '') AS cog_id, \
             COALESCE(CAST(gc.expected_length AS TEXT), '') AS expected_length, \
             COALESCE(gc.function_description, '') AS function_description, \
             COALESCE(gc.representative_gene, '') AS representative_gene \
             FROM {}",
            self.from_clause()
        );

        self.push_where(&mut sql, &mut bind_params);

        let limit_idx = push_integer(&mut bind_params, self.pagination.limit());
        let offset_idx = push_integer(&mut bind_params, self.pagination.offset());
        sql.push_str(&format!(
            " ORDER BY {order_by} LIMIT ?{limit_idx} OFFSET ?{offset_idx}"
        ));

        (sql, bind_params)
    }

    /// Count over the identical candidate relation, ignoring pagination.
    pub fn build_count_sql(&self) -> (String, Vec<BindValue>) {
        let mut bind_params = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", self.from_clause());
        self.push_where(&mut sql, &mut bind_params);
        (sql, bind_params)
    }

    pub fn build_gene_hydration_sql(&self) -> String {
        hydration::genes(self.restricts_genomes())
    }

    pub fn build_region_hydration_sql(&self) -> String {
        hydration::regions(self.restricts_genomes())
    }

    fn from_clause(&self) -> &'static str {
        match self.source {
            CandidateSource::GeneName(_) => {
                "gene_clusters gc JOIN temp.matched_clusters mc ON mc.cluster_id = gc.cluster_id"
            }
            _ => "gene_clusters gc",
        }
    }

    fn push_where(&self, sql: &mut String, bind_params: &mut Vec<BindValue>) {
        let mut clauses = Vec::new();

        match &self.source {
            CandidateSource::All | CandidateSource::GeneName(_) => {}
            CandidateSource::Property { field, pattern } => {
                let idx = push_text(bind_params, pattern.clone());
                clauses.push(format!(
                    "{} LIKE ?{} ESCAPE '\\'",
                    search_column(*field),
                    idx
                ));
            }
            CandidateSource::ClusterId(cluster_id) => {
                let idx = push_text(bind_params, cluster_id.clone());
                clauses.push(format!("gc.cluster_id = ?{}", idx));
            }
        }

        if self.restricts_genomes() {
            clauses.push(
                "(EXISTS (SELECT 1 FROM gene_matches fg \
                   WHERE fg.cluster_id = gc.cluster_id \
                   AND fg.genome_id IN (SELECT genome_id FROM temp.genome_filter)) \
                 OR EXISTS (SELECT 1 FROM region_matches fr \
                   WHERE fr.cluster_id = gc.cluster_id \
                   AND fr.genome_id IN (SELECT genome_id FROM temp.genome_filter)))"
                    .to_string(),
            );
        }

        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
    }

    fn order_by_clause(&self) -> String {
        let column = order_column(self.order_field);
        let dir = self.direction.as_sql();
        match self.order_field {
            OrderField::ClusterId => format!("{column} {dir}"),
            _ => format!("{column} {dir}, gc.cluster_id ASC"),
        }
    }
}

fn search_column(field: SearchField) -> &'static str {
    match field {
        SearchField::Function => "gc.function_description",
        SearchField::CogId => "gc.cog_id",
        SearchField::ClusterId | SearchField::GeneId => "gc.cluster_id",
    }
}

fn order_column(field: OrderField) -> &'static str {
    match field {
        OrderField::Function => "gc.function_description",
        OrderField::CogId => "gc.cog_id",
        OrderField::ClusterId => "gc.cluster_id",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(field: SearchField, term: &str, order: OrderField) -> ClusterSearchRequest {
        ClusterSearchRequest {
            search_field: field,
            search_term: term.to_string(),
            order_field: order,
            ..ClusterSearchRequest::default()
        }
    }

    fn builder(req: &ClusterSearchRequest, mode: QueryMode, filter: GenomeFilter) -> QueryBuilder {
        QueryBuilder::new(req, mode, filter, Pagination::clamp(2, 10, 1000))
    }

    #[test]
    fn property_search_binds_escaped_pattern() {
        let req = request(SearchField::Function, "50%", OrderField::ClusterId);
        let (sql, binds) = builder(&req, QueryMode::Search, GenomeFilter::All).build_scaffold_sql();

        assert!(sql.contains("gc.function_description LIKE ?1 ESCAPE '\\'"));
        assert!(sql.contains("ORDER BY gc.cluster_id ASC LIMIT ?2 OFFSET ?3"));
        assert!(!sql.contains("50%"));
        assert_eq!(
            binds,
            vec![
                BindValue::Text("%50\\%%".to_string()),
                BindValue::Integer(10),
                BindValue::Integer(10),
            ]
        );
    }

    #[test]
    fn non_id_order_gets_tie_breaker() {
        let mut req = request(SearchField::CogId, "COG1", OrderField::Function);
        req.order_direction = OrderDirection::Descending;
        let (sql, _) = builder(&req, QueryMode::Search, GenomeFilter::All).build_scaffold_sql();

        assert!(sql.contains("OVER (ORDER BY gc.function_description DESC, gc.cluster_id ASC)"));
        assert!(sql.contains("gc.cog_id LIKE ?1"));
    }

    #[test]
    fn listing_ignores_text_predicate() {
        let req = request(SearchField::Function, "heat", OrderField::ClusterId);
        let b = builder(&req, QueryMode::Listing, GenomeFilter::All);
        let (sql, binds) = b.build_count_sql();

        assert_eq!(sql, "SELECT COUNT(*) FROM gene_clusters gc");
        assert!(binds.is_empty());
        assert!(b.build_matched_clusters_sql().is_none());
    }

    #[test]
    fn gene_path_joins_matched_clusters() {
        let req = request(SearchField::GeneId, "g-001", OrderField::ClusterId);
        let b = builder(
            &req,
            QueryMode::Search,
            GenomeFilter::Only(vec!["G1".to_string()]),
        );

        let (matched, binds) = b.build_matched_clusters_sql().unwrap();
        assert!(matched.contains("WHERE gm.gene_id = ?1"));
        assert!(matched.contains("temp.genome_filter"));
        assert_eq!(binds, vec![BindValue::Text("g-001".to_string())]);

        let (count, count_binds) = b.build_count_sql();
        assert!(count.contains("JOIN temp.matched_clusters mc"));
        assert!(count.contains("EXISTS (SELECT 1 FROM gene_matches fg"));
        assert!(count_binds.is_empty());
    }

    #[test]
    fn count_and_scaffold_share_the_predicate() {
        let req = request(SearchField::Function, "heat", OrderField::CogId);
        let b = builder(
            &req,
            QueryMode::Search,
            GenomeFilter::Only(vec!["G1".to_string()]),
        );
        let (count, count_binds) = b.build_count_sql();
        let (scaffold, scaffold_binds) = b.build_scaffold_sql();

        let where_clause = count.splitn(2, " WHERE ").nth(1).unwrap();
        assert!(scaffold.contains(where_clause));
        assert_eq!(scaffold_binds[..count_binds.len()], count_binds[..]);
    }

    #[test]
    fn genome_filter_insert_binds_every_id() {
        let req = ClusterSearchRequest::default();
        let b = builder(
            &req,
            QueryMode::Listing,
            GenomeFilter::Only(vec!["G1".to_string(), "G2".to_string()]),
        );
        let (sql, binds) = b.build_genome_filter_insert().unwrap();
        assert!(sql.ends_with("VALUES (?1), (?2)"));
        assert_eq!(binds.len(), 2);

        let empty = builder(&req, QueryMode::Listing, GenomeFilter::Only(vec![]));
        assert!(empty.build_genome_filter_insert().is_none());
    }

    #[test]
    fn cluster_lookup_is_exact() {
        let (sql, binds) = QueryBuilder::for_cluster("C1").build_scaffold_sql();
        assert!(sql.contains("gc.cluster_id = ?1"));
        assert!(!sql.contains("genome_filter"));
        assert_eq!(binds[0], BindValue::Text("C1".to_string()));
    }

    #[test]
    fn hydration_filters_only_when_restricted() {
        let req = ClusterSearchRequest::default();
        let all = builder(&req, QueryMode::Listing, GenomeFilter::All);
        let some = builder(&req, QueryMode::Listing, GenomeFilter::Only(vec![]));

        assert!(!all.build_gene_hydration_sql().contains("genome_filter"));
        assert!(some.build_gene_hydration_sql().contains("genome_filter"));
        assert!(some.build_region_hydration_sql().contains("genome_filter"));
    }

    #[test]
    fn gene_aggregate_keeps_matches_without_gene_info() {
        let req = ClusterSearchRequest::default();
        let sql = builder(&req, QueryMode::Search, GenomeFilter::All).build_gene_hydration_sql();

        assert!(sql.contains("LEFT JOIN gene_info gi"));
        assert!(!sql.contains("-1"));
    }
}
