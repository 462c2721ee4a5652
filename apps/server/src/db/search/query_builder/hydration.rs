//! Aggregation statements that read `temp.cluster_scaffold`.
//!
//! Each returns one row per scaffold cluster with hits: `(cluster_id, payload)`
//! where `payload` is a JSON array built by `json_group_array`. Clusters without
//! hits are simply absent.

const GENOME_RESTRICTION: &str = "IN (SELECT genome_id FROM temp.genome_filter)";

/// Gene hits, one per `gene_matches` row.
///
/// `completeness` is null when the cluster has no usable expected length or
/// the gene has no `gene_info` row. An unannotated gene keeps its contig from
/// the match and reports `0` coordinates; a null coordinate on an existing
/// `gene_info` row is passed through and fails decoding.
pub(super) fn genes(restrict_genomes: bool) -> String {
    let mut sql = String::from(
        "SELECT s.cluster_id AS cluster_id, \
         json_group_array(json_object( \
           'gene_id', gm.gene_id, \
           'completeness', ROUND(100.0 * gi.gene_length \
               / NULLIF(CAST(s.expected_length AS REAL), 0), 2), \
           'description', COALESCE(gi.description, ''), \
           'region', json_object( \
             'genome_id', gm.genome_id, \
             'contig_id', COALESCE(gm.contig_id, ''), \
             'start', CASE WHEN gi.gene_id IS NULL THEN 0 ELSE gi.start_location END, \
             'end', CASE WHEN gi.gene_id IS NULL THEN 0 ELSE gi.end_location END))) AS payload \
         FROM temp.cluster_scaffold s \
         JOIN gene_matches gm ON gm.cluster_id = s.cluster_id \
         LEFT JOIN gene_info gi ON gi.gene_id = gm.gene_id AND gi.genome_id = gm.genome_id",
    );
    if restrict_genomes {
        sql.push_str(" WHERE gm.genome_id ");
        sql.push_str(GENOME_RESTRICTION);
    }
    sql.push_str(" GROUP BY s.cluster_id");
    sql
}

/// Region hits (homologous spans without a gene call).
pub(super) fn regions(restrict_genomes: bool) -> String {
    let mut sql = String::from(
        "SELECT s.cluster_id AS cluster_id, \
         json_group_array(json_object( \
           'genome_id', rm.genome_id, \
           'contig_id', COALESCE(rm.contig_id, ''), \
           'start', rm.start_location, \
           'end', rm.end_location)) AS payload \
         FROM temp.cluster_scaffold s \
         JOIN region_matches rm ON rm.cluster_id = s.cluster_id",
    );
    if restrict_genomes {
        sql.push_str(" WHERE rm.genome_id ");
        sql.push_str(GENOME_RESTRICTION);
    }
    sql.push_str(" GROUP BY s.cluster_id");
    sql
}
