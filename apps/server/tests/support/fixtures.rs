use anyhow::Context as _;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;

/// Common test constants
pub mod constants {
    pub const ECOLI: &str = "G1";
    pub const BSUB: &str = "G2";
    /// `gene_length / expected_length` for `g1` in C1 (350 / 400).
    pub const G1_COMPLETENESS: f64 = 87.5;
}

const SCHEMA: &str = r#"
CREATE TABLE gene_clusters (
    cluster_id TEXT PRIMARY KEY,
    cog_id TEXT,
    expected_length INTEGER,
    function_description TEXT,
    representative_gene TEXT
);
CREATE TABLE gene_matches (
    cluster_id TEXT NOT NULL,
    genome_id TEXT NOT NULL,
    contig_id TEXT,
    gene_id TEXT NOT NULL
);
CREATE TABLE gene_info (
    genome_id TEXT NOT NULL,
    gene_id TEXT NOT NULL,
    gene_length INTEGER,
    start_location INTEGER,
    end_location INTEGER,
    description TEXT
);
CREATE TABLE region_matches (
    cluster_id TEXT NOT NULL,
    genome_id TEXT NOT NULL,
    contig_id TEXT,
    start_location INTEGER,
    end_location INTEGER
);
CREATE TABLE genome_info (
    genome_id TEXT PRIMARY KEY,
    genome_fullname TEXT
);
CREATE INDEX idx_gene_matches_cluster ON gene_matches (cluster_id);
CREATE INDEX idx_gene_matches_gene ON gene_matches (genome_id, gene_id);
CREATE INDEX idx_region_matches_cluster ON region_matches (cluster_id);
"#;

/// Five clusters across two genomes.
///
/// - C1, C2 and C3 mention "heat"; C3 has no hits in G1.
/// - C4 and C2 share gene `dup` in G1.
/// - C5 has a literal `50%` in its function and no expected length, so its
///   G1 gene cannot be scored.
const DATA: &str = r#"
INSERT INTO genome_info VALUES
    ('G1', 'Escherichia coli K-12'),
    ('G2', 'Bacillus subtilis 168');

INSERT INTO gene_clusters VALUES
    ('C1', 'COG0001', 400, 'Heat shock protein HspA', 'g1'),
    ('C2', 'COG0002', 300, 'heat-inducible transcription repressor', 'g2'),
    ('C3', 'COG0003', 500, 'Heat shock 70 kDa protein', 'g5'),
    ('C4', 'COG0100', 1000, 'ABC transporter permease', 'g7'),
    ('C5', 'COG0200', NULL, 'Hypothetical protein, 50% conserved', NULL);

INSERT INTO gene_matches VALUES
    ('C1', 'G1', 'contig1', 'g1'),
    ('C1', 'G2', 'ctgB', 'b1'),
    ('C2', 'G1', 'contig1', 'g2'),
    ('C2', 'G1', 'contig1', 'dup'),
    ('C3', 'G2', 'ctgB', 'g5'),
    ('C4', 'G1', 'contig2', 'g7'),
    ('C4', 'G1', 'contig2', 'dup'),
    ('C5', 'G1', 'contig3', 'orphan');

INSERT INTO gene_info VALUES
    ('G1', 'g1', 350, 100, 1150, 'heat shock protein'),
    ('G2', 'b1', 400, 2000, 3200, 'chaperone'),
    ('G1', 'g2', 300, 5000, 5900, 'repressor'),
    ('G1', 'dup', 100, 8000, 8300, NULL),
    ('G2', 'g5', 250, 700, 1450, 'Hsp70 fragment'),
    ('G1', 'g7', 1000, 12000, 15000, 'permease'),
    ('G1', 'orphan', 120, 300, 660, 'orphan ORF');

INSERT INTO region_matches VALUES
    ('C1', 'G2', 'ctgB', 5000, 5600),
    ('C5', 'G2', 'ctgC', 10, 400);
"#;

/// A cluster whose only gene has no coordinates, so its payload cannot decode.
pub const CORRUPT_CLUSTER: &str = r#"
INSERT INTO gene_clusters VALUES ('C6', 'COG0900', 600, 'Corrupted locus', NULL);
INSERT INTO gene_matches VALUES ('C6', 'G1', 'contig9', 'bad');
INSERT INTO gene_info VALUES ('G1', 'bad', 300, NULL, NULL, NULL);
"#;

/// A "heat" cluster whose only G1 match has no `gene_info` row.
pub const UNANNOTATED_CLUSTER: &str = r#"
INSERT INTO gene_clusters VALUES ('C7', 'COG0700', 900, 'heat stub', NULL);
INSERT INTO gene_matches VALUES ('C7', 'G1', 'contig7', 'noinfo');
"#;

/// Create the gene table database at `path`, load the fixture rows, then
/// `extra` statements.
pub async fn create_gene_table(path: &Path, extra: &str) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .context("create fixture database")?;

    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .context("create fixture schema")?;
    sqlx::raw_sql(DATA)
        .execute(&pool)
        .await
        .context("load fixture rows")?;
    if !extra.trim().is_empty() {
        sqlx::raw_sql(extra)
            .execute(&pool)
            .await
            .context("load extra rows")?;
    }

    pool.close().await;
    Ok(())
}

/// Query items as the HTTP layer would decode them.
pub fn items(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
