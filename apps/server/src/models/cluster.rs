//! Cluster aggregate and the entities hydrated into it

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A genomic coordinate span (1-based, inclusive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub genome_id: String,
    pub contig_id: String,
    pub start: i64,
    pub end: i64,
}

/// A confirmed gene call belonging to a cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub gene_id: String,
    /// `100 * gene_length / expected_length`, rounded to 2 places by the store.
    /// May exceed 100. `None` when the cluster has no usable expected length
    /// or the gene has no annotation row.
    pub completeness: Option<f64>,
    pub description: String,
    pub region: Region,
}

/// Hits of one cluster inside one genome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub genes: Vec<Gene>,
    pub regions: Vec<Region>,
}

impl Genome {
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty() && self.regions.is_empty()
    }

    /// Highest gene completeness in this genome, if any gene could be scored.
    pub fn max_completeness(&self) -> Option<f64> {
        self.genes
            .iter()
            .filter_map(|g| g.completeness)
            .fold(None, |acc, c| match acc {
                Some(m) if m >= c => Some(m),
                _ => Some(c),
            })
    }

    pub(crate) fn sort_hits(&mut self) {
        self.genes.sort_by(|a, b| {
            (&a.gene_id, &a.region.contig_id, a.region.start).cmp(&(
                &b.gene_id,
                &b.region.contig_id,
                b.region.start,
            ))
        });
        self.regions.sort_by(|a, b| {
            (&a.contig_id, a.start, a.end).cmp(&(&b.contig_id, b.start, b.end))
        });
    }
}

/// Scalar attributes of a cluster as stored in `gene_clusters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClusterProperty {
    pub cluster_id: String,
    pub cog_id: String,
    /// Kept as text; it is only used as the completeness denominator in SQL.
    pub expected_length: String,
    pub function_description: String,
    #[serde(rename = "rep_gene")]
    pub representative_gene: String,
}

/// A cluster with every genome that had at least one hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    #[serde(rename = "cluster_properties")]
    pub properties: ClusterProperty,
    pub genomes: BTreeMap<String, Genome>,
}

impl Cluster {
    pub fn new(properties: ClusterProperty) -> Self {
        Self {
            properties,
            genomes: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.properties.cluster_id
    }

    /// Number of genes across all genomes.
    pub fn gene_count(&self) -> usize {
        self.genomes.values().map(|g| g.genes.len()).sum()
    }

    pub fn find_gene(&self, genome_id: &str, gene_id: &str) -> Option<&Gene> {
        self.genomes
            .get(genome_id)?
            .genes
            .iter()
            .find(|g| g.gene_id == gene_id)
    }
}
