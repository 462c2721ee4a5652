use super::{QueryBuilder, SearchEngine};
use crate::models::{Gene, Genome, Region};
use crate::{Error, Result};
use serde::Deserialize;
use sqlx::SqliteConnection;
use std::collections::{BTreeMap, HashMap};

/// cluster_id → genome_id → hits
pub(super) type HydratedGenomes = HashMap<String, BTreeMap<String, Genome>>;

/// One element of the gene aggregate before classification.
#[derive(Debug, Deserialize)]
struct GeneRow {
    gene_id: Option<String>,
    completeness: Option<f64>,
    #[serde(default)]
    description: Option<String>,
    region: Region,
}

#[derive(Debug, Clone, PartialEq)]
pub(super) enum GeneHit {
    Gene(Gene),
    /// A row without a gene call.
    Region(Region),
}

impl GeneRow {
    fn into_hit(self) -> GeneHit {
        match self.gene_id {
            Some(gene_id) => GeneHit::Gene(Gene {
                gene_id,
                // Only negative lengths produce a negative ratio
                completeness: self.completeness.filter(|c| *c >= 0.0),
                description: self.description.unwrap_or_default(),
                region: self.region,
            }),
            None => GeneHit::Region(self.region),
        }
    }
}

impl SearchEngine {
    /// Attach gene and region hits to every scaffold cluster.
    ///
    /// Must run on the connection holding `temp.cluster_scaffold`.
    #[tracing::instrument(name = "hydrate", skip_all)]
    pub(super) async fn hydrate(
        &self,
        conn: &mut SqliteConnection,
        query: &QueryBuilder,
    ) -> Result<HydratedGenomes> {
        let mut hydrated = HydratedGenomes::new();

        let gene_sql = query.build_gene_hydration_sql();
        let gene_rows: Vec<(String, Option<String>)> = sqlx::query_as(&gene_sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Database)?;

        for (cluster_id, payload) in gene_rows {
            let hits = decode_gene_payload(&cluster_id, payload.as_deref())?;
            merge_gene_hits(&mut hydrated, &cluster_id, hits);
        }

        let region_sql = query.build_region_hydration_sql();
        let region_rows: Vec<(String, Option<String>)> = sqlx::query_as(&region_sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(Error::Database)?;

        for (cluster_id, payload) in region_rows {
            let regions = decode_region_payload(&cluster_id, payload.as_deref())?;
            merge_regions(&mut hydrated, &cluster_id, regions);
        }

        tracing::debug!(clusters = hydrated.len(), "Hydration complete");
        Ok(hydrated)
    }
}

/// Absent, null and empty aggregates all mean "no hits".
fn is_empty_payload(payload: Option<&str>) -> bool {
    match payload {
        None => true,
        Some(p) => matches!(p.trim(), "" | "null" | "[]"),
    }
}

fn decode_failure(cluster_id: &str, relation: &'static str, source: serde_json::Error) -> Error {
    tracing::error!(
        cluster_id,
        relation,
        error = %source,
        "Failed to decode hydration payload"
    );
    Error::HydrationDecode {
        cluster_id: cluster_id.to_string(),
        relation,
        source,
    }
}

pub(super) fn decode_gene_payload(
    cluster_id: &str,
    payload: Option<&str>,
) -> Result<Vec<GeneHit>> {
    let Some(payload) = payload.filter(|p| !is_empty_payload(Some(*p))) else {
        return Ok(Vec::new());
    };

    let rows: Vec<GeneRow> = serde_json::from_str(payload)
        .map_err(|source| decode_failure(cluster_id, "gene", source))?;

    Ok(rows.into_iter().map(GeneRow::into_hit).collect())
}

pub(super) fn decode_region_payload(
    cluster_id: &str,
    payload: Option<&str>,
) -> Result<Vec<Region>> {
    let Some(payload) = payload.filter(|p| !is_empty_payload(Some(*p))) else {
        return Ok(Vec::new());
    };

    serde_json::from_str(payload).map_err(|source| decode_failure(cluster_id, "region", source))
}

fn genome_entry<'a>(
    hydrated: &'a mut HydratedGenomes,
    cluster_id: &str,
    genome_id: &str,
) -> &'a mut Genome {
    hydrated
        .entry(cluster_id.to_string())
        .or_default()
        .entry(genome_id.to_string())
        .or_default()
}

pub(super) fn merge_gene_hits(
    hydrated: &mut HydratedGenomes,
    cluster_id: &str,
    hits: Vec<GeneHit>,
) {
    for hit in hits {
        match hit {
            GeneHit::Gene(gene) => {
                let genome_id = gene.region.genome_id.clone();
                genome_entry(hydrated, cluster_id, &genome_id).genes.push(gene);
            }
            GeneHit::Region(region) => {
                let genome_id = region.genome_id.clone();
                genome_entry(hydrated, cluster_id, &genome_id)
                    .regions
                    .push(region);
            }
        }
    }
}

pub(super) fn merge_regions(
    hydrated: &mut HydratedGenomes,
    cluster_id: &str,
    regions: Vec<Region>,
) {
    for region in regions {
        let genome_id = region.genome_id.clone();
        genome_entry(hydrated, cluster_id, &genome_id)
            .regions
            .push(region);
    }
}
