use super::hydrate::HydratedGenomes;
use crate::models::{Cluster, ClusterProperty};
use std::collections::HashSet;

/// Walk the scaffold in order and attach hydrated genomes.
///
/// Output order is scaffold order and never the map's iteration order.
/// A scaffold cluster without hits is emitted with no genomes.
pub(super) fn assemble(
    scaffold: Vec<ClusterProperty>,
    mut hydrated: HydratedGenomes,
) -> Vec<Cluster> {
    let mut clusters = Vec::with_capacity(scaffold.len());
    let mut seen = HashSet::with_capacity(scaffold.len());

    for properties in scaffold {
        if !seen.insert(properties.cluster_id.clone()) {
            tracing::warn!(cluster_id = %properties.cluster_id, "Duplicate cluster in scaffold");
            continue;
        }

        let mut genomes = hydrated.remove(&properties.cluster_id).unwrap_or_default();
        for genome in genomes.values_mut() {
            genome.sort_hits();
        }

        clusters.push(Cluster {
            properties,
            genomes,
        });
    }

    if !hydrated.is_empty() {
        tracing::debug!(
            orphans = hydrated.len(),
            "Hydrated clusters absent from scaffold were discarded"
        );
    }

    clusters
}
