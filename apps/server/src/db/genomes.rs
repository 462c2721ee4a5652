//! Genome directory: the process-wide, read-only universe of genome IDs.
//!
//! Built once at startup from `genome_info` and shared by reference; the
//! engine only consults it to restrict genome filters.

use crate::Result;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct GenomeDirectory {
    names: HashMap<String, String>,
    order: Vec<String>,
}

/// One directory entry as exposed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomeEntry {
    pub genome_id: String,
    pub name: String,
}

/// Effective genome allowlist for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenomeFilter {
    All,
    /// May be empty, in which case nothing matches.
    Only(Vec<String>),
}

impl GenomeFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, GenomeFilter::All)
    }

    pub fn ids(&self) -> &[String] {
        match self {
            GenomeFilter::All => &[],
            GenomeFilter::Only(ids) => ids,
        }
    }
}

impl GenomeDirectory {
    /// Build from `(genome_id, name)` pairs.
    ///
    /// Default order is by genome ID. When `preferred_order` is non-empty it
    /// leads, unknown entries in it are dropped, and genomes it does not name
    /// follow in ID order.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (String, String)>,
        preferred_order: &[String],
    ) -> Self {
        let names: HashMap<String, String> = entries.into_iter().collect();

        let mut order = Vec::with_capacity(names.len());
        let mut seen = HashSet::new();
        for id in preferred_order {
            if !names.contains_key(id) {
                tracing::warn!(genome_id = %id, "Ignoring unknown genome in configured order");
                continue;
            }
            if seen.insert(id.clone()) {
                order.push(id.clone());
            }
        }

        let mut rest: Vec<String> = names
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();
        rest.sort();
        order.extend(rest);

        Self { names, order }
    }

    pub async fn load(pool: &SqlitePool, preferred_order: &[String]) -> Result<Self> {
        let rows: Vec<(String, Option<String>)> =
            sqlx::query_as("SELECT genome_id, genome_fullname FROM genome_info")
                .fetch_all(pool)
                .await
                .map_err(crate::Error::Database)?;

        let directory = Self::from_entries(
            rows.into_iter()
                .map(|(id, name)| (id.clone(), name.unwrap_or(id))),
            preferred_order,
        );

        tracing::info!(genomes = directory.len(), "Genome directory loaded");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, genome_id: &str) -> bool {
        self.names.contains_key(genome_id)
    }

    pub fn name(&self, genome_id: &str) -> Option<&str> {
        self.names.get(genome_id).map(String::as_str)
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn entries(&self) -> Vec<GenomeEntry> {
        self.order
            .iter()
            .map(|id| GenomeEntry {
                genome_id: id.clone(),
                name: self.name(id).unwrap_or(id).to_string(),
            })
            .collect()
    }

    /// Restrict a requested genome list to known genomes.
    ///
    /// An empty request means all genomes. Unknown IDs are dropped; a request
    /// naming only unknown genomes yields an empty allowlist rather than
    /// widening to all genomes.
    pub fn restrict(&self, requested: &[String]) -> GenomeFilter {
        if requested.is_empty() {
            return GenomeFilter::All;
        }

        let mut seen = HashSet::new();
        let mut ids = Vec::with_capacity(requested.len());
        for id in requested {
            if !self.contains(id) {
                tracing::warn!(genome_id = %id, "Dropping unknown genome from filter");
                continue;
            }
            if seen.insert(id.as_str()) {
                ids.push(id.clone());
            }
        }
        GenomeFilter::Only(ids)
    }
}
