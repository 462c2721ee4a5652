//! Cluster search request parsing and normalisation
//!
//! Handles:
//! - Field and direction tokens (closed allow-lists, unknown tokens are errors)
//! - Query-string items (`search`, `search_by`, `order_by`, `order_dir`, `page`,
//!   `page_size`, `gm_<genome>` and `genome_id`)
//! - The single pagination clamping rule

use crate::error::{Error, FieldKind};
use crate::Result;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Column the search term is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    Function,
    CogId,
    ClusterId,
    /// Exact match on a gene identifier (gene-name path).
    GeneId,
}

impl SearchField {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "cog_id" | "cog" => Ok(Self::CogId),
            "cluster_id" => Ok(Self::ClusterId),
            "gene_id" => Ok(Self::GeneId),
            _ => Err(Error::invalid_field(FieldKind::Search, value)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::CogId => "cog_id",
            Self::ClusterId => "cluster_id",
            Self::GeneId => "gene_id",
        }
    }
}

/// Column the scaffold is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderField {
    Function,
    CogId,
    ClusterId,
}

impl OrderField {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "function" => Ok(Self::Function),
            "cog_id" | "cog" => Ok(Self::CogId),
            "cluster_id" => Ok(Self::ClusterId),
            _ => Err(Error::invalid_field(FieldKind::Order, value)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::CogId => "cog_id",
            Self::ClusterId => "cluster_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl OrderDirection {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(Error::invalid_field(FieldKind::Direction, value)),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Whether the text predicate participates.
///
/// `Listing` is the unfiltered main page: field and term are ignored, order,
/// pagination and the genome allowlist still apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    Search,
    Listing,
}

impl QueryMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::Listing => "listing",
        }
    }
}

/// A search or listing request as received from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSearchRequest {
    pub search_field: SearchField,
    #[serde(default)]
    pub search_term: String,
    pub order_field: OrderField,
    #[serde(default)]
    pub order_direction: OrderDirection,
    pub page: i64,
    pub page_size: i64,
    /// Empty means all genomes.
    #[serde(default)]
    pub genome_ids: Vec<String>,
}

impl Default for ClusterSearchRequest {
    fn default() -> Self {
        Self {
            search_field: SearchField::Function,
            search_term: String::new(),
            order_field: OrderField::ClusterId,
            order_direction: OrderDirection::Ascending,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            genome_ids: Vec::new(),
        }
    }
}

impl ClusterSearchRequest {
    /// Parse from ordered query-string items.
    ///
    /// Missing `search_by` means `function` and missing `order_by` means
    /// `cluster_id`; present but unknown tokens are rejected. Non-numeric
    /// `page`/`page_size` fall back to the defaults; range clamping happens
    /// later in [`Pagination::clamp`].
    pub fn from_items(items: &[(String, String)], default_page_size: i64) -> Result<Self> {
        let mut request = Self {
            page_size: default_page_size,
            ..Self::default()
        };

        for (key, value) in items {
            match key.as_str() {
                "search" => request.search_term = value.trim().to_string(),
                "search_by" => {
                    if !value.trim().is_empty() {
                        request.search_field = SearchField::parse(value)?;
                    }
                }
                "order_by" => {
                    if !value.trim().is_empty() {
                        request.order_field = OrderField::parse(value)?;
                    }
                }
                "order_dir" => request.order_direction = OrderDirection::parse(value)?,
                "page" => request.page = parse_int_or(value, DEFAULT_PAGE),
                "page_size" => request.page_size = parse_int_or(value, default_page_size),
                "genome_id" => push_genome(&mut request.genome_ids, value),
                other => {
                    if let Some(genome) = other.strip_prefix("gm_") {
                        push_genome(&mut request.genome_ids, genome);
                    }
                }
            }
        }

        Ok(request)
    }

    pub fn pagination(&self, max_page_size: i64) -> Pagination {
        Pagination::clamp(self.page, self.page_size, max_page_size)
    }
}

fn parse_int_or(value: &str, fallback: i64) -> i64 {
    value.trim().parse::<i64>().unwrap_or(fallback)
}

fn push_genome(genome_ids: &mut Vec<String>, raw: &str) {
    let id = raw.trim();
    if !id.is_empty() && !genome_ids.iter().any(|g| g == id) {
        genome_ids.push(id.to_string());
    }
}

/// Clamped page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
}

impl Pagination {
    /// `page < 1 → 1`, `page_size < 1 → 1`, `page_size > max → max`.
    pub fn clamp(page: i64, page_size: i64, max_page_size: i64) -> Self {
        let max_page_size = max_page_size.max(1);
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, max_page_size),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// `ceil(total / page_size)`; zero matches means zero pages.
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total + self.page_size - 1) / self.page_size
    }
}
