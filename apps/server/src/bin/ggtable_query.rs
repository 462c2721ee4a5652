//! Command-line client for the cluster engine
//!
//! Runs one query against a gene table database and prints JSON on stdout.
//!
//! Usage:
//!   ggtable-query --database data/db/gene_table.db search heat --by function --page-size 10
//!   ggtable-query list --genome G1 --genome G2 --order-by cog_id --desc
//!   ggtable-query cluster CL0000123
//!   ggtable-query gene G1 g-001

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use ggtable::db::search::{
    ClusterSearchRequest, OrderDirection, OrderField, QueryMode, SearchField,
};
use ggtable::{logging, AppState, Config};

#[derive(Parser, Debug)]
#[clap(name = "ggtable-query")]
#[clap(about = "Query gene clusters and print JSON")]
struct Cli {
    /// Database file (overrides configuration)
    #[clap(short, long)]
    database: Option<PathBuf>,

    /// Configuration file (defaults to GGTABLE_CONFIG or ./ggtable.toml)
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Filtered search with page totals
    Search {
        /// Search term (substring, or exact gene ID with --by gene_id)
        term: String,
        /// function | cog_id | cluster_id | gene_id
        #[clap(long, default_value = "function")]
        by: String,
        #[clap(flatten)]
        page: PageArgs,
    },
    /// Unfiltered listing with page totals
    List {
        #[clap(flatten)]
        page: PageArgs,
    },
    /// Count clusters matching a search without fetching them
    Count {
        term: String,
        #[clap(long, default_value = "function")]
        by: String,
        #[clap(long = "genome")]
        genomes: Vec<String>,
    },
    /// One cluster with every genome's hits
    Cluster { cluster_id: String },
    /// The cluster containing a gene
    Gene { genome_id: String, gene_id: String },
    /// The genome directory in display order
    Genomes,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// function | cog_id | cluster_id
    #[clap(long, default_value = "cluster_id")]
    order_by: String,
    /// Sort descending
    #[clap(long)]
    desc: bool,
    #[clap(long, default_value_t = 1)]
    page: i64,
    #[clap(long)]
    page_size: Option<i64>,
    /// Restrict to a genome (repeatable)
    #[clap(long = "genome")]
    genomes: Vec<String>,
}

impl PageArgs {
    fn into_request(
        self,
        field: SearchField,
        term: String,
        default_page_size: i64,
    ) -> Result<ClusterSearchRequest> {
        Ok(ClusterSearchRequest {
            search_field: field,
            search_term: term,
            order_field: OrderField::parse(&self.order_by)?,
            order_direction: if self.desc {
                OrderDirection::Descending
            } else {
                OrderDirection::Ascending
            },
            page: self.page,
            page_size: self.page_size.unwrap_or(default_page_size),
            genome_ids: self.genomes,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_simple_logging();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }
    config.validate().context("Invalid configuration")?;

    let default_page_size = config.search.default_page_size;
    let state = AppState::new(config)
        .await
        .context("Failed to open gene table")?;

    let output = match cli.command {
        Command::Search { term, by, page } => {
            let request =
                page.into_request(SearchField::parse(&by)?, term, default_page_size)?;
            let page = state
                .search_service
                .search_page(&request, QueryMode::Search)
                .await?;
            serde_json::to_value(page)?
        }
        Command::List { page } => {
            let request =
                page.into_request(SearchField::Function, String::new(), default_page_size)?;
            let page = state
                .search_service
                .search_page(&request, QueryMode::Listing)
                .await?;
            serde_json::to_value(page)?
        }
        Command::Count { term, by, genomes } => {
            let request = ClusterSearchRequest {
                search_field: SearchField::parse(&by)?,
                search_term: term,
                genome_ids: genomes,
                ..ClusterSearchRequest::default()
            };
            let total = state.engine.count(&request, QueryMode::Search).await?;
            serde_json::json!({ "total": total })
        }
        Command::Cluster { cluster_id } => {
            serde_json::to_value(state.engine.get_cluster(&cluster_id).await?)?
        }
        Command::Gene { genome_id, gene_id } => {
            serde_json::to_value(state.engine.cluster_for_gene(&genome_id, &gene_id).await?)?
        }
        Command::Genomes => serde_json::to_value(state.genomes.entries())?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
