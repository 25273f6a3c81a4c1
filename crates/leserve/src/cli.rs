// CLI Interface
//
// Command-line front end: serve the HTTP API, search from the terminal,
// and run catalog maintenance jobs.

use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use lecatalogue::{refresh_alt_part_ids, refresh_category_counts, CategoryStore, Storage};
use lerecherche::{describe_part, SearchEngine, SearchRequest};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::server::LeServeServer;

/// LeBrique - Catalog Part Search
#[derive(Parser, Debug)]
#[command(name = "leserve")]
#[command(author = "LeBrique Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search a brick part catalog by number, name, dimension and category", long_about = None)]
pub struct Cli {
    /// Path to the SQLite catalog (overrides config and environment)
    #[arg(global = true, long = "db")]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(global = true, long = "config", short = 'c')]
    pub config_path: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(global = true, long = "verbose", short = 'v')]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host address to bind to
        #[arg(long = "host")]
        host: Option<String>,

        /// Port to listen on
        #[arg(long = "port")]
        port: Option<u16>,
    },

    /// Search the catalog
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: Option<String>,

        /// Restrict to a curated category and its descendants
        #[arg(long = "category")]
        category: Option<String>,

        /// Sort key: alt_ids_length, id or name
        #[arg(long = "sort")]
        sort: Option<String>,

        /// Maximum number of results to return
        #[arg(long = "limit")]
        limit: Option<usize>,

        /// Print the response as JSON
        #[arg(long = "json")]
        json: bool,
    },

    /// Show one part with its related parts
    Part {
        /// Part number
        #[arg(value_name = "ID")]
        id: String,
    },

    /// List curated categories
    Categories,

    /// Rebuild the cached alternate part ids from relationships
    RefreshAlternates,

    /// Rebuild the cached per-category part counts
    RefreshCounts,
}

impl Cli {
    /// Run the CLI
    pub async fn run(self) -> AnyhowResult<()> {
        let config = self.resolve_config()?;
        init_logging_impl(self.verbose, &config.log_level);

        match self.command {
            Commands::Serve { host, port } => cmd_serve_impl(config, host, port).await,
            Commands::Search {
                query,
                category,
                sort,
                limit,
                json,
            } => {
                let request = SearchRequest {
                    q: query,
                    category,
                    sort,
                    limit,
                };
                cmd_search_impl(config, request, json).await
            }
            Commands::Part { id } => cmd_part_impl(config, id).await,
            Commands::Categories => cmd_categories_impl(config).await,
            Commands::RefreshAlternates => cmd_refresh_alternates_impl(config).await,
            Commands::RefreshCounts => cmd_refresh_counts_impl(config).await,
        }
    }

    /// Config file, then `LEBRIQUE_*` variables, then `--db`
    fn resolve_config(&self) -> AnyhowResult<ServerConfig> {
        let base = match &self.config_path {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        let mut config = base.with_env_overrides();
        if let Some(db_path) = &self.db_path {
            config.db_path = db_path.to_string_lossy().into_owned();
        }

        Ok(config)
    }
}

/// Initialize logging implementation
///
/// `RUST_LOG` takes precedence over both `--verbose` and the configured level.
fn init_logging_impl(verbose: bool, log_level: &str) {
    let fallback = if verbose { "debug" } else { log_level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Open the configured catalog on the blocking pool and run `work` on it
async fn with_storage<T, F>(config: &ServerConfig, work: F) -> AnyhowResult<T>
where
    T: Send + 'static,
    F: FnOnce(&mut Storage) -> AnyhowResult<T> + Send + 'static,
{
    let db_path = config.db_path.clone();
    let storage_config = config.storage_config();

    tokio::task::spawn_blocking(move || {
        let mut storage = Storage::open_with_config(&db_path, storage_config)
            .with_context(|| format!("Failed to open catalog: {}", db_path))?;
        work(&mut storage)
    })
    .await
    .context("Catalog task failed")?
}

/// Serve command implementation
async fn cmd_serve_impl(
    mut config: ServerConfig,
    host: Option<String>,
    port: Option<u16>,
) -> AnyhowResult<()> {
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let server = LeServeServer::new(config).context("Failed to create server")?;
    println!("LeBrique API listening on {}", server.server_url());
    println!("Press Ctrl+C to stop");

    server.start().await.context("Server failed")?;
    Ok(())
}

/// Search command implementation
async fn cmd_search_impl(config: ServerConfig, request: SearchRequest, json: bool) -> AnyhowResult<()> {
    let default_limit = config.default_limit;
    let response = with_storage(&config, move |storage| {
        SearchEngine::new(&*storage)
            .with_default_limit(default_limit)
            .search(&request)
            .context("Search failed")
    })
    .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if !response.categories.is_empty() {
        println!("Categories: {}", response.categories.join(", "));
    }
    println!("Showing {} of {} matches\n", response.returned, response.total);

    for part in &response.results {
        let category = part
            .ba_category_name
            .as_deref()
            .or(part.category_name.as_deref())
            .unwrap_or("-");
        println!("  {:<12} {} [{}]", part.part.part_num, part.part.name, category);
        if let Some(alt_ids) = &part.part.alt_part_ids {
            println!("  {:<12} also: {}", "", alt_ids);
        }
    }

    Ok(())
}

/// Part command implementation
async fn cmd_part_impl(config: ServerConfig, id: String) -> AnyhowResult<()> {
    let lookup = id.clone();
    let detail = with_storage(&config, move |storage| {
        describe_part(storage, &lookup).context("Part lookup failed")
    })
    .await?;

    match detail {
        Some(detail) => println!("{}", serde_json::to_string_pretty(&detail)?),
        None => anyhow::bail!("Part not found: {}", id),
    }

    Ok(())
}

/// Categories command implementation
async fn cmd_categories_impl(config: ServerConfig) -> AnyhowResult<()> {
    let categories = with_storage(&config, |storage| {
        CategoryStore::new(storage)
            .list()
            .context("Failed to list categories")
    })
    .await?;

    for category in &categories {
        let parent = category.parent_id.as_deref().unwrap_or("-");
        println!(
            "  {:<8} {:<40} parent={:<8} parts={}",
            category.id, category.name, parent, category.parts_count
        );
    }
    println!("\n{} categories", categories.len());

    Ok(())
}

/// Refresh-alternates command implementation
async fn cmd_refresh_alternates_impl(config: ServerConfig) -> AnyhowResult<()> {
    info!("Refreshing alternate part ids in {}", config.db_path);
    let stats = with_storage(&config, |storage| {
        refresh_alt_part_ids(storage).context("Failed to refresh alternate part ids")
    })
    .await?;

    println!("✓ Alternate ids refreshed");
    println!("  Parts scanned: {}", stats.parts_scanned);
    println!("  With alternates: {}", stats.parts_with_alternates);

    Ok(())
}

/// Refresh-counts command implementation
async fn cmd_refresh_counts_impl(config: ServerConfig) -> AnyhowResult<()> {
    info!("Refreshing category part counts in {}", config.db_path);
    let stats = with_storage(&config, |storage| {
        refresh_category_counts(storage).context("Failed to refresh category counts")
    })
    .await?;

    println!("✓ Category counts refreshed");
    println!("  Categories updated: {}", stats.categories_updated);
    println!("  Empty categories: {}", stats.empty_categories);

    Ok(())
}
