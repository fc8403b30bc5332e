use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use cover_enricher::app::EnrichOutcome;
use cover_enricher::config::{Config, StoreBackend};
use cover_enricher::constants::DEFAULT_CONFIG_PATH;
use cover_enricher::domain::{CatalogRecord, RecordKey};
use cover_enricher::infra::{self, InMemoryCatalogStore};
use cover_enricher::{logging, observability, server};

#[derive(Parser)]
#[command(name = "cover_enricher")]
#[command(about = "Adds artist cover images to newly created song records")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Receive record-created notifications over HTTP
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Enrich one record against the configured store
    Enrich {
        /// Record key inside the songs collection
        #[arg(long)]
        key: String,
        /// Artist name from the record
        #[arg(long)]
        artist: String,
    },
    /// Look up the cover for an artist without writing anything
    Lookup {
        #[arg(long)]
        artist: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    match cli.command {
        Commands::Serve { port } => {
            observability::init_metrics();
            let store = infra::catalog_store_from_config(&config)?;
            let use_case = Arc::new(infra::enrich_use_case(&config, store)?);
            let port = port.unwrap_or(config.server.port);

            if let Err(e) = server::start_server(use_case, port).await {
                error!("Server failed: {}", e);
                anyhow::bail!("server stopped: {}", e);
            }
        }
        Commands::Enrich { key, artist } => {
            let key = RecordKey::new(key);
            let record = CatalogRecord::with_artist(artist);

            let outcome = if config.store.backend == StoreBackend::Memory {
                let memory = Arc::new(InMemoryCatalogStore::new());
                memory.insert(key.clone(), record.clone()).await;
                let use_case = infra::enrich_use_case(&config, memory.clone())?;
                let outcome = use_case.handle_created(&key, &record).await;
                if let Some(stored) = memory.get(&key).await {
                    println!("{}", serde_json::to_string_pretty(&stored)?);
                }
                outcome
            } else {
                let store = infra::catalog_store_from_config(&config)?;
                let use_case = infra::enrich_use_case(&config, store)?;
                use_case.handle_created(&key, &record).await
            };

            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if let EnrichOutcome::Skipped { reason, .. } = &outcome {
                info!("Record {} left unchanged ({})", key, reason);
            }
        }
        Commands::Lookup { artist } => {
            let store = Arc::new(InMemoryCatalogStore::new());
            let use_case = infra::enrich_use_case(&config, store)?;
            match use_case.lookup_cover(&artist).await {
                Ok(cover) => println!("{}", serde_json::to_string_pretty(&cover)?),
                Err(e) => {
                    error!(artist = %artist, "Lookup failed: {}", e);
                    println!("No cover found for {}: {}", artist, e);
                }
            }
        }
    }
    Ok(())
}
