use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adsift::config::Config;
use adsift::crawler::IngestionOrchestrator;
use adsift::models::IngestRequest;
use adsift::storage::{AdvertStore, SqliteAdvertStore};

#[derive(Parser)]
#[command(
    name = "adsift",
    version,
    about = "Marketplace advertisement ingestion pipeline",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Configuration file path (falls back to environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one ingestion job: walk search results and persist the records
    Ingest {
        /// Search query
        query: String,

        /// Maximum number of listing pages to visit
        #[arg(short, long, default_value = "1")]
        limit: u32,

        /// Minimum price filter
        #[arg(long, default_value = "0")]
        price_from: f64,

        /// Maximum price filter
        #[arg(long, default_value = "0")]
        price_to: f64,
    },

    /// List stored adverts for a query within a date range
    Adverts {
        /// Query to match; the literal "all" lists every priced advert
        query: String,

        /// Start of the date range (YYYY-MM-DD, exclusive)
        #[arg(long)]
        from: Option<String>,

        /// End of the date range (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,
    },

    /// List the distinct queries ever ingested
    Queries,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Ingest {
            query,
            limit,
            price_from,
            price_to,
        } => {
            ingest(&config, query, limit, price_from, price_to).await?;
        }

        Commands::Adverts { query, from, to } => {
            adverts(&config, &query, from.as_deref(), to.as_deref())?;
        }

        Commands::Queries => {
            queries(&config)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("adsift=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("adsift=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::from_env(),
    }
}

async fn ingest(
    config: &Config,
    query: String,
    limit: u32,
    price_from: f64,
    price_to: f64,
) -> Result<()> {
    let request = IngestRequest {
        query,
        limit,
        price_from,
        price_to,
    };

    let orchestrator = IngestionOrchestrator::new(config)?;
    let store = SqliteAdvertStore::new(&config.database.sqlite_path)?;

    let report = orchestrator.run(&request, &store).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

fn adverts(config: &Config, query: &str, from: Option<&str>, to: Option<&str>) -> Result<()> {
    let from = match from {
        Some(raw) => parse_day(raw)?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };
    let to = match to {
        Some(raw) => parse_day(raw)?,
        None => Utc::now(),
    };

    let store = SqliteAdvertStore::new(&config.database.sqlite_path)?;
    let found = store.adverts_for(query, from, to)?;
    println!("{}", serde_json::to_string_pretty(&found)?);

    Ok(())
}

fn queries(config: &Config) -> Result<()> {
    let store = SqliteAdvertStore::new(&config.database.sqlite_path)?;
    for query in store.distinct_queries()? {
        println!("{query}");
    }
    Ok(())
}

fn parse_day(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {raw}, expected YYYY-MM-DD"))?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .context("Invalid midnight timestamp")?
        .and_utc())
}
