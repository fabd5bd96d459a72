//! fed-reach - resolve the delivery inboxes for a status or account

use clap::Parser;
use libfedcast::logging::{LogFormat, LoggingConfig};
use libfedcast::{
    Config, Database, FedcastError, ReachConfig, ReachResolver, ReachSet, Result,
};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "fed-reach")]
#[command(version, about = "Resolve the delivery inboxes for a status or account")]
#[command(long_about = r#"Resolve the complete, deduplicated set of delivery inboxes for a piece of
federated content. Followers and recently-mentioned accounts are merged;
accounts behind one shared inbox collapse to a single endpoint.

Give either a status id or --author, not both.

EXAMPLES:
    # Resolve the reach of a status
    fed-reach 0b2f6cfe-76a8-4c1d-9a51-2d84a3e9f001

    # Resolve the reach of an account directly
    fed-reach --author 4f3c2b1a-aaaa-bbbb-cccc-000000000001

    # Emit delivery batches of 50 endpoints, one JSON array per line
    fed-reach --author ACCOUNT_ID --chunk-size 50 --format jsonl

    # Batch using the chunk size from config.toml ([reach] chunk_size)
    fed-reach --author ACCOUNT_ID --chunk-size

    # JSON array output for scripting
    fed-reach STATUS_ID --format json | jq '.[]'

OUTPUT FORMATS:
    text  - One endpoint URL per line; chunks separated by blank lines (default)
    json  - JSON array of URLs (array of arrays when chunked)
    jsonl - One JSON string per line (one JSON array per chunk when chunked)

EXIT CODES:
    0 - Success (including an empty endpoint set)
    1 - Store or configuration error; no partial result was produced
    2 - Unknown author (the status references a missing account)
    3 - Invalid input (bad arguments, unknown status id)
"#)]
struct Cli {
    /// Status id to resolve (omit when using --author)
    status_id: Option<String>,

    /// Resolve an account's reach directly instead of going through a status
    #[arg(short, long, value_name = "ACCOUNT_ID")]
    author: Option<String>,

    /// Split the result into delivery batches of this many endpoints;
    /// without a value, the configured chunk size is used
    #[arg(short, long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
    chunk_size: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    #[arg(value_parser = ["text", "json", "jsonl"])]
    format: String,

    /// Path to the config file (defaults to XDG location or $FEDCAST_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        LoggingConfig::new(LogFormat::Text, "debug".to_string(), true).init();
    } else {
        libfedcast::logging::init_default();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(&path.into())?,
        None => Config::load()?,
    };

    let db = Database::new(&config.database.path).await?;
    let resolver = ReachResolver::new(Arc::new(db.clone()), config.reach.clone());

    let set = resolve_target(
        &db,
        &resolver,
        cli.author.as_deref(),
        cli.status_id.as_deref(),
    )
    .await?;

    tracing::debug!(endpoints = set.len(), "resolution finished");

    match effective_chunk_size(cli.chunk_size, resolver.config()) {
        Some(chunk_size) => {
            let chunks: Vec<Vec<String>> = set.into_chunks(chunk_size).collect();
            print_chunked(&chunks, &cli.format)?;
        }
        None => print_flat(set.as_slice(), &cli.format)?,
    }

    Ok(())
}

/// Pick the resolution target from the command line
///
/// A status id and --author are mutually exclusive: accepting both and
/// quietly preferring one would hide caller mistakes.
async fn resolve_target(
    db: &Database,
    resolver: &ReachResolver,
    author: Option<&str>,
    status_id: Option<&str>,
) -> Result<ReachSet> {
    match (author, status_id) {
        (Some(_), Some(_)) => Err(FedcastError::InvalidInput(
            "provide a status id or --author, not both".to_string(),
        )),
        (Some(author_id), None) => resolver.resolve_author(author_id).await,
        (None, Some(status_id)) => {
            let status = db.get_status(status_id).await?.ok_or_else(|| {
                FedcastError::InvalidInput(format!("no status with id {}", status_id))
            })?;
            resolver.resolve(&status).await
        }
        (None, None) => Err(FedcastError::InvalidInput(
            "provide a status id or --author".to_string(),
        )),
    }
}

/// Resolve the chunk size to use, if any
///
/// `--chunk-size N` wins; a bare `--chunk-size` (parsed as 0) falls back to
/// the configured default; no flag means no chunking.
fn effective_chunk_size(arg: Option<usize>, config: &ReachConfig) -> Option<usize> {
    match arg {
        None => None,
        Some(0) => Some(config.chunk_size),
        Some(n) => Some(n),
    }
}

fn print_flat(urls: &[String], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", to_json(&urls)?),
        "jsonl" => {
            for url in urls {
                println!("{}", to_json(url)?);
            }
        }
        _ => {
            for url in urls {
                println!("{}", url);
            }
        }
    }
    Ok(())
}

fn print_chunked(chunks: &[Vec<String>], format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", to_json(&chunks)?),
        "jsonl" => {
            for chunk in chunks {
                println!("{}", to_json(chunk)?);
            }
        }
        _ => {
            for (i, chunk) in chunks.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                for url in chunk {
                    println!("{}", url);
                }
            }
        }
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| FedcastError::InvalidInput(format!("failed to encode output: {}", e)))
}
