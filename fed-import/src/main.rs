//! fed-import - seed the local store from JSONL records

use clap::Parser;
use libfedcast::{Account, Config, Database, FedcastError, Protocol, Result, Status};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Read};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "fed-import")]
#[command(version, about = "Import accounts, follows, statuses, and mentions from JSONL")]
#[command(long_about = r#"Import federation data into the local store. Input is JSON Lines: one
tagged object per line, read from a file or stdin.

RECORD TYPES:
    {"type":"account","id":"a1","username":"f1","protocol":"activitypub",
     "domain":"x.test","inbox_url":"https://x.test/inbox/f1",
     "shared_inbox_url":"https://x.test/inbox"}
    {"type":"follow","account_id":"a1","target_account_id":"a2"}
    {"type":"status","id":"s1","account_id":"a2","created_at":1700000000}
    {"type":"mention","status_id":"s1","account_id":"a1"}

Missing ids are generated; missing timestamps default to now.

EXAMPLES:
    fed-import fixtures.jsonl
    cat fixtures.jsonl | fed-import
    fed-import --config ./fedcast.toml fixtures.jsonl

EXIT CODES:
    0 - All records imported
    1 - Store or configuration error
    3 - Malformed input line
"#)]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<String>,

    /// Path to the config file (defaults to XDG location or $FEDCAST_CONFIG)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Record {
    Account {
        id: Option<String>,
        username: String,
        protocol: Protocol,
        domain: Option<String>,
        inbox_url: Option<String>,
        shared_inbox_url: Option<String>,
        created_at: Option<i64>,
    },
    Follow {
        account_id: String,
        target_account_id: String,
        created_at: Option<i64>,
    },
    Status {
        id: Option<String>,
        account_id: String,
        created_at: Option<i64>,
    },
    Mention {
        status_id: String,
        account_id: String,
        created_at: Option<i64>,
    },
}

#[derive(Debug, Default)]
struct ImportCounts {
    accounts: usize,
    follows: usize,
    statuses: usize,
    mentions: usize,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        libfedcast::logging::LoggingConfig::new(
            libfedcast::logging::LogFormat::Text,
            "debug".to_string(),
            true,
        )
        .init();
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

    let reader: Box<dyn Read> = match &cli.file {
        Some(path) => Box::new(std::fs::File::open(path).map_err(|e| {
            FedcastError::InvalidInput(format!("cannot open {}: {}", path, e))
        })?),
        None => Box::new(std::io::stdin()),
    };

    let counts = import(&db, BufReader::new(reader)).await?;

    println!(
        "Imported {} accounts, {} follows, {} statuses, {} mentions",
        counts.accounts, counts.follows, counts.statuses, counts.mentions
    );

    Ok(())
}

async fn import<R: BufRead>(db: &Database, reader: R) -> Result<ImportCounts> {
    let mut counts = ImportCounts::default();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| {
            FedcastError::InvalidInput(format!("failed to read line {}: {}", line_no + 1, e))
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let record: Record = serde_json::from_str(&line).map_err(|e| {
            FedcastError::InvalidInput(format!("malformed record on line {}: {}", line_no + 1, e))
        })?;

        apply(db, record, &mut counts).await?;
    }

    tracing::info!(
        accounts = counts.accounts,
        follows = counts.follows,
        statuses = counts.statuses,
        mentions = counts.mentions,
        "import finished"
    );

    Ok(counts)
}

async fn apply(db: &Database, record: Record, counts: &mut ImportCounts) -> Result<()> {
    let now = chrono::Utc::now().timestamp();

    match record {
        Record::Account {
            id,
            username,
            protocol,
            domain,
            inbox_url,
            shared_inbox_url,
            created_at,
        } => {
            let account = Account {
                id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                username,
                protocol,
                domain,
                inbox_url,
                shared_inbox_url,
                created_at: created_at.unwrap_or(now),
            };
            db.create_account(&account).await?;
            counts.accounts += 1;
        }
        Record::Follow {
            account_id,
            target_account_id,
            created_at,
        } => {
            db.create_follow(&account_id, &target_account_id, created_at.unwrap_or(now))
                .await?;
            counts.follows += 1;
        }
        Record::Status {
            id,
            account_id,
            created_at,
        } => {
            let status = Status {
                id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                account_id,
                created_at: created_at.unwrap_or(now),
            };
            db.create_status(&status).await?;
            counts.statuses += 1;
        }
        Record::Mention {
            status_id,
            account_id,
            created_at,
        } => {
            db.create_mention(&status_id, &account_id, created_at.unwrap_or(now))
                .await?;
            counts.mentions += 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use libfedcast::store::ReachStore;
    use tempfile::TempDir;

    async fn setup() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_import_full_fixture() {
        let (db, _tmp) = setup().await;

        let input = r#"
{"type":"account","id":"author","username":"author","protocol":"local"}
{"type":"account","id":"f1","username":"f1","protocol":"activitypub","domain":"x.test","inbox_url":"https://x.test/inbox/f1","shared_inbox_url":"https://x.test/inbox"}
{"type":"follow","account_id":"f1","target_account_id":"author"}
{"type":"status","id":"s1","account_id":"author","created_at":100}
{"type":"mention","status_id":"s1","account_id":"f1"}
"#;

        let counts = import(&db, input.as_bytes()).await.unwrap();
        assert_eq!(counts.accounts, 2);
        assert_eq!(counts.follows, 1);
        assert_eq!(counts.statuses, 1);
        assert_eq!(counts.mentions, 1);

        let page = db.followers_page("author", None, 10).await.unwrap();
        assert_eq!(page.accounts.len(), 1);
        assert_eq!(page.accounts[0].id, "f1");
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_line() {
        let (db, _tmp) = setup().await;

        let input = "{\"type\":\"account\",\"username\":\"ok\",\"protocol\":\"local\"}\nnot json\n";
        let err = import(&db, input.as_bytes()).await.unwrap_err();
        assert!(matches!(err, FedcastError::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"));
    }

    #[tokio::test]
    async fn test_import_skips_blank_lines() {
        let (db, _tmp) = setup().await;

        let input = "\n\n{\"type\":\"account\",\"username\":\"a\",\"protocol\":\"local\"}\n\n";
        let counts = import(&db, input.as_bytes()).await.unwrap();
        assert_eq!(counts.accounts, 1);
    }

    #[tokio::test]
    async fn test_import_generates_missing_ids() {
        let (db, _tmp) = setup().await;

        let input = "{\"type\":\"account\",\"username\":\"anon\",\"protocol\":\"local\"}\n";
        let counts = import(&db, input.as_bytes()).await.unwrap();
        assert_eq!(counts.accounts, 1);
    }
}
