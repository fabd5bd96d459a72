//! Sqlite-backed store for Fedcast

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;

use crate::error::{FedcastError, Result};
use crate::store::{FollowerPage, ReachStore};
use crate::types::{Account, Protocol, Status};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();
        let path = Path::new(&expanded_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(crate::error::StoreError::IoError)?;
        }

        // Use forward slashes for SQLite URL (works on both Windows and Unix)
        // Use mode=rwc to allow creating the database file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(crate::error::StoreError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(crate::error::StoreError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Insert an account
    pub async fn create_account(&self, account: &Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, protocol, domain, inbox_url, shared_inbox_url, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&account.id)
        .bind(&account.username)
        .bind(account.protocol.as_str())
        .bind(&account.domain)
        .bind(&account.inbox_url)
        .bind(&account.shared_inbox_url)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(())
    }

    /// Record that `account_id` follows `target_account_id`
    pub async fn create_follow(
        &self,
        account_id: &str,
        target_account_id: &str,
        created_at: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO follows (account_id, target_account_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(target_account_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(())
    }

    /// Insert a status
    pub async fn create_status(&self, status: &Status) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO statuses (id, account_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&status.id)
        .bind(&status.account_id)
        .bind(status.created_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(())
    }

    /// Record a mention of `account_id` within `status_id`
    pub async fn create_mention(
        &self,
        status_id: &str,
        account_id: &str,
        created_at: i64,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mentions (status_id, account_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(status_id)
        .bind(account_id)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(())
    }

    /// Look up a status by id
    pub async fn get_status(&self, status_id: &str) -> Result<Option<Status>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, created_at FROM statuses WHERE id = ?
            "#,
        )
        .bind(status_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(row.map(|r| Status {
            id: r.get("id"),
            account_id: r.get("account_id"),
            created_at: r.get("created_at"),
        }))
    }
}

fn account_from_row(row: &SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        protocol: Protocol::parse(&row.get::<String, _>("protocol")).unwrap_or(Protocol::Local),
        domain: row.get("domain"),
        inbox_url: row.get("inbox_url"),
        shared_inbox_url: row.get("shared_inbox_url"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl ReachStore for Database {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, protocol, domain, inbox_url, shared_inbox_url, created_at
            FROM accounts WHERE id = ?
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(row.map(|r| account_from_row(&r)))
    }

    async fn followers_page(
        &self,
        account_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<FollowerPage> {
        // Keyset cursor over the follow row id
        let after: i64 = match cursor {
            Some(c) => c.parse().map_err(|_| {
                FedcastError::InvalidInput(format!("malformed follower cursor: {}", c))
            })?,
            None => 0,
        };
        let page_size = page_size.max(1);

        let rows = sqlx::query(
            r#"
            SELECT a.id, a.username, a.protocol, a.domain, a.inbox_url, a.shared_inbox_url,
                   a.created_at, f.id AS follow_id
            FROM follows f
            INNER JOIN accounts a ON a.id = f.account_id
            WHERE f.target_account_id = ? AND f.id > ?
            ORDER BY f.id
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(after)
        .bind(page_size as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        let next_cursor = if rows.len() == page_size {
            rows.last()
                .map(|r| r.get::<i64, _>("follow_id").to_string())
        } else {
            None
        };

        Ok(FollowerPage {
            accounts: rows.iter().map(account_from_row).collect(),
            next_cursor,
        })
    }

    async fn recent_statuses(&self, account_id: &str, limit: usize) -> Result<Vec<Status>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, created_at
            FROM statuses
            WHERE account_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(account_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(rows
            .iter()
            .map(|r| Status {
                id: r.get("id"),
                account_id: r.get("account_id"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn mentioned_accounts(&self, status_id: &str) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT a.id, a.username, a.protocol, a.domain, a.inbox_url, a.shared_inbox_url,
                   a.created_at
            FROM mentions m
            INNER JOIN accounts a ON a.id = m.account_id
            WHERE m.status_id = ?
            "#,
        )
        .bind(status_id)
        .fetch_all(&self.pool)
        .await
        .map_err(crate::error::StoreError::SqlxError)?;

        Ok(rows.iter().map(account_from_row).collect())
    }
}
