//! Read-only store abstraction for reach resolution
//!
//! The resolver never owns persistence: accounts, follow relationships,
//! statuses, and mentions live in an externally-owned store that this module
//! only queries. The trait is deliberately paged where the audience can be
//! unbounded (followers), so resolution never has to hold an entire audience
//! in memory.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Account, Status};

pub mod mock;

/// One page of a followers query
///
/// `next_cursor` is an opaque token; pass it back unchanged to fetch the
/// following page. `None` means the audience is exhausted.
#[derive(Debug, Clone)]
pub struct FollowerPage {
    pub accounts: Vec<Account>,
    pub next_cursor: Option<String>,
}

/// Read-only queries the reach resolver needs from the backing store
///
/// Implementations must provide consistent reads within a single call but
/// need no locking discipline beyond that; the resolver never writes.
#[async_trait]
pub trait ReachStore: Send + Sync {
    /// Look up an account by id
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying query fails. A missing account
    /// is `Ok(None)`, not an error; callers decide what absence means.
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>>;

    /// Fetch one page of accounts following `account_id`
    ///
    /// Each resolution starts from a `None` cursor and re-queries current
    /// state; no caching across calls.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying query fails.
    async fn followers_page(
        &self,
        account_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<FollowerPage>;

    /// The author's most recent statuses, descending by creation time
    ///
    /// Returns fewer than `limit` statuses (possibly none) when the author
    /// has not published that many.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying query fails.
    async fn recent_statuses(&self, account_id: &str, limit: usize) -> Result<Vec<Status>>;

    /// Accounts mentioned in the given status
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the underlying query fails.
    async fn mentioned_accounts(&self, status_id: &str) -> Result<Vec<Account>>;
}
