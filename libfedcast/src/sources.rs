//! Audience sources: producers of candidate accounts for a given author
//!
//! Each source is an independent, restartable, paged query against the
//! store. The set of sources is closed and small (followers and recent
//! mentions), registered as a static list at resolver construction; there is
//! no runtime plugin discovery.

use async_trait::async_trait;

use crate::error::Result;
use crate::store::ReachStore;
use crate::types::Account;

/// One page of candidate accounts from an audience source
#[derive(Debug, Clone)]
pub struct SourcePage {
    pub accounts: Vec<Account>,
    /// Opaque continuation token; `None` means the source is exhausted
    pub next_cursor: Option<String>,
}

impl SourcePage {
    /// A final page with no continuation
    pub fn last(accounts: Vec<Account>) -> Self {
        Self {
            accounts,
            next_cursor: None,
        }
    }
}

/// A producer of candidate accounts that might need delivery
///
/// Invocations are restartable: every resolution starts from a `None`
/// cursor and re-queries current store state. Sources are pure readers;
/// they never mutate the store.
#[async_trait]
pub trait AudienceSource: Send + Sync {
    /// Lowercase identifier used in logs (e.g. "followers", "mentions")
    fn name(&self) -> &'static str;

    /// Fetch the next page of candidates for `author_id`
    ///
    /// # Errors
    ///
    /// Store failures propagate unmodified; the resolver treats any error
    /// as fatal for the whole resolution.
    async fn next_page(
        &self,
        store: &dyn ReachStore,
        author_id: &str,
        cursor: Option<String>,
    ) -> Result<SourcePage>;
}

/// Every account with an active follow relationship targeting the author
///
/// Pages the underlying query so audiences in the millions never have to be
/// held in memory at once.
pub struct FollowerSource {
    page_size: usize,
}

impl FollowerSource {
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }
}

#[async_trait]
impl AudienceSource for FollowerSource {
    fn name(&self) -> &'static str {
        "followers"
    }

    async fn next_page(
        &self,
        store: &dyn ReachStore,
        author_id: &str,
        cursor: Option<String>,
    ) -> Result<SourcePage> {
        let page = store
            .followers_page(author_id, cursor.as_deref(), self.page_size)
            .await?;
        Ok(SourcePage {
            accounts: page.accounts,
            next_cursor: page.next_cursor,
        })
    }
}

/// Accounts mentioned in the author's most recent statuses
///
/// The window is keyed to the author's own recent statuses, not the item
/// being delivered; fewer (or zero) statuses than the window simply narrows
/// the result. Candidates are deduplicated by account id before emission,
/// and the whole window fits one page.
pub struct RecentMentionSource {
    window: usize,
}

impl RecentMentionSource {
    pub fn new(window: usize) -> Self {
        Self { window }
    }
}

#[async_trait]
impl AudienceSource for RecentMentionSource {
    fn name(&self) -> &'static str {
        "mentions"
    }

    async fn next_page(
        &self,
        store: &dyn ReachStore,
        author_id: &str,
        _cursor: Option<String>,
    ) -> Result<SourcePage> {
        let statuses = store.recent_statuses(author_id, self.window).await?;

        let mut seen = std::collections::HashSet::new();
        let mut accounts = Vec::new();
        for status in &statuses {
            for account in store.mentioned_accounts(&status.id).await? {
                if seen.insert(account.id.clone()) {
                    accounts.push(account);
                }
            }
        }

        Ok(SourcePage::last(accounts))
    }
}
