//! Reach resolution: from one status to the set of inboxes that must
//! receive it
//!
//! The resolver merges independent audience sources (followers, recently
//! mentioned accounts) into a single deduplicated endpoint set. Two remote
//! accounts behind one shared inbox collapse to a single delivery target,
//! as does one account reached through two sources.
//!
//! Resolution is fail-fast: if any source's store query fails, the whole
//! resolution fails and no partial set is returned. Silently under-delivering
//! federated content is a correctness defect, so a partial delivery plan is
//! never an acceptable fallback.

use std::sync::Arc;

use futures::future::try_join_all;
use tracing::{debug, trace};

use crate::config::ReachConfig;
use crate::error::{FedcastError, Result};
use crate::sources::{AudienceSource, FollowerSource, RecentMentionSource};
use crate::store::ReachStore;
use crate::types::{Account, ReachSet, Status};

/// Computes the delivery endpoint set for an author's content
///
/// Holds no mutable state between invocations; a single resolver may serve
/// concurrent resolutions. Dropping an in-flight `resolve` future cancels
/// that resolution alone and discards its partial results.
pub struct ReachResolver {
    store: Arc<dyn ReachStore>,
    sources: Vec<Arc<dyn AudienceSource>>,
    config: ReachConfig,
}

impl ReachResolver {
    /// Create a resolver with the standard audience sources
    ///
    /// Registers the followers source (paged by
    /// `config.follower_page_size`) and the recent-mentions source (window
    /// of `config.mention_window` statuses).
    pub fn new(store: Arc<dyn ReachStore>, config: ReachConfig) -> Self {
        let sources: Vec<Arc<dyn AudienceSource>> = vec![
            Arc::new(FollowerSource::new(config.follower_page_size)),
            Arc::new(RecentMentionSource::new(config.mention_window)),
        ];
        Self {
            store,
            sources,
            config,
        }
    }

    /// Create a resolver with a custom source list
    ///
    /// The source set is closed at construction; the resolver iterates it
    /// in registration order.
    pub fn with_sources(
        store: Arc<dyn ReachStore>,
        sources: Vec<Arc<dyn AudienceSource>>,
        config: ReachConfig,
    ) -> Self {
        Self {
            store,
            sources,
            config,
        }
    }

    /// Resolve the endpoint set for a status
    ///
    /// The audience is keyed by the status's author, not the status itself:
    /// "who reaches this author" is a deliberate over-approximation of the
    /// addressee set, sufficient for delivery fan-out. The status only
    /// identifies the author.
    ///
    /// # Errors
    ///
    /// - `UnknownAuthor` if the status references a missing account
    /// - `Store` if any audience source's query fails; no partial set is
    ///   returned
    pub async fn resolve(&self, status: &Status) -> Result<ReachSet> {
        let author = self
            .store
            .get_account(&status.account_id)
            .await?
            .ok_or_else(|| FedcastError::UnknownAuthor(status.account_id.clone()))?;

        self.resolve_account(&author).await
    }

    /// Resolve the endpoint set for an author directly
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_author(&self, author_id: &str) -> Result<ReachSet> {
        let author = self
            .store
            .get_account(author_id)
            .await?
            .ok_or_else(|| FedcastError::UnknownAuthor(author_id.to_string()))?;

        self.resolve_account(&author).await
    }

    /// Resolve a status and hand the result back in fixed-size chunks
    ///
    /// Chunking is purely a batching mechanism for callers that enqueue one
    /// delivery job per chunk: concatenating the chunks reproduces the full
    /// set exactly. The set is resolved completely before the first chunk
    /// is yielded, per the fail-fast policy.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_chunked(
        &self,
        status: &Status,
        chunk_size: usize,
    ) -> Result<impl Iterator<Item = Vec<String>>> {
        let set = self.resolve(status).await?;
        Ok(set.into_chunks(chunk_size))
    }

    /// The resolver's configuration
    pub fn config(&self) -> &ReachConfig {
        &self.config
    }

    async fn resolve_account(&self, author: &Account) -> Result<ReachSet> {
        // Sources are independent; drain them concurrently into per-source
        // partial lists and merge at the end. try_join_all aborts on the
        // first store failure.
        let partials = try_join_all(
            self.sources
                .iter()
                .map(|source| self.collect_source(source.as_ref(), &author.id)),
        )
        .await?;

        let mut set = ReachSet::new();
        for endpoints in partials {
            for url in endpoints {
                set.insert(&url);
            }
        }

        debug!(
            author = %author.id,
            endpoints = set.len(),
            "resolved reach"
        );

        Ok(set)
    }

    /// Drain one source page by page, mapping candidates to endpoints
    async fn collect_source(
        &self,
        source: &dyn AudienceSource,
        author_id: &str,
    ) -> Result<Vec<String>> {
        let mut endpoints = Vec::new();
        let mut candidates = 0usize;
        let mut cursor = None;

        loop {
            let page = source
                .next_page(self.store.as_ref(), author_id, cursor)
                .await?;
            candidates += page.accounts.len();

            for account in &page.accounts {
                match account.preferred_inbox_url() {
                    Some(url) => endpoints.push(url.to_string()),
                    // Local or endpoint-less accounts are excluded, never an error
                    None => trace!(account = %account.id, "candidate has no inbox, skipping"),
                }
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        debug!(
            source = source.name(),
            author = %author_id,
            candidates,
            endpoints = endpoints.len(),
            "drained audience source"
        );

        Ok(endpoints)
    }
}
