//! Mock store implementation for testing
//!
//! A configurable in-memory `ReachStore` that can simulate query failures
//! and track call counts. Available for all builds (not just tests) so
//! integration tests can exercise resolver logic without a sqlite fixture.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StoreError};
use crate::store::{FollowerPage, ReachStore};
use crate::types::{Account, Status};

#[derive(Default)]
struct MockData {
    accounts: HashMap<String, Account>,
    /// (follower_id, target_id) pairs, in insertion order
    follows: Vec<(String, String)>,
    statuses: Vec<Status>,
    /// status_id -> mentioned account ids, in insertion order
    mentions: HashMap<String, Vec<String>>,
}

/// In-memory store with failure injection and call counts
#[derive(Clone, Default)]
pub struct MockStore {
    data: Arc<Mutex<MockData>>,
    fail_followers: Arc<Mutex<bool>>,
    fail_statuses: Arc<Mutex<bool>>,
    fail_mentions: Arc<Mutex<bool>>,
    followers_page_calls: Arc<Mutex<usize>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account; returns its id for convenience
    pub fn add_account(&self, account: Account) -> String {
        let id = account.id.clone();
        self.data.lock().unwrap().accounts.insert(id.clone(), account);
        id
    }

    /// Record that `follower_id` follows `target_id`
    pub fn add_follow(&self, follower_id: &str, target_id: &str) {
        self.data
            .lock()
            .unwrap()
            .follows
            .push((follower_id.to_string(), target_id.to_string()));
    }

    /// Record a status, optionally with mentioned account ids
    pub fn add_status(&self, status: Status, mentioned: &[&str]) {
        let mut data = self.data.lock().unwrap();
        data.mentions.insert(
            status.id.clone(),
            mentioned.iter().map(|id| id.to_string()).collect(),
        );
        data.statuses.push(status);
    }

    /// Make subsequent followers queries fail with `StoreError::Unavailable`
    pub fn fail_followers(&self, fail: bool) {
        *self.fail_followers.lock().unwrap() = fail;
    }

    /// Make subsequent recent-statuses queries fail
    pub fn fail_statuses(&self, fail: bool) {
        *self.fail_statuses.lock().unwrap() = fail;
    }

    /// Make subsequent mention queries fail
    pub fn fail_mentions(&self, fail: bool) {
        *self.fail_mentions.lock().unwrap() = fail;
    }

    /// Number of followers pages that have been requested
    pub fn followers_page_calls(&self) -> usize {
        *self.followers_page_calls.lock().unwrap()
    }
}

#[async_trait]
impl ReachStore for MockStore {
    async fn get_account(&self, account_id: &str) -> Result<Option<Account>> {
        Ok(self.data.lock().unwrap().accounts.get(account_id).cloned())
    }

    async fn followers_page(
        &self,
        account_id: &str,
        cursor: Option<&str>,
        page_size: usize,
    ) -> Result<FollowerPage> {
        *self.followers_page_calls.lock().unwrap() += 1;

        if *self.fail_followers.lock().unwrap() {
            return Err(StoreError::Unavailable("followers query failed".to_string()).into());
        }

        let data = self.data.lock().unwrap();
        let offset: usize = cursor.map(|c| c.parse().unwrap_or(0)).unwrap_or(0);

        let follower_ids: Vec<&String> = data
            .follows
            .iter()
            .filter(|(_, target)| target == account_id)
            .map(|(follower, _)| follower)
            .collect();

        let page: Vec<Account> = follower_ids
            .iter()
            .skip(offset)
            .take(page_size)
            .filter_map(|id| data.accounts.get(*id).cloned())
            .collect();

        let consumed = offset + page_size.min(follower_ids.len().saturating_sub(offset));
        let next_cursor = if consumed < follower_ids.len() {
            Some(consumed.to_string())
        } else {
            None
        };

        Ok(FollowerPage {
            accounts: page,
            next_cursor,
        })
    }

    async fn recent_statuses(&self, account_id: &str, limit: usize) -> Result<Vec<Status>> {
        if *self.fail_statuses.lock().unwrap() {
            return Err(StoreError::Unavailable("statuses query failed".to_string()).into());
        }

        let data = self.data.lock().unwrap();
        let mut statuses: Vec<Status> = data
            .statuses
            .iter()
            .filter(|s| s.account_id == account_id)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        statuses.truncate(limit);
        Ok(statuses)
    }

    async fn mentioned_accounts(&self, status_id: &str) -> Result<Vec<Account>> {
        if *self.fail_mentions.lock().unwrap() {
            return Err(StoreError::Unavailable("mentions query failed".to_string()).into());
        }

        let data = self.data.lock().unwrap();
        Ok(data
            .mentions
            .get(status_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| data.accounts.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }
}
