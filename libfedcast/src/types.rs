//! Core types for Fedcast

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Federation protocol of an account
///
/// Stored as TEXT in the database ("local" / "activitypub").
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Local,
    ActivityPub,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::ActivityPub => "activitypub",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "local" => Some(Self::Local),
            "activitypub" => Some(Self::ActivityPub),
            _ => None,
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An account known to the local server, local or remote
///
/// Remote accounts carry a per-account inbox URL and optionally a
/// server-wide shared inbox URL. Local accounts carry neither; content for
/// them never travels over the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub protocol: Protocol,
    /// Home server of a remote account; `None` for local accounts
    pub domain: Option<String>,
    pub inbox_url: Option<String>,
    pub shared_inbox_url: Option<String>,
    pub created_at: i64,
}

impl Account {
    /// Create a local account
    pub fn local(username: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            protocol: Protocol::Local,
            domain: None,
            inbox_url: None,
            shared_inbox_url: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Create a remote ActivityPub account
    pub fn remote(
        username: &str,
        domain: &str,
        inbox_url: &str,
        shared_inbox_url: Option<&str>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            protocol: Protocol::ActivityPub,
            domain: Some(domain.to_string()),
            inbox_url: Some(inbox_url.to_string()),
            shared_inbox_url: shared_inbox_url.map(str::to_string),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// The endpoint content for this account should be delivered to
    ///
    /// Prefers the server-wide shared inbox so that one delivery covers
    /// every recipient on that server; falls back to the per-account inbox.
    /// Returns `None` for local accounts and accounts with no usable inbox,
    /// which is a routine outcome, not an error.
    pub fn preferred_inbox_url(&self) -> Option<&str> {
        match self.shared_inbox_url.as_deref() {
            Some(url) if !url.is_empty() => Some(url),
            _ => match self.inbox_url.as_deref() {
                Some(url) if !url.is_empty() => Some(url),
                _ => None,
            },
        }
    }
}

/// A published status (the content item being delivered)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
    pub id: String,
    pub account_id: String,
    pub created_at: i64,
}

impl Status {
    pub fn new(account_id: &str, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            account_id: account_id.to_string(),
            created_at,
        }
    }
}

/// A mention of an account within a status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub status_id: String,
    pub account_id: String,
    pub created_at: i64,
}

/// The resolved set of delivery endpoints for one piece of content
///
/// Insertion-ordered and unique: two accounts sharing one shared inbox, or
/// one account reached through two audience sources, collapse to a single
/// entry. Constructed fresh per resolution and never persisted. Consumers
/// must not rely on iteration order beyond it matching `chunks`.
#[derive(Debug, Clone, Default)]
pub struct ReachSet {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl ReachSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an endpoint URL, returning `true` if it was not already present
    pub fn insert(&mut self, url: &str) -> bool {
        if self.seen.insert(url.to_string()) {
            self.urls.push(url.to_string());
            true
        } else {
            false
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    /// Consume the set, yielding the endpoint URLs
    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }

    /// Borrowing chunk iterator over the endpoint URLs
    ///
    /// Chunk boundaries are purely a batching mechanism: concatenating the
    /// chunks reproduces the full set exactly, in the same order. A zero
    /// chunk size is treated as one.
    pub fn chunks(&self, chunk_size: usize) -> impl Iterator<Item = &[String]> {
        self.urls.chunks(chunk_size.max(1))
    }

    /// Consuming chunk iterator, for callers that enqueue one job per chunk
    pub fn into_chunks(self, chunk_size: usize) -> impl Iterator<Item = Vec<String>> {
        let chunk_size = chunk_size.max(1);
        let mut urls = self.urls;
        std::iter::from_fn(move || {
            if urls.is_empty() {
                None
            } else {
                let rest = urls.split_off(chunk_size.min(urls.len()));
                Some(std::mem::replace(&mut urls, rest))
            }
        })
    }
}

impl<'a> IntoIterator for &'a ReachSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
