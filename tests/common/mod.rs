#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::{self, StreamExt};

use feedrank::db::{FeedStore, FeedStream, Repository, UserStore};
use feedrank::error::{AppError, Result};
use feedrank::models::{CatalogEntry, FeedCatalog, FeedRecord, RecordKey, UserRecord};
use feedrank::services::{RefreshTrigger, SubscriptionManager};

/// Remembers every refresh request instead of queueing it.
#[derive(Default)]
pub struct RecordingTrigger {
    requests: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl RefreshTrigger for RecordingTrigger {
    fn request_refresh(&self, feed_url: &str) {
        self.requests.lock().unwrap().push(feed_url.to_string());
    }
}

fn backend_unavailable() -> AppError {
    AppError::Io(std::io::Error::other("backend unavailable"))
}

/// Delegates to an in-memory repository, injecting failures where configured.
pub struct FlakyStore {
    pub inner: Repository,
    pub failing_feed_writes: HashSet<String>,
    pub fail_user_lookups: bool,
    pub stream_errors: usize,
}

impl FlakyStore {
    pub async fn new() -> Self {
        Self {
            inner: Repository::open_in_memory().await.unwrap(),
            failing_feed_writes: HashSet::new(),
            fail_user_lookups: false,
            stream_errors: 0,
        }
    }

    pub fn failing_feed_write(mut self, url: &str) -> Self {
        self.failing_feed_writes.insert(url.to_string());
        self
    }
}

#[async_trait]
impl UserStore for FlakyStore {
    async fn find_user(&self, id: &str) -> Result<(RecordKey, UserRecord)> {
        if self.fail_user_lookups {
            return Err(backend_unavailable());
        }
        self.inner.find_user(id).await
    }

    async fn put_user(&self, key: Option<RecordKey>, user: &UserRecord) -> Result<RecordKey> {
        self.inner.put_user(key, user).await
    }
}

#[async_trait]
impl FeedStore for FlakyStore {
    async fn find_feed(&self, url: &str) -> Result<(RecordKey, FeedRecord)> {
        self.inner.find_feed(url).await
    }

    async fn put_feed(&self, key: Option<RecordKey>, feed: &FeedRecord) -> Result<RecordKey> {
        if self.failing_feed_writes.contains(&feed.url) {
            return Err(backend_unavailable());
        }
        self.inner.put_feed(key, feed).await
    }

    fn feeds(&self) -> FeedStream<'_> {
        let errors = (0..self.stream_errors).map(|_| Err(backend_unavailable()));
        stream::iter(errors).chain(self.inner.feeds()).boxed()
    }
}

pub async fn memory_store() -> Arc<Repository> {
    Arc::new(Repository::open_in_memory().await.unwrap())
}

pub fn manager<S: FeedStore>(store: &Arc<S>) -> (SubscriptionManager<S>, Arc<RecordingTrigger>) {
    let trigger = Arc::new(RecordingTrigger::default());
    let manager = SubscriptionManager::new(Arc::clone(store), trigger.clone());
    (manager, trigger)
}

pub fn catalog(entries: &[(&str, bool)]) -> FeedCatalog {
    FeedCatalog::new(
        entries
            .iter()
            .map(|(url, is_default)| CatalogEntry::new(*url, *is_default))
            .collect(),
    )
}
