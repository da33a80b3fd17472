use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::db::FeedStore;
use crate::error::Result;
use crate::models::CachedFeedSummary;

use super::cache::MemoryCache;

pub trait RefreshTrigger: Send + Sync {
    /// Never blocks and never fails the caller; delivery is best effort.
    fn request_refresh(&self, feed_url: &str);
}

#[derive(Clone)]
pub struct RefreshQueue {
    tx: mpsc::Sender<String>,
}

pub fn refresh_channel(capacity: usize) -> (RefreshQueue, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RefreshQueue { tx }, rx)
}

impl RefreshTrigger for RefreshQueue {
    fn request_refresh(&self, feed_url: &str) {
        match self.tx.try_send(feed_url.to_string()) {
            Ok(()) => tracing::debug!("Queued refresh for {}", feed_url),
            Err(TrySendError::Full(url)) => {
                tracing::warn!("Refresh queue full, dropping refresh for {}", url)
            }
            Err(TrySendError::Closed(url)) => {
                tracing::warn!("Refresh queue closed, dropping refresh for {}", url)
            }
        }
    }
}

pub struct RefreshWorker<S> {
    store: Arc<S>,
    cache: Arc<MemoryCache>,
    rx: mpsc::Receiver<String>,
}

impl<S: FeedStore> RefreshWorker<S> {
    pub fn new(store: Arc<S>, cache: Arc<MemoryCache>, rx: mpsc::Receiver<String>) -> Self {
        Self { store, cache, rx }
    }

    pub async fn run(mut self) -> usize {
        let mut refreshed = 0;
        while let Some(url) = self.rx.recv().await {
            match refresh_summary(self.store.as_ref(), &self.cache, &url).await {
                Ok(()) => refreshed += 1,
                Err(e) => tracing::warn!("Failed to refresh {}: {}", url, e),
            }
        }
        refreshed
    }
}

pub async fn refresh_summary<S: FeedStore + ?Sized>(
    store: &S,
    cache: &MemoryCache,
    url: &str,
) -> Result<()> {
    let (_, feed) = store.find_feed(url).await?;
    cache
        .put(CachedFeedSummary {
            url: feed.url,
            is_default: feed.is_default,
            subscriber_count: feed.subscribers.len(),
            refreshed_at: Utc::now(),
        })
        .await;
    tracing::debug!("Refreshed summary for {}", url);
    Ok(())
}
