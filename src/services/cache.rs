use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::CachedFeedSummary;

#[async_trait]
pub trait SummaryCache: Send + Sync {
    async fn get(&self, feed_url: &str) -> Option<CachedFeedSummary>;
}

#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CachedFeedSummary>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, summary: CachedFeedSummary) {
        self.entries
            .write()
            .await
            .insert(summary.url.clone(), summary);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn get(&self, feed_url: &str) -> Option<CachedFeedSummary> {
        self.entries.read().await.get(feed_url).cloned()
    }
}
