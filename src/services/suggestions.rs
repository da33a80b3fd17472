use std::collections::HashSet;
use std::sync::Arc;

use futures::StreamExt;

use crate::db::FeedStore;
use crate::models::{FeedCatalog, FeedRecord, UserRecord};

pub struct FeedSuggester<S> {
    store: Arc<S>,
    catalog: FeedCatalog,
}

impl<S: FeedStore> FeedSuggester<S> {
    pub fn new(store: Arc<S>, catalog: FeedCatalog) -> Self {
        Self { store, catalog }
    }

    pub async fn suggest(&self, user: &UserRecord) -> Vec<FeedRecord> {
        let mut suggestions = Suggestions::new(user);

        for entry in self.catalog.entries() {
            suggestions.offer(FeedRecord::from(entry));
        }

        let mut feeds = self.store.feeds();
        while let Some(item) = feeds.next().await {
            match item {
                Ok(feed) => suggestions.offer(feed),
                Err(e) => tracing::warn!("Skipping unreadable feed record: {}", e),
            }
        }

        suggestions.feeds
    }
}

struct Suggestions<'a> {
    user: &'a UserRecord,
    seen: HashSet<String>,
    feeds: Vec<FeedRecord>,
}

impl<'a> Suggestions<'a> {
    fn new(user: &'a UserRecord) -> Self {
        Self {
            user,
            seen: HashSet::new(),
            feeds: Vec::new(),
        }
    }

    fn offer(&mut self, feed: FeedRecord) {
        if self.user.is_subscribed(&feed.url) || self.seen.contains(&feed.url) {
            return;
        }
        self.seen.insert(feed.url.clone());
        self.feeds.push(feed);
    }
}
