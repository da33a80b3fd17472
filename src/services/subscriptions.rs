use std::sync::Arc;

use crate::db::FeedStore;
use crate::error::Result;
use crate::models::{FeedRecord, UserRecord};

use super::refresh::RefreshTrigger;

/// The only code path that touches both sides of a subscription.
///
/// The user record is mutated in place and left for the caller to persist; the
/// feed record is persisted here, always after the user side has been updated.
/// Nothing is rolled back when a write fails.
pub struct SubscriptionManager<S> {
    store: Arc<S>,
    refresh: Arc<dyn RefreshTrigger>,
}

impl<S> Clone for SubscriptionManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            refresh: Arc::clone(&self.refresh),
        }
    }
}

impl<S: FeedStore> SubscriptionManager<S> {
    pub fn new(store: Arc<S>, refresh: Arc<dyn RefreshTrigger>) -> Self {
        Self { store, refresh }
    }

    pub async fn subscribe(&self, user: &mut UserRecord, url: &str, is_default: bool) -> Result<()> {
        let (key, mut feed, created) = match self.store.find_feed(url).await {
            Ok((key, feed)) => (key, feed, false),
            Err(e) if e.is_not_found() => {
                let feed = FeedRecord::new(url, is_default, &user.id);
                match self.store.put_feed(None, &feed).await {
                    Ok(key) => {
                        tracing::info!("Created feed {} for {}", url, user.id);
                        self.refresh.request_refresh(url);
                        (key, feed, true)
                    }
                    // Created by a concurrent request since the lookup.
                    Err(e) if e.is_conflict() => {
                        let (key, feed) = self.store.find_feed(url).await?;
                        (key, feed, false)
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        if user.is_subscribed(url) {
            return Ok(());
        }
        user.subscribed_feed_urls.push(url.to_string());

        // A feed created above already lists the user.
        if !created && feed.add_subscriber(&user.id) {
            self.store.put_feed(Some(key), &feed).await?;
        }

        tracing::debug!("{} subscribed to {}", user.id, url);
        Ok(())
    }

    /// Returns `AppError::NotFound` when the feed record does not exist; the user
    /// side has already been updated at that point.
    pub async fn unsubscribe(&self, user: &mut UserRecord, url: &str) -> Result<()> {
        if let Some(index) = user.subscribed_feed_urls.iter().position(|u| u == url) {
            user.subscribed_feed_urls.remove(index);
        }
        user.articles.retain(|article| article.feed_url != url);

        let (key, mut feed) = self.store.find_feed(url).await?;
        if feed.remove_subscriber(&user.id) {
            self.store.put_feed(Some(key), &feed).await?;
            tracing::debug!("{} unsubscribed from {}", user.id, url);
        }

        Ok(())
    }
}
