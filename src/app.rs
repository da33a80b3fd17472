use std::sync::Arc;

use crate::config::Config;
use crate::db::{FeedStore, Repository, UserStore};
use crate::error::{AppError, Result};
use crate::models::{Article, CachedFeedSummary, FeedCatalog, FeedRecord, UserRecord};
use crate::ranking::{self, RankedArticle};
use crate::services::{
    FeedSuggester, RefreshTrigger, SubscriptionManager, SummaryCache, UserProvisioner,
};

/// Request-level flows: provision the caller, run one operation, persist the user.
pub struct App<S> {
    store: Arc<S>,
    cache: Arc<dyn SummaryCache>,
    subscriptions: SubscriptionManager<S>,
    provisioner: UserProvisioner<S>,
    suggester: FeedSuggester<S>,
}

impl App<Repository> {
    pub async fn open(
        config: &Config,
        cache: Arc<dyn SummaryCache>,
        refresh: Arc<dyn RefreshTrigger>,
    ) -> Result<Self> {
        let repository = Repository::new(&config.db_path)
            .await?
            .with_feed_page_size(config.feed_page_size);
        Ok(Self::new(Arc::new(repository), cache, refresh, config.catalog())
            .with_seed_user(&config.seed_user))
    }
}

impl<S: UserStore + FeedStore> App<S> {
    pub fn new(
        store: Arc<S>,
        cache: Arc<dyn SummaryCache>,
        refresh: Arc<dyn RefreshTrigger>,
        catalog: FeedCatalog,
    ) -> Self {
        let subscriptions = SubscriptionManager::new(Arc::clone(&store), refresh);
        let provisioner =
            UserProvisioner::new(Arc::clone(&store), subscriptions.clone(), catalog.clone());
        let suggester = FeedSuggester::new(Arc::clone(&store), catalog);

        Self {
            store,
            cache,
            subscriptions,
            provisioner,
            suggester,
        }
    }

    pub fn with_seed_user(mut self, seed_user: &str) -> Self {
        self.provisioner = self.provisioner.with_seed_user(seed_user);
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn user(&self, id: &str) -> Result<UserRecord> {
        let (_, user) = self.provisioner.ensure_user(id).await?;
        Ok(user)
    }

    pub async fn subscribe_user(&self, id: &str, url: &str) -> Result<UserRecord> {
        let (key, mut user) = self.provisioner.ensure_user(id).await?;
        self.subscriptions.subscribe(&mut user, url, false).await?;
        self.store.put_user(Some(key), &user).await?;
        Ok(user)
    }

    /// A missing feed record still persists the user side, since there is no
    /// subscriber list left to keep consistent.
    pub async fn unsubscribe_user(&self, id: &str, url: &str) -> Result<UserRecord> {
        let (key, mut user) = self.provisioner.ensure_user(id).await?;
        match self.subscriptions.unsubscribe(&mut user, url).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::warn!("Unsubscribed {} from unknown feed {}", id, url);
            }
            Err(e) => return Err(e),
        }
        self.store.put_user(Some(key), &user).await?;
        Ok(user)
    }

    pub async fn feed_list(&self, id: &str) -> Result<Vec<CachedFeedSummary>> {
        let (_, user) = self.provisioner.ensure_user(id).await?;
        let mut summaries = Vec::with_capacity(user.subscribed_feed_urls.len());
        for url in &user.subscribed_feed_urls {
            match self.cache.get(url).await {
                Some(summary) => summaries.push(summary),
                None => tracing::warn!("No cached summary for {}", url),
            }
        }
        Ok(summaries)
    }

    pub async fn suggested_feeds(&self, id: &str) -> Result<Vec<FeedRecord>> {
        let (_, user) = self.provisioner.ensure_user(id).await?;
        Ok(self.suggester.suggest(&user).await)
    }

    pub async fn add_article(&self, id: &str, article: Article) -> Result<UserRecord> {
        let (key, mut user) = self.provisioner.ensure_user(id).await?;
        if !user.is_subscribed(&article.feed_url) {
            return Err(AppError::NotFound(format!(
                "subscription to {} for {}",
                article.feed_url, id
            )));
        }
        user.articles.push(article);
        self.store.put_user(Some(key), &user).await?;
        Ok(user)
    }

    pub async fn record_selection(&self, id: &str, article: &Article) -> Result<UserRecord> {
        let (key, mut user) = self.provisioner.ensure_user(id).await?;
        for tag in article.tags() {
            ranking::accumulate(&mut user.preferences, &tag.field, &tag.value);
        }
        user.total_read += 1;
        self.store.put_user(Some(key), &user).await?;
        Ok(user)
    }

    pub async fn ranked_articles(&self, id: &str) -> Result<Vec<RankedArticle>> {
        let (_, user) = self.provisioner.ensure_user(id).await?;
        Ok(ranking::rank_articles(&user.articles, &user.preferences))
    }
}
