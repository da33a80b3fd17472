use std::sync::Arc;

use crate::db::{FeedStore, UserStore};
use crate::error::Result;
use crate::models::{FeedCatalog, RecordKey, UserRecord, DEFAULT_USER_ID};

use super::subscriptions::SubscriptionManager;

pub struct UserProvisioner<S> {
    store: Arc<S>,
    subscriptions: SubscriptionManager<S>,
    catalog: FeedCatalog,
    seed_user: String,
}

impl<S: UserStore + FeedStore> UserProvisioner<S> {
    pub fn new(store: Arc<S>, subscriptions: SubscriptionManager<S>, catalog: FeedCatalog) -> Self {
        Self {
            store,
            subscriptions,
            catalog,
            seed_user: DEFAULT_USER_ID.to_string(),
        }
    }

    pub fn with_seed_user(mut self, seed_user: impl Into<String>) -> Self {
        self.seed_user = seed_user.into();
        self
    }

    pub fn seed_user(&self) -> &str {
        &self.seed_user
    }

    pub async fn ensure_user(&self, id: &str) -> Result<(RecordKey, UserRecord)> {
        match self.store.find_user(id).await {
            Err(e) if e.is_not_found() => self.provision(id).await,
            found => found,
        }
    }

    async fn provision(&self, id: &str) -> Result<(RecordKey, UserRecord)> {
        let mut user = self.with_default_subscriptions(id).await;

        if id != self.seed_user {
            let (_, seed) = self.ensure_seed_user().await?;
            user.articles = seed.articles;
        }

        let feeds = user.subscribed_feed_urls.len();
        let articles = user.articles.len();
        let created = self.insert_or_load(user).await?;
        tracing::info!(
            "Provisioned user {} with {} feeds and {} articles",
            id,
            feeds,
            articles
        );
        Ok(created)
    }

    // Builds the seed without seeding it, so provisioning never recurses.
    async fn ensure_seed_user(&self) -> Result<(RecordKey, UserRecord)> {
        match self.store.find_user(&self.seed_user).await {
            Err(e) if e.is_not_found() => {
                let seed = self.with_default_subscriptions(&self.seed_user).await;
                let created = self.insert_or_load(seed).await?;
                tracing::info!("Provisioned seed user {}", self.seed_user);
                Ok(created)
            }
            found => found,
        }
    }

    // A concurrent request may have stored the same id since our lookup; its
    // record wins.
    async fn insert_or_load(&self, user: UserRecord) -> Result<(RecordKey, UserRecord)> {
        match self.store.put_user(None, &user).await {
            Ok(key) => Ok((key, user)),
            Err(e) if e.is_conflict() => {
                tracing::debug!("User {} was provisioned concurrently, reloading", user.id);
                self.store.find_user(&user.id).await
            }
            Err(e) => Err(e),
        }
    }

    async fn with_default_subscriptions(&self, id: &str) -> UserRecord {
        let mut user = UserRecord::new(id);
        for entry in self.catalog.defaults() {
            if let Err(e) = self.subscriptions.subscribe(&mut user, &entry.url, true).await {
                tracing::warn!("Skipping default feed {} for {}: {}", entry.url, id, e);
            }
        }
        user
    }
}
