mod common;

use std::sync::Arc;

use common::{catalog, memory_store, FlakyStore};
use feedrank::db::FeedStore;
use feedrank::models::{FeedRecord, UserRecord};
use feedrank::services::FeedSuggester;

fn urls(feeds: &[FeedRecord]) -> Vec<&str> {
    feeds.iter().map(|f| f.url.as_str()).collect()
}

fn subscribed_to(urls: &[&str]) -> UserRecord {
    let mut user = UserRecord::new("alice");
    user.subscribed_feed_urls = urls.iter().map(|u| u.to_string()).collect();
    user
}

async fn store_feeds<S: FeedStore>(store: &S, urls: &[&str]) {
    for url in urls {
        store.put_feed(None, &FeedRecord::new(*url, false, "someone")).await.unwrap();
    }
}

#[tokio::test]
async fn test_suggests_catalog_then_stored_feeds_excluding_subscriptions() {
    let store = memory_store().await;
    store_feeds(store.as_ref(), &["a", "b", "c"]).await;
    let suggester = FeedSuggester::new(Arc::clone(&store), catalog(&[("a", true), ("b", false)]));

    let suggestions = suggester.suggest(&subscribed_to(&["a"])).await;

    assert_eq!(urls(&suggestions), vec!["b", "c"]);
}

#[tokio::test]
async fn test_catalog_entries_come_first_and_keep_default_flag() {
    let store = memory_store().await;
    store_feeds(store.as_ref(), &["z"]).await;
    let suggester = FeedSuggester::new(Arc::clone(&store), catalog(&[("a", true)]));

    let suggestions = suggester.suggest(&subscribed_to(&[])).await;

    assert_eq!(urls(&suggestions), vec!["a", "z"]);
    assert!(suggestions[0].is_default);
    assert!(suggestions[0].subscribers.is_empty());
    assert_eq!(suggestions[1].subscribers, vec!["someone"]);
}

#[tokio::test]
async fn test_unreadable_records_are_skipped() {
    let mut flaky = FlakyStore::new().await;
    flaky.stream_errors = 2;
    store_feeds(&flaky.inner, &["a", "c"]).await;
    let suggester = FeedSuggester::new(Arc::new(flaky), catalog(&[("b", false)]));

    let suggestions = suggester.suggest(&subscribed_to(&["a"])).await;

    assert_eq!(urls(&suggestions), vec!["b", "c"]);
}

#[tokio::test]
async fn test_each_call_reissues_the_query() {
    let store = memory_store().await;
    store_feeds(store.as_ref(), &["a"]).await;
    let suggester = FeedSuggester::new(Arc::clone(&store), catalog(&[]));
    let user = subscribed_to(&[]);

    assert_eq!(urls(&suggester.suggest(&user).await), vec!["a"]);

    store_feeds(store.as_ref(), &["b"]).await;
    assert_eq!(urls(&suggester.suggest(&user).await), vec!["a", "b"]);
}

#[tokio::test]
async fn test_everything_subscribed_yields_nothing() {
    let store = memory_store().await;
    store_feeds(store.as_ref(), &["a", "b"]).await;
    let suggester = FeedSuggester::new(Arc::clone(&store), catalog(&[("a", true)]));

    assert!(suggester.suggest(&subscribed_to(&["a", "b"])).await.is_empty());
}
