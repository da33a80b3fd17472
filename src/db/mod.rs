mod repository;
mod schema;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;
use crate::models::{FeedRecord, RecordKey, UserRecord};

pub use repository::Repository;

/// Lazy sequence of stored feeds. Items may be errors; the end of the stream is
/// signalled by `None`, never by an error.
pub type FeedStream<'a> = BoxStream<'a, Result<FeedRecord>>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> Result<(RecordKey, UserRecord)>;

    /// Writes `user` under `key`, or as a new entity when `key` is `None`.
    /// A new entity whose id is already stored is rejected with
    /// `AppError::Conflict` and nothing is written.
    async fn put_user(&self, key: Option<RecordKey>, user: &UserRecord) -> Result<RecordKey>;
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    async fn find_feed(&self, url: &str) -> Result<(RecordKey, FeedRecord)>;

    async fn put_feed(&self, key: Option<RecordKey>, feed: &FeedRecord) -> Result<RecordKey>;

    fn feeds(&self) -> FeedStream<'_>;
}
