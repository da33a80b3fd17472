mod article;
mod feed;
mod preference;
mod summary;
mod user;

pub use article::Article;
pub use feed::{CatalogEntry, FeedCatalog, FeedRecord};
pub use preference::{Preference, AUTHOR_FIELD, FEED_URL_FIELD};
pub use summary::CachedFeedSummary;
pub use user::{RecordKey, UserRecord, DEFAULT_USER_ID};
