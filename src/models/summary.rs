use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFeedSummary {
    pub url: String,
    pub is_default: bool,
    pub subscriber_count: usize,
    pub refreshed_at: DateTime<Utc>,
}
