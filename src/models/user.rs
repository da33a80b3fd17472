use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

use super::article::Article;
use super::preference::Preference;

pub const DEFAULT_USER_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordKey(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub total_read: i64,
    pub subscribed_feed_urls: Vec<String>,
    pub articles: Vec<Article>,
    pub preferences: Vec<Preference>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn is_subscribed(&self, url: &str) -> bool {
        self.subscribed_feed_urls.iter().any(|u| u == url)
    }

    /// Exact match first, then one equal once both sides are parsed as URLs.
    pub fn subscribed_url(&self, url: &str) -> Option<&str> {
        if let Some(exact) = self.subscribed_feed_urls.iter().find(|u| *u == url) {
            return Some(exact);
        }
        let wanted = Url::parse(url).ok()?;
        self.subscribed_feed_urls
            .iter()
            .find(|u| Url::parse(u).is_ok_and(|parsed| parsed == wanted))
            .map(String::as_str)
    }

    pub fn encode_snapshot(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| AppError::Encode(format!("user {}: {}", self.id, e)))
    }

    pub fn decode_snapshot(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| AppError::Decode(format!("user snapshot: {}", e)))
    }

    /// Rebuilds a record from its indexed columns and snapshot.
    ///
    /// The snapshot is the source of truth; the indexed columns only exist for
    /// lookup and must agree with it.
    pub fn restore(indexed_id: &str, indexed_total_read: i64, snapshot: &[u8]) -> Result<Self> {
        let user = Self::decode_snapshot(snapshot)?;
        if user.id != indexed_id || user.total_read != indexed_total_read {
            return Err(AppError::Decode(format!(
                "snapshot for {} disagrees with index (id {}, total_read {} vs {})",
                indexed_id, user.id, user.total_read, indexed_total_read
            )));
        }
        Ok(user)
    }
}
