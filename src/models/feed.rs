use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRecord {
    pub url: String,
    pub subscribers: Vec<String>,
    pub is_default: bool,
}

impl FeedRecord {
    pub fn new(url: impl Into<String>, is_default: bool, first_subscriber: &str) -> Self {
        Self {
            url: url.into(),
            subscribers: vec![first_subscriber.to_string()],
            is_default,
        }
    }

    pub fn has_subscriber(&self, user_id: &str) -> bool {
        self.subscribers.iter().any(|s| s == user_id)
    }

    pub fn add_subscriber(&mut self, user_id: &str) -> bool {
        if self.has_subscriber(user_id) {
            return false;
        }
        self.subscribers.push(user_id.to_string());
        true
    }

    pub fn remove_subscriber(&mut self, user_id: &str) -> bool {
        match self.subscribers.iter().position(|s| s == user_id) {
            Some(index) => {
                self.subscribers.remove(index);
                true
            }
            None => false,
        }
    }
}

impl From<&CatalogEntry> for FeedRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            url: entry.url.clone(),
            subscribers: Vec::new(),
            is_default: entry.is_default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub url: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>, is_default: bool) -> Self {
        Self {
            url: url.into(),
            is_default,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCatalog {
    entries: Vec<CatalogEntry>,
}

impl FeedCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            CatalogEntry::new("https://blog.rust-lang.org/feed.xml", true),
            CatalogEntry::new("https://this-week-in-rust.org/rss.xml", true),
            CatalogEntry::new("https://lwn.net/headlines/rss", false),
            CatalogEntry::new("https://hnrss.org/frontpage", false),
        ])
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn defaults(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.is_default)
    }
}
