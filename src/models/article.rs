use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::preference::{Preference, AUTHOR_FIELD, FEED_URL_FIELD};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub feed_url: String,
    pub title: String,
    pub url: String,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(feed_url: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            title: title.into(),
            url: url.into(),
            author: None,
            published_at: None,
        }
    }

    pub fn tags(&self) -> Vec<Preference> {
        let mut tags = vec![Preference::new(FEED_URL_FIELD, self.feed_url.clone(), 1)];
        if let Some(author) = &self.author {
            tags.push(Preference::new(AUTHOR_FIELD, author.clone(), 1));
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_without_author() {
        let article = Article::new("https://a.example/feed", "Hello", "https://a.example/1");
        assert_eq!(
            article.tags(),
            vec![Preference::new(FEED_URL_FIELD, "https://a.example/feed", 1)]
        );
    }

    #[test]
    fn test_tags_with_author() {
        let mut article = Article::new("f1", "Hello", "https://a.example/1");
        article.author = Some("ada".to_string());
        let tags = article.tags();
        assert_eq!(tags.len(), 2);
        assert!(tags[1].matches(AUTHOR_FIELD, "ada"));
    }
}
