use serde::{Deserialize, Serialize};

pub const FEED_URL_FIELD: &str = "feedurl";
pub const AUTHOR_FIELD: &str = "author";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub field: String,
    pub value: String,
    pub score: i64,
}

impl Preference {
    pub fn new(field: impl Into<String>, value: impl Into<String>, score: i64) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            score,
        }
    }

    pub fn matches(&self, field: &str, value: &str) -> bool {
        self.field == field && self.value == value
    }
}
