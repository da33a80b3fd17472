use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{CatalogEntry, FeedCatalog, DEFAULT_USER_ID};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_seed_user")]
    pub seed_user: String,

    #[serde(default = "default_feed_page_size")]
    pub feed_page_size: usize,

    #[serde(default = "default_refresh_queue_capacity")]
    pub refresh_queue_capacity: usize,

    #[serde(default = "default_catalog")]
    pub catalog: Vec<CatalogEntry>,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedrank");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("feeds.db").to_string_lossy().to_string()
}

fn default_seed_user() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_feed_page_size() -> usize {
    100
}

fn default_refresh_queue_capacity() -> usize {
    64
}

fn default_catalog() -> Vec<CatalogEntry> {
    FeedCatalog::builtin().entries().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            seed_user: default_seed_user(),
            feed_page_size: default_feed_page_size(),
            refresh_queue_capacity: default_refresh_queue_capacity(),
            catalog: default_catalog(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feedrank")
            .join("config.toml")
    }

    pub fn catalog(&self) -> FeedCatalog {
        FeedCatalog::new(self.catalog.clone())
    }

    fn validate(&self) -> Result<()> {
        if self.seed_user.trim().is_empty() {
            return Err(AppError::Config("seed_user must not be empty".to_string()));
        }
        if self.feed_page_size == 0 {
            return Err(AppError::Config("feed_page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}
