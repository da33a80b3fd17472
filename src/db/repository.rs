use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::{FeedRecord, RecordKey, UserRecord};

use super::schema::SCHEMA;
use super::{FeedStore, FeedStream, UserStore};

const DEFAULT_FEED_PAGE_SIZE: usize = 100;

pub struct Repository {
    conn: Connection,
    feed_page_size: usize,
}

struct UserRow {
    key: i64,
    user_id: String,
    total_read: i64,
    snapshot: Vec<u8>,
}

struct FeedRow {
    key: i64,
    url: String,
    is_default: bool,
    subscribers: String,
}

impl FeedRow {
    fn decode(self) -> Result<FeedRecord> {
        let subscribers = serde_json::from_str(&self.subscribers)
            .map_err(|e| AppError::Decode(format!("subscribers of {}: {}", self.url, e)))?;
        Ok(FeedRecord {
            url: self.url,
            subscribers,
            is_default: self.is_default,
        })
    }
}

#[derive(Default)]
struct FeedCursor {
    after: i64,
    buffered: VecDeque<Result<FeedRecord>>,
    exhausted: bool,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::with_connection(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            feed_page_size: DEFAULT_FEED_PAGE_SIZE,
        })
    }

    pub fn with_feed_page_size(mut self, page_size: usize) -> Self {
        self.feed_page_size = page_size.max(1);
        self
    }

    async fn feed_page(&self, after: i64, limit: usize) -> Result<Vec<FeedRow>> {
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, url, is_default, subscribers FROM feeds WHERE id > ?1 ORDER BY id LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(params![after, limit as i64], feed_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for Repository {
    async fn find_user(&self, id: &str) -> Result<(RecordKey, UserRecord)> {
        let lookup = id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT id, user_id, total_read, snapshot FROM users WHERE user_id = ?1 LIMIT 1",
                        params![lookup],
                        user_from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let row = row.ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        let user = UserRecord::restore(&row.user_id, row.total_read, &row.snapshot)?;
        Ok((RecordKey(row.key), user))
    }

    async fn put_user(&self, key: Option<RecordKey>, user: &UserRecord) -> Result<RecordKey> {
        let snapshot = user.encode_snapshot()?;
        let user_id = user.id.clone();
        let total_read = user.total_read;

        let id = self
            .conn
            .call(move |conn| match key {
                Some(RecordKey(id)) => {
                    conn.execute(
                        r#"INSERT INTO users (id, user_id, total_read, snapshot)
                           VALUES (?1, ?2, ?3, ?4)
                           ON CONFLICT(id) DO UPDATE SET
                               user_id = excluded.user_id,
                               total_read = excluded.total_read,
                               snapshot = excluded.snapshot,
                               updated_at = datetime('now')"#,
                        params![id, user_id, total_read, snapshot],
                    )?;
                    Ok(Some(id))
                }
                None => {
                    let inserted = conn.execute(
                        r#"INSERT INTO users (user_id, total_read, snapshot)
                           VALUES (?1, ?2, ?3)
                           ON CONFLICT(user_id) DO NOTHING"#,
                        params![user_id, total_read, snapshot],
                    )?;
                    Ok((inserted > 0).then(|| conn.last_insert_rowid()))
                }
            })
            .await?;

        let id = id.ok_or_else(|| AppError::Conflict(format!("user {}", user.id)))?;
        Ok(RecordKey(id))
    }
}

#[async_trait]
impl FeedStore for Repository {
    async fn find_feed(&self, url: &str) -> Result<(RecordKey, FeedRecord)> {
        let lookup = url.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let row = conn
                    .query_row(
                        "SELECT id, url, is_default, subscribers FROM feeds WHERE url = ?1 LIMIT 1",
                        params![lookup],
                        feed_from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        let row = row.ok_or_else(|| AppError::NotFound(format!("feed {}", url)))?;
        let key = RecordKey(row.key);
        Ok((key, row.decode()?))
    }

    async fn put_feed(&self, key: Option<RecordKey>, feed: &FeedRecord) -> Result<RecordKey> {
        let subscribers = serde_json::to_string(&feed.subscribers)?;
        let url = feed.url.clone();
        let is_default = feed.is_default;

        let id = self
            .conn
            .call(move |conn| match key {
                Some(RecordKey(id)) => {
                    conn.execute(
                        r#"INSERT INTO feeds (id, url, is_default, subscribers)
                           VALUES (?1, ?2, ?3, ?4)
                           ON CONFLICT(id) DO UPDATE SET
                               url = excluded.url,
                               is_default = excluded.is_default,
                               subscribers = excluded.subscribers,
                               updated_at = datetime('now')"#,
                        params![id, url, is_default, subscribers],
                    )?;
                    Ok(Some(id))
                }
                None => {
                    let inserted = conn.execute(
                        r#"INSERT INTO feeds (url, is_default, subscribers)
                           VALUES (?1, ?2, ?3)
                           ON CONFLICT(url) DO NOTHING"#,
                        params![url, is_default, subscribers],
                    )?;
                    Ok((inserted > 0).then(|| conn.last_insert_rowid()))
                }
            })
            .await?;

        let id = id.ok_or_else(|| AppError::Conflict(format!("feed {}", feed.url)))?;
        Ok(RecordKey(id))
    }

    fn feeds(&self) -> FeedStream<'_> {
        let page_size = self.feed_page_size;
        stream::unfold(FeedCursor::default(), move |mut cursor| async move {
            loop {
                if let Some(item) = cursor.buffered.pop_front() {
                    return Some((item, cursor));
                }
                if cursor.exhausted {
                    return None;
                }
                match self.feed_page(cursor.after, page_size).await {
                    Ok(rows) => {
                        cursor.exhausted = rows.len() < page_size;
                        if let Some(last) = rows.last() {
                            cursor.after = last.key;
                        }
                        cursor.buffered.extend(rows.into_iter().map(FeedRow::decode));
                    }
                    Err(e) => {
                        // A failed page cannot be skipped past, so the stream ends here.
                        cursor.exhausted = true;
                        return Some((Err(e), cursor));
                    }
                }
            }
        })
        .boxed()
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        key: row.get(0)?,
        user_id: row.get(1)?,
        total_read: row.get(2)?,
        snapshot: row.get(3)?,
    })
}

fn feed_from_row(row: &Row) -> rusqlite::Result<FeedRow> {
    Ok(FeedRow {
        key: row.get(0)?,
        url: row.get(1)?,
        is_default: row.get(2)?,
        subscribers: row.get(3)?,
    })
}
