//! SQLite-backed copy of the last downloaded feed, for offline runs.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;

use crate::error::CalendarError;

/// Raw feed documents keyed by name, with the time they were saved.
pub struct FeedCache {
    conn: Connection,
}

impl FeedCache {
    /// Open (or create) the cache at `path`, creating parent directories.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, CalendarError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CalendarError::CacheError(format!(
                        "cannot create cache directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.init_schema()?;
        tracing::debug!("Opened feed cache at {}", path.display());
        Ok(cache)
    }

    /// Create an in-memory cache (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, CalendarError> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.init_schema()?;
        Ok(cache)
    }

    fn init_schema(&self) -> Result<(), CalendarError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                key TEXT PRIMARY KEY,
                body TEXT NOT NULL,
                cached_at INTEGER NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Store `feed` under `key`, replacing any earlier copy.
    pub fn save(&self, key: &str, feed: &Value) -> Result<(), CalendarError> {
        self.save_at(key, feed, Utc::now())
    }

    fn save_at(&self, key: &str, feed: &Value, at: DateTime<Utc>) -> Result<(), CalendarError> {
        let body = serde_json::to_string(feed)
            .map_err(|e| CalendarError::CacheError(format!("cannot encode feed: {}", e)))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO feeds (key, body, cached_at) VALUES (?1, ?2, ?3)",
            params![key, body, at.timestamp_millis()],
        )?;
        tracing::debug!("Cached feed `{}` ({} bytes)", key, body.len());
        Ok(())
    }

    /// Load the feed stored under `key`, however old it is.
    pub fn load(&self, key: &str) -> Result<Option<Value>, CalendarError> {
        match self.row(key)? {
            Some((body, _)) => decode(key, &body).map(Some),
            None => {
                tracing::warn!("No cached feed under `{}`", key);
                Ok(None)
            }
        }
    }

    /// Load the feed under `key` only if it was saved within `max_age`.
    pub fn load_fresh(&self, key: &str, max_age: Duration) -> Result<Option<Value>, CalendarError> {
        let Some((body, cached_at)) = self.row(key)? else {
            return Ok(None);
        };

        let age = Utc::now().timestamp_millis() - cached_at;
        if age > max_age.num_milliseconds() {
            tracing::debug!("Cached feed `{}` is stale ({} ms old)", key, age);
            return Ok(None);
        }

        decode(key, &body).map(Some)
    }

    /// When the feed under `key` was saved.
    pub fn cached_at(&self, key: &str) -> Result<Option<DateTime<Utc>>, CalendarError> {
        Ok(self
            .row(key)?
            .and_then(|(_, ms)| DateTime::<Utc>::from_timestamp_millis(ms)))
    }

    pub fn remove(&self, key: &str) -> Result<bool, CalendarError> {
        let removed = self
            .conn
            .execute("DELETE FROM feeds WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    /// Drop every cached feed.
    pub fn clear(&self) -> Result<(), CalendarError> {
        self.conn.execute("DELETE FROM feeds", [])?;
        Ok(())
    }

    fn row(&self, key: &str) -> Result<Option<(String, i64)>, CalendarError> {
        let row = self
            .conn
            .query_row(
                "SELECT body, cached_at FROM feeds WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row)
    }
}

fn decode(key: &str, body: &str) -> Result<Value, CalendarError> {
    serde_json::from_str(body).map_err(|e| CalendarError::CacheCorrupt(format!("`{key}`: {e}")))
}
