use anyhow::Result;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::types::{Section, StoreError};

/// Default retention cap for the bounded sections.
pub const DEFAULT_MAX_RETAINED: usize = 30;

// ============================================================================
// Database
// ============================================================================

/// Cloneable handle to the story cache.
///
/// The per-section running counts of retained stories are shared between
/// clones; mutating traffic is expected to come from one logical owner
/// (the sync engine), so a plain mutex around them is enough.
#[derive(Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
    pub(crate) max_retained: usize,
    pub(crate) retained: Arc<Mutex<HashMap<Section, usize>>>,
}

impl Database {
    /// Open the cache with the default retention cap.
    pub async fn open(path: &str) -> Result<Self, StoreError> {
        Self::open_with_retention(path, DEFAULT_MAX_RETAINED).await
    }

    /// Open the cache with an explicit retention cap.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Locked` if another process has the database
    /// locked (SQLITE_BUSY, SQLITE_LOCKED), `StoreError::Migration` if the
    /// schema could not be brought up to date.
    pub async fn open_with_retention(path: &str, max_retained: usize) -> Result<Self, StoreError> {
        let url = format!("sqlite:{}?mode=rwc", path);

        // busy_timeout=5000: SQLite waits up to 5 seconds for locks to
        // release before returning SQLITE_BUSY. Set via pragma() so every
        // connection in the pool inherits it.
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(StoreError::from_sqlx)?
            .pragma("busy_timeout", "5000");

        // An in-memory database exists per connection, so it must stay on
        // a single one. On disk, SQLite is single-writer; 5 connections
        // covers peak concurrent readers.
        let max_connections = if path.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(StoreError::from_sqlx)?;

        let db = Self {
            pool,
            max_retained,
            retained: Arc::new(Mutex::new(HashMap::new())),
        };
        db.migrate().await.map_err(|e| {
            let message = e.to_string().to_lowercase();
            if message.contains("database is locked")
                || message.contains("database table is locked")
                || message.contains("sqlite_busy")
                || message.contains("sqlite_locked")
            {
                StoreError::Locked
            } else {
                StoreError::Migration(e.to_string())
            }
        })?;
        Ok(db)
    }

    /// Run schema migrations atomically within a transaction.
    ///
    /// All statements use `IF NOT EXISTS`, so re-running on an existing
    /// database is a no-op.
    async fn migrate(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // One record per (section, id): the same story can be cached under
        // several sections at once, each with its own flags.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stories (
                section TEXT NOT NULL,
                id INTEGER NOT NULL,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                time INTEGER NOT NULL,
                score INTEGER NOT NULL,
                url TEXT NOT NULL,
                read INTEGER NOT NULL DEFAULT 0,
                bookmarked INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (section, id)
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        // Composite index for the one hot query: section scan ordered
        // newest-first.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_stories_section_time ON stories(section, time DESC)",
        )
        .execute(&mut *tx)
        .await?;

        // Key-value store for the singleton settings record.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS preferences (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
        "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}
