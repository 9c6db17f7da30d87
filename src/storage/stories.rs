use anyhow::Result;

use super::schema::Database;
use super::types::{Section, Story, StoryRow};

impl Database {
    // ========================================================================
    // Story Operations
    // ========================================================================

    /// Write a story record for `(section, id)`, returning whether anything
    /// was written.
    ///
    /// A read-update or overwrite needs an existing record to update, and a
    /// plain save never clobbers a record that is already there: re-fetching
    /// a known story must not reset its read flag.
    ///
    /// A plain insert into a bounded section counts toward that section's
    /// retained total and triggers retention enforcement once the total
    /// passes the cap.
    pub async fn put(
        &self,
        story: &Story,
        section: Section,
        read: bool,
        overwrite: bool,
    ) -> Result<bool> {
        let exists = self.contains(section, story.id).await?;

        if (read || overwrite) && !exists {
            return Ok(false);
        }
        if !read && exists {
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO stories
                (section, id, title, author, time, score, url, read, bookmarked)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
        )
        .bind(section.as_str())
        .bind(story.id)
        .bind(&story.title)
        .bind(&story.author)
        .bind(story.time)
        .bind(story.score)
        .bind(&story.url)
        .bind(read)
        .bind(story.bookmarked)
        .execute(&self.pool)
        .await?;

        if section == Section::Bookmark || read || overwrite {
            return Ok(true);
        }

        // Plain insert into a bounded section: count it, and evict the
        // oldest records once the cap is exceeded.
        let over_cap = {
            let mut counts = self.retained.lock().unwrap_or_else(|e| e.into_inner());
            let count = counts.entry(section).or_insert(0);
            *count += 1;
            *count > self.max_retained
        };
        if over_cap {
            self.enforce_retention(section).await?;
            let mut counts = self.retained.lock().unwrap_or_else(|e| e.into_inner());
            counts.insert(section, self.max_retained);
        }

        Ok(true)
    }

    /// Whether a record exists for `(section, id)`.
    async fn contains(&self, section: Section, id: i64) -> Result<bool> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM stories WHERE section = ? AND id = ?")
                .bind(section.as_str())
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    /// Delete the record for `(section, id)`, returning whether one existed.
    ///
    /// The section is part of the record's key, so a handle from another
    /// section cannot remove the copy stored here.
    pub async fn remove(&self, id: i64, section: Section) -> Result<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE section = ? AND id = ?")
            .bind(section.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Convenience: force the stored record for `(section, id)` to read.
    /// A no-op when the section holds no copy of the story.
    pub async fn mark_read(&self, story: &Story, section: Section) -> Result<bool> {
        self.put(story, section, true, true).await
    }

    // ========================================================================
    // Story Queries
    // ========================================================================

    /// All records for a section, newest first. Ties on `time` break by
    /// `id` descending, so eviction order is deterministic.
    ///
    /// When `count_toward_limit` is set, the section's running retained
    /// count is refreshed from the result; retention enforcement reads with
    /// it unset so its own traffic is not counted.
    ///
    /// Load failures come back as an empty list: the cache is a best-effort
    /// accelerator, not a source of truth.
    pub async fn load_all(&self, section: Section, count_toward_limit: bool) -> Vec<Story> {
        let rows = sqlx::query_as::<_, StoryRow>(
            r#"
            SELECT section, id, title, author, time, score, url, read, bookmarked
            FROM stories
            WHERE section = ?
            ORDER BY time DESC, id DESC
        "#,
        )
        .bind(section.as_str())
        .fetch_all(&self.pool)
        .await;

        let stories: Vec<Story> = match rows {
            Ok(rows) => rows.into_iter().filter_map(StoryRow::into_story).collect(),
            Err(e) => {
                tracing::warn!(section = %section, error = %e, "story load failed, treating as empty");
                Vec::new()
            }
        };

        if count_toward_limit {
            let mut counts = self.retained.lock().unwrap_or_else(|e| e.into_inner());
            counts.insert(section, stories.len());
        }

        stories
    }

    // ========================================================================
    // Retention
    // ========================================================================

    /// Drop everything past the newest `max_retained` records of a bounded
    /// section. Bookmarks are never considered, and a record being read is
    /// never by itself a reason to evict it.
    async fn enforce_retention(&self, section: Section) -> Result<()> {
        if !section.is_bounded() {
            return Ok(());
        }

        let stories = self.load_all(section, false).await;
        let mut evicted = 0usize;
        for story in stories.iter().skip(self.max_retained) {
            self.remove(story.id, section).await?;
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!(
                section = %section,
                evicted,
                cap = self.max_retained,
                "retention enforced"
            );
        }
        Ok(())
    }
}
