use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Store-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another process has the cache database locked
    #[error("The story cache is locked by another process. Please close it and try again.")]
    Locked,

    /// Migration failed
    #[error("Cache migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Cache error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let message = err.to_string().to_lowercase();

        // SQLITE_BUSY (5): database is locked
        // SQLITE_LOCKED (6): database table is locked
        if message.contains("database is locked")
            || message.contains("database table is locked")
            || message.contains("sqlite_busy")
            || message.contains("sqlite_locked")
        {
            return StoreError::Locked;
        }

        StoreError::Other(err)
    }
}

// ============================================================================
// Sections
// ============================================================================

/// A named bucket of cached stories.
///
/// `Recent` and `Top` mirror the remote story lists and are subject to the
/// retention cap; `Bookmark` is user-curated and never evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Recent,
    Top,
    Bookmark,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Recent, Section::Top, Section::Bookmark];

    /// Stable discriminator used in the stories table and preference keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Recent => "recent",
            Section::Top => "top",
            Section::Bookmark => "bookmark",
        }
    }

    pub(crate) fn parse(s: &str) -> Option<Section> {
        match s {
            "recent" => Some(Section::Recent),
            "top" => Some(Section::Top),
            "bookmark" => Some(Section::Bookmark),
            _ => None,
        }
    }

    /// Remote list endpoint for the section, relative to the API base URL.
    /// `Bookmark` is local-only and has no remote counterpart.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            Section::Recent => Some("newstories.json"),
            Section::Top => Some("topstories.json"),
            Section::Bookmark => None,
        }
    }

    /// Bounded sections are the ones retention enforcement may evict from.
    pub fn is_bounded(self) -> bool {
        !matches!(self, Section::Bookmark)
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A Hacker News story as the item endpoint returns it, plus the locally
/// tracked flags.
///
/// Wire fields other than `id` may be absent on dead or partial items;
/// they default instead of failing the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Story {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    /// Submitter username (`by` on the wire).
    #[serde(default, rename = "by")]
    pub author: String,
    /// Submission time, unix seconds.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub url: String,
    /// Local flag: the user has opened this story.
    #[serde(default)]
    pub read: bool,
    /// Local flag: the story is pinned into the bookmark section.
    #[serde(default)]
    pub bookmarked: bool,
    /// Section the record was stored under; unset on fresh API decodes.
    #[serde(default, skip_deserializing)]
    pub section: Option<Section>,
}

/// Internal row type for story queries (sqlx FromRow); converts to `Story`
/// via `into_story`, dropping rows whose section discriminator is unknown.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StoryRow {
    pub section: String,
    pub id: i64,
    pub title: String,
    pub author: String,
    pub time: i64,
    pub score: i64,
    pub url: String,
    pub read: bool,
    pub bookmarked: bool,
}

impl StoryRow {
    pub(crate) fn into_story(self) -> Option<Story> {
        let section = Section::parse(&self.section)?;
        Some(Story {
            id: self.id,
            title: self.title,
            author: self.author,
            time: self.time,
            score: self.score,
            url: self.url,
            read: self.read,
            bookmarked: self.bookmarked,
            section: Some(section),
        })
    }
}

/// Persisted application settings, one record under the `settings` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub last_section: Section,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_section: Section::Recent,
        }
    }
}
