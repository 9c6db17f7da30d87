//! Remote story source: the capability the sync engine pulls from.
//!
//! The engine only ever sees the [`StoryApi`] trait, so tests substitute
//! scripted sources and the HTTP client stays swappable.

mod http;

pub use http::HttpStoryApi;

use async_trait::async_trait;
use thiserror::Error;

use crate::storage::{Section, Story};

// ============================================================================
// Error Types
// ============================================================================

/// Errors from the remote story source.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body was not the expected JSON shape
    #[error("Undecodable response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response body exceeded the size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// The item endpoint answered `null` (deleted or unknown id)
    #[error("Item {0} does not exist upstream")]
    MissingItem(i64),
    /// The configured API base URL does not parse
    #[error("Invalid API base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

// ============================================================================
// Story Source Capability
// ============================================================================

/// Ordered story references plus item resolution, shaped the way the
/// Hacker News API exposes them.
#[async_trait]
pub trait StoryApi: Send + Sync {
    /// Ordered candidate story IDs for a section's remote list.
    async fn list_ids(&self, section: Section) -> Result<Vec<i64>, ApiError>;

    /// Resolve one story by ID.
    async fn fetch_story(&self, id: i64) -> Result<Story, ApiError>;

    /// Cap on stories a sync aims to resolve per section.
    fn max_items(&self) -> usize;
}
