use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use url::Url;

use super::{ApiError, StoryApi};
use crate::config::Config;
use crate::storage::{Section, Story};

/// Anything past this is not story data.
const MAX_RESPONSE_SIZE: usize = 2 * 1024 * 1024; // 2MB

// ============================================================================
// HTTP Story Source
// ============================================================================

/// [`StoryApi`] implementation against the Hacker News Firebase API.
///
/// Endpoints, relative to the configured base URL:
/// `newstories.json`, `topstories.json`, `item/{id}.json`.
pub struct HttpStoryApi {
    client: Client,
    base_url: Url,
    max_items: usize,
}

impl HttpStoryApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        // Url::join drops the last path segment of a base without a
        // trailing slash, so normalize to exactly one.
        let mut base = config.api_base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("paperboy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_items: config.max_items,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        tracing::debug!(url = %url, "fetching");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout
            } else {
                ApiError::Network(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status.as_u16()));
        }

        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl StoryApi for HttpStoryApi {
    async fn list_ids(&self, section: Section) -> Result<Vec<i64>, ApiError> {
        let Some(endpoint) = section.endpoint() else {
            return Ok(Vec::new());
        };
        self.get_json(self.base_url.join(endpoint)?).await
    }

    async fn fetch_story(&self, id: i64) -> Result<Story, ApiError> {
        let url = self.base_url.join(&format!("item/{id}.json"))?;
        // The API answers a literal `null` for deleted or unknown items.
        let story: Option<Story> = self.get_json(url).await?;
        story.ok_or(ApiError::MissingItem(id))
    }

    fn max_items(&self) -> usize {
        self.max_items
    }
}

/// Read a response body up to `limit` bytes, bailing out early when the
/// Content-Length header already promises more.
async fn read_limited_bytes(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
