//! The reader core: sync engine plus read-state coordination.
//!
//! [`Reader`] owns the observable state a front end renders: the current
//! story list, the unread count, and the last sync error. Every mutation
//! goes through `&mut self`, which is what serializes overlapping
//! operations onto one logical owner; per-item fetches fan out, but their
//! completions are consumed one at a time.

mod readstate;
mod sync;

use std::sync::Arc;

use thiserror::Error;

use crate::api::StoryApi;
use crate::config::Config;
use crate::storage::{Database, Story};

// ============================================================================
// Error Types
// ============================================================================

/// The one user-visible sync failure condition.
///
/// ID-list failures and individual item failures both fold into it; the
/// distinction is logged, not rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("Invalid response from server")]
    InvalidServerResponse,
}

// ============================================================================
// Reader
// ============================================================================

/// Sync engine and read-state coordinator over an injected store and
/// remote story source.
pub struct Reader {
    pub(crate) db: Database,
    pub(crate) api: Arc<dyn StoryApi>,
    pub(crate) fetch_workers: usize,

    /// Stories of the section last synced or loaded, in presentation order.
    pub stories: Vec<Story>,
    /// Unread stories among `stories`.
    pub unread: usize,
    /// Set while the latest sync hit trouble. A renderer seeing this with
    /// an empty list is expected to fall back to `load_local`.
    pub error: Option<SyncError>,
}

impl Reader {
    pub fn new(db: Database, api: Arc<dyn StoryApi>, config: &Config) -> Self {
        Self {
            db,
            api,
            fetch_workers: config.fetch_workers.max(1),
            stories: Vec::new(),
            unread: 0,
            error: None,
        }
    }

    /// The injected store handle, for settings access and direct seeding.
    pub fn store(&self) -> &Database {
        &self.db
    }
}
