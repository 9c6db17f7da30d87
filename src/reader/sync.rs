use std::sync::Arc;

use futures::stream::{self, StreamExt};

use super::{Reader, SyncError};
use crate::storage::Section;

impl Reader {
    // ========================================================================
    // Sync
    // ========================================================================

    /// Fetch a section's remote ID list, resolve candidates into stories,
    /// and merge them into the local cache, reloading observable state as
    /// each story lands so observers see incremental progress.
    ///
    /// Bookmarks are local-only, so that section skips the network. An
    /// ID-list failure leaves the cached stories untouched; individual
    /// item failures are tolerated and the sync keeps going.
    pub async fn sync_from(&mut self, section: Section) {
        if section == Section::Bookmark {
            self.load_local(section).await;
            return;
        }
        // Sections without a remote counterpart have nothing to sync.
        if section.endpoint().is_none() {
            return;
        }

        let ids = match self.api.list_ids(section).await {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!(section = %section, error = %e, "story list fetch failed");
                self.error = Some(SyncError::InvalidServerResponse);
                return;
            }
        };
        self.error = None;

        let target = self.api.max_items();
        // Over-fetch margin: consider twice the target so individual item
        // failures still leave enough usable stories.
        let candidates: Vec<i64> = ids.into_iter().take(target * 2).collect();
        tracing::debug!(section = %section, candidates = candidates.len(), max_items = target, "sync started");

        let api = Arc::clone(&self.api);
        let mut fetches = stream::iter(candidates)
            .map(move |id| {
                let api = Arc::clone(&api);
                async move { api.fetch_story(id).await }
            })
            .buffer_unordered(self.fetch_workers);

        // Completions funnel through this single consumer, so the shared
        // list and count are never raced. The sync stops once the target
        // is reached or the candidates run out.
        let mut resolved = 0usize;
        while let Some(fetched) = fetches.next().await {
            match fetched {
                Ok(mut story) => {
                    story.read = false;
                    if let Err(e) = self.db.put(&story, section, false, false).await {
                        tracing::warn!(id = story.id, error = %e, "story save failed");
                    }
                    self.load_local(section).await;
                    resolved += 1;
                    if resolved >= target {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(section = %section, error = %e, "story fetch failed");
                    self.error = Some(SyncError::InvalidServerResponse);
                }
            }
        }
    }

    /// Reload observable state from the local cache.
    pub async fn load_local(&mut self, section: Section) {
        self.stories = self.db.load_all(section, true).await;
        self.unread = self.stories.iter().filter(|s| !s.read).count();
    }

    /// Reorder the observable list by score (descending), or back to
    /// newest-first when `by_score` is off. Presentation only; nothing is
    /// persisted.
    pub fn sort_by_score(&mut self, by_score: bool) {
        if by_score {
            self.stories.sort_by(|a, b| b.score.cmp(&a.score));
        } else {
            self.stories.sort_by(|a, b| b.time.cmp(&a.time));
        }
    }
}
