use super::Reader;
use crate::storage::{Section, Story};

impl Reader {
    // ========================================================================
    // Read State
    // ========================================================================

    /// Mark a story read everywhere it may be cached.
    ///
    /// The same id can sit in `Recent` and `Top` at once, so the update
    /// runs against every section; sections without a copy ignore it. The
    /// observable copy flips and the unread count drops exactly once.
    pub async fn mark_read(&mut self, story: &Story) {
        if story.read {
            return;
        }

        for section in Section::ALL {
            if let Err(e) = self.db.mark_read(story, section).await {
                tracing::warn!(id = story.id, section = %section, error = %e, "read-state save failed");
            }
        }

        if let Some(shown) = self.stories.iter_mut().find(|s| s.id == story.id) {
            shown.read = true;
            self.unread = self.unread.saturating_sub(1);
        }
    }

    /// Mark every story in the observable list read, then pin the unread
    /// count to zero in case the list and the count ever drifted apart.
    pub async fn mark_all_read(&mut self) {
        for story in self.stories.clone() {
            self.mark_read(&story).await;
        }
        self.unread = 0;
    }

    // ========================================================================
    // Bookmarks
    // ========================================================================

    /// Pin a story into, or drop it from, the bookmark section.
    ///
    /// The bookmark section holds its own copy, exempt from retention. The
    /// story's record in its origin section is refreshed too, so the flag
    /// shows up there on the next load.
    pub async fn set_bookmark(&mut self, story: &Story, origin: Section, bookmarked: bool) {
        let mut tagged = story.clone();
        tagged.bookmarked = bookmarked;

        let result = if bookmarked {
            self.db.put(&tagged, Section::Bookmark, false, false).await
        } else {
            self.db.remove(story.id, Section::Bookmark).await
        };
        if let Err(e) = result {
            tracing::warn!(id = story.id, error = %e, "bookmark update failed");
        }

        if let Err(e) = self.db.put(&tagged, origin, true, true).await {
            tracing::warn!(id = story.id, section = %origin, error = %e, "bookmark flag save failed");
        }

        if let Some(shown) = self.stories.iter_mut().find(|s| s.id == story.id) {
            shown.bookmarked = bookmarked;
        }
    }
}
