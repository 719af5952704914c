use tracing::trace;

use crate::models::{PlaylistEntry, ProgressRecord};

/// Ordered snapshot of per-item playback state, plus the cursor marking the
/// most recently enqueued entry. Replaced wholesale on reload; entries are
/// mutated in place as progress updates arrive.
#[derive(Debug, Default)]
pub struct PlaylistStore {
    entries: Vec<PlaylistEntry>,
    cursor: usize,
}

impl PlaylistStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a fresh snapshot, resetting the cursor to the first entry.
    pub fn replace_snapshot(&mut self, entries: Vec<PlaylistEntry>) {
        self.entries = entries;
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn entry(&self, index: usize) -> Option<&PlaylistEntry> {
        self.entries.get(index)
    }

    pub fn entry_at_cursor(&self) -> Option<&PlaylistEntry> {
        self.entries.get(self.cursor)
    }

    /// Index of the entry after the cursor, only when such an entry exists.
    /// With the cursor on the final entry this is `None`; lookahead must not
    /// index past the end.
    pub fn next_index(&self) -> Option<usize> {
        let next = self.cursor + 1;
        (next < self.entries.len()).then_some(next)
    }

    /// Move the cursor forward to `index`. The cursor never retreats within a
    /// playback session.
    pub fn advance_cursor_to(&mut self, index: usize) {
        debug_assert!(index < self.entries.len());
        if index > self.cursor {
            self.cursor = index;
        }
    }

    /// Merge an authoritative progress record into the entry it belongs to,
    /// matched by content id. A record for an id absent from the snapshot is
    /// dropped: updates can arrive for entries no longer relevant to the
    /// current view, and that is not an error.
    pub fn merge_progress(&mut self, record: ProgressRecord) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.content.id == record.content_id)
        {
            Some(entry) => entry.progress = Some(record),
            None => trace!(
                content_id = %record.content_id,
                "dropping progress update for entry not in snapshot"
            ),
        }
    }
}
