//! Moderation Word Cache
//!
//! Per-stream banned-word lists with no TTL. An entry stays authoritative until
//! the moderation write path removes it, which it does after a fixed delay (see
//! `tasks::spawn_delayed_invalidation`).

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStats, ConcurrentKeyedStore, StatsRecorder};
use crate::error::Result;
use crate::source::ModerationSource;

// == Moderation Word Cache ==
/// Cache of banned words keyed by stream id, most recent word first.
pub struct ModerationWordCache {
    entries: ConcurrentKeyedStore<i64, Arc<[String]>>,
    source: Arc<dyn ModerationSource>,
    stats: StatsRecorder,
}

impl ModerationWordCache {
    pub fn new(source: Arc<dyn ModerationSource>) -> Self {
        Self {
            entries: ConcurrentKeyedStore::new(),
            source,
            stats: StatsRecorder::new(),
        }
    }

    // == Get Words ==
    /// Returns the cached list, or fetches and caches it. Empty lists are
    /// cached too; source errors are not.
    pub fn get_words(&self, stream_id: i64) -> Result<Arc<[String]>> {
        if let Some(words) = self.entries.load(&stream_id) {
            self.stats.record_hit();
            return Ok(words);
        }
        self.stats.record_miss();

        let words: Arc<[String]> = self.source.fetch_banned_words(stream_id)?.into();
        debug!(
            "Cached {} banned words for stream {}",
            words.len(),
            stream_id
        );
        self.entries.store(stream_id, Arc::clone(&words));
        Ok(words)
    }

    // == Invalidate ==
    /// Drops the entry so the next read refetches.
    pub fn invalidate(&self, stream_id: i64) {
        self.entries.delete(&stream_id);
        self.stats.record_invalidation();
    }

    // == Is Cached ==
    /// Whether the stream currently has an entry.
    pub fn is_cached(&self, stream_id: i64) -> bool {
        self.entries.load(&stream_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot(self.entries.len())
    }
}

/// Finds the first banned word contained in `comment`.
///
/// Plain case-sensitive substring containment, no normalisation.
pub fn find_banned_word<'a>(comment: &str, words: &'a [String]) -> Option<&'a str> {
    words
        .iter()
        .map(String::as_str)
        .find(|word| comment.contains(word))
}
