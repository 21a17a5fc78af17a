//! Delayed Invalidation Task
//!
//! Clears a moderation cache entry after a fixed delay instead of blocking the
//! moderation handler for that long.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::ModerationWordCache;

/// Delay between a moderation commit and the cache invalidation.
pub const DEFAULT_INVALIDATION_DELAY: Duration = Duration::from_millis(500);

/// Spawns a task that invalidates `stream_id` once `delay` has elapsed.
///
/// Comment checks that started before the write keep seeing the old list until
/// the timer fires; any check that starts after it sees the new word.
///
/// # Returns
/// A JoinHandle for the spawned task. Dropping it detaches the task; awaiting
/// it waits for the invalidation to happen.
///
/// # Example
/// ```ignore
/// let handle = spawn_delayed_invalidation(cache.clone(), 42, DEFAULT_INVALIDATION_DELAY);
/// handle.await?;
/// assert!(!cache.is_cached(42));
/// ```
pub fn spawn_delayed_invalidation(
    cache: Arc<ModerationWordCache>,
    stream_id: i64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        cache.invalidate(stream_id);
        info!(
            "Invalidated banned words for stream {} after {:?}",
            stream_id, delay
        );
    })
}
