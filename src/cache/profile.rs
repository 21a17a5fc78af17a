//! Profile Assembly Cache
//!
//! Holds fully assembled user profiles for a short freshness window so that
//! profile reads skip the user/theme join and the icon fingerprinting.
//!
//! Profile writes (icon uploads, renames) are never pushed into this cache. They
//! show up once the cached entry goes stale, so readers may observe data up to
//! one TTL old.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::{CacheStats, Clock, ConcurrentKeyedStore, StatsRecorder, TimedEntry};
use crate::error::Result;
use crate::models::{Theme, UserProfile};
use crate::source::{ProfileSource, UserRow};

/// Default freshness window for an assembled profile.
pub const DEFAULT_PROFILE_TTL: Duration = Duration::from_millis(1300);

/// SHA-256 of `bytes` as lowercase hex.
pub fn icon_fingerprint(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// == Profile Assembly Cache ==
/// TTL cache of assembled profiles keyed by user id.
///
/// Concurrent misses on one user may both rebuild; the last store wins. Only
/// successful assemblies are cached, so a missing user is re-checked on every
/// read.
pub struct ProfileAssemblyCache {
    entries: ConcurrentKeyedStore<i64, TimedEntry<UserProfile>>,
    source: Arc<dyn ProfileSource>,
    clock: Arc<dyn Clock>,
    fallback_icon_hash: String,
    ttl: Duration,
    stats: StatsRecorder,
}

impl ProfileAssemblyCache {
    // == Constructor ==
    /// Creates a cache over `source`.
    ///
    /// # Arguments
    /// * `fallback_icon` - Image bytes used for users with no uploaded icon
    /// * `ttl` - Freshness window for assembled profiles
    pub fn new(
        source: Arc<dyn ProfileSource>,
        clock: Arc<dyn Clock>,
        fallback_icon: &[u8],
        ttl: Duration,
    ) -> Self {
        Self {
            entries: ConcurrentKeyedStore::new(),
            source,
            clock,
            fallback_icon_hash: icon_fingerprint(fallback_icon),
            ttl,
            stats: StatsRecorder::new(),
        }
    }

    // == Get Profile ==
    /// Returns the cached profile while fresh, otherwise rebuilds it from the
    /// source and restamps the entry.
    pub fn get_profile(&self, user_id: i64) -> Result<UserProfile> {
        let now = self.clock.now();
        if let Some(entry) = self.entries.load(&user_id) {
            if entry.is_fresh(now, self.ttl) {
                self.stats.record_hit();
                return Ok(entry.value);
            }
            debug!(
                "Profile for user {} is stale ({:?} old), rebuilding",
                user_id,
                entry.age(now)
            );
        }
        self.stats.record_miss();

        let row = self.source.fetch_user_row(user_id)?;
        let profile = self.assemble(row)?;
        self.entries
            .store(user_id, TimedEntry::new(profile.clone(), now));
        Ok(profile)
    }

    // == Assemble ==
    /// Joins a user row with its theme and icon fingerprint. Bypasses the cache.
    pub fn assemble(&self, row: UserRow) -> Result<UserProfile> {
        let theme = self.source.fetch_theme(row.id)?;

        let icon_hash = match row.icon_hash {
            Some(hash) => hash,
            None => match self.source.fetch_icon_bytes(row.id)? {
                Some(bytes) => icon_fingerprint(&bytes),
                None => self.fallback_icon_hash.clone(),
            },
        };

        Ok(UserProfile {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            description: row.description,
            theme: Theme {
                id: theme.id,
                dark_mode: theme.dark_mode,
            },
            icon_hash,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
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
