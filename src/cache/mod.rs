//! Cache Module
//!
//! The three purpose-built caches and the concurrent store they share.
//!
//! - [`CredentialVerificationCache`]: permanent, keyed by (hash, password)
//! - [`ProfileAssemblyCache`]: 1.3 s TTL, keyed by user id
//! - [`ModerationWordCache`]: no TTL, invalidated after moderation writes
//!
//! None of them evict. Each grows for the lifetime of the process.

mod clock;
mod credential;
mod entry;
mod moderation;
mod profile;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{credential_key, CredentialVerificationCache, KEY_SEPARATOR};
pub use entry::TimedEntry;
pub use moderation::{find_banned_word, ModerationWordCache};
pub use profile::{icon_fingerprint, ProfileAssemblyCache, DEFAULT_PROFILE_TTL};
pub use stats::{CacheStats, StatsRecorder};
pub use store::ConcurrentKeyedStore;
