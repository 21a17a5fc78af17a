//! Credential Verification Cache
//!
//! Remembers the outcome of password-against-hash checks so the slow hash
//! comparison runs once per distinct (hash, password) pair.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheStats, ConcurrentKeyedStore, StatsRecorder};
use crate::error::{AppError, Result};
use crate::source::PasswordVerifier;

/// Separator between the stored hash and the candidate password.
///
/// Every read and write path goes through [`credential_key`], so a match and a
/// mismatch for the same pair land on the same key.
pub const KEY_SEPARATOR: &str = ":";

// == Key Construction ==
/// Builds the composite key for a (hash, password) pair.
pub fn credential_key(hash: &str, password: &str) -> String {
    let mut key = String::with_capacity(hash.len() + KEY_SEPARATOR.len() + password.len());
    key.push_str(hash);
    key.push_str(KEY_SEPARATOR);
    key.push_str(password);
    key
}

// == Credential Verification Cache ==
/// Caches boolean verification outcomes. Entries never expire: a given hash
/// and password always produce the same answer.
#[derive(Debug, Default)]
pub struct CredentialVerificationCache {
    entries: ConcurrentKeyedStore<String, bool>,
    stats: StatsRecorder,
}

impl CredentialVerificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    // == Check Cached ==
    /// Returns the recorded outcome, or `None` when the caller must verify.
    pub fn check_cached(&self, hash: &str, password: &str) -> Option<bool> {
        let cached = self.entries.load(&credential_key(hash, password));
        match cached {
            Some(_) => self.stats.record_hit(),
            None => self.stats.record_miss(),
        }
        cached
    }

    // == Record Result ==
    /// Records the outcome of an authoritative check.
    pub fn record_result(&self, hash: &str, password: &str, matched: bool) {
        self.entries.store(credential_key(hash, password), matched);
    }

    // == Verify With ==
    /// Answers from the cache, or asks `verifier` and records its answer.
    ///
    /// The verifier runs on the blocking pool since it is deliberately slow.
    /// Both outcomes are recorded. Verifier errors propagate and leave the
    /// cache untouched.
    pub async fn verify_with(
        &self,
        hash: &str,
        password: &str,
        verifier: Arc<dyn PasswordVerifier>,
    ) -> Result<bool> {
        if let Some(matched) = self.check_cached(hash, password) {
            return Ok(matched);
        }

        let (owned_hash, owned_password) = (hash.to_string(), password.to_string());
        let matched = tokio::task::spawn_blocking(move || {
            verifier.verify(&owned_password, &owned_hash)
        })
        .await
        .map_err(|e| AppError::Internal(format!("verification task failed: {}", e)))??;

        self.record_result(hash, password, matched);
        debug!("Recorded credential check outcome: matched={}", matched);
        Ok(matched)
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
