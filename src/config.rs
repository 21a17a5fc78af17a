//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_PROFILE_TTL;
use crate::tasks::DEFAULT_INVALIDATION_DELAY;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Freshness window of assembled profiles
    pub profile_ttl: Duration,
    /// Delay between a moderation commit and the banned-word cache invalidation
    pub invalidation_delay: Duration,
    /// Image hashed for users without an uploaded icon
    pub fallback_icon_path: PathBuf,
    /// bcrypt cost used when registering users
    pub bcrypt_cost: u32,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PROFILE_TTL_MS` - Profile cache TTL in milliseconds (default: 1300)
    /// - `NG_WORD_INVALIDATION_DELAY_MS` - Moderation invalidation delay in milliseconds (default: 500)
    /// - `FALLBACK_ICON_PATH` - Fallback icon image (default: img/NoImage.jpg)
    /// - `BCRYPT_COST` - bcrypt cost factor (default: 4)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from `lookup`, falling back to defaults for missing or
    /// unparsable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| lookup(name).and_then(|v| v.parse::<u64>().ok());
        let defaults = Self::default();
        Self {
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            profile_ttl: parse("PROFILE_TTL_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.profile_ttl),
            invalidation_delay: parse("NG_WORD_INVALIDATION_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.invalidation_delay),
            fallback_icon_path: lookup("FALLBACK_ICON_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.fallback_icon_path),
            bcrypt_cost: lookup("BCRYPT_COST")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.bcrypt_cost),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            profile_ttl: DEFAULT_PROFILE_TTL,
            invalidation_delay: DEFAULT_INVALIDATION_DELAY,
            fallback_icon_path: PathBuf::from("img/NoImage.jpg"),
            bcrypt_cost: 4,
        }
    }
}
