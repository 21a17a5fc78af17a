//! streamcache - Livestreaming backend with a purpose-built caching layer
//!
//! Three caches sit in front of the expensive paths: password verification,
//! profile assembly, and per-stream banned-word lists.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_delayed_invalidation;
