//! Background Tasks Module
//!
//! Timers spawned by request handlers that must outlive the request.
//!
//! # Tasks
//! - Delayed invalidation: clears a stream's banned-word cache entry a fixed
//!   interval after a moderation write commits

mod invalidation;

pub use invalidation::{spawn_delayed_invalidation, DEFAULT_INVALIDATION_DELAY};
