//! Services Module
//!
//! Request logic sitting between the HTTP handlers and the caches. Each service
//! receives its caches and collaborators at construction; nothing is global.

mod auth;
mod livecomment;
mod user;

pub use auth::{AuthService, Registration, RESERVED_USERNAME};
pub use livecomment::{LivecommentService, Moderation};
pub use user::{IconFetch, UserService};
