//! Comment as returned to clients, with its author's profile filled in.

use serde::Serialize;

use super::UserProfile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Livecomment {
    pub id: i64,
    pub user: UserProfile,
    pub livestream_id: i64,
    pub comment: String,
    pub tip: i64,
    pub created_at: i64,
}

/// Report filed against a comment, with reporter and comment filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LivecommentReport {
    pub id: i64,
    pub reporter: UserProfile,
    pub livecomment: Livecomment,
    pub created_at: i64,
}
