//! Row types returned by the source of truth.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub hashed_password: String,
    /// SHA-256 hex of the uploaded icon, set on upload
    pub icon_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeRow {
    pub id: i64,
    pub user_id: i64,
    pub dark_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LivestreamRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentRow {
    pub id: i64,
    pub user_id: i64,
    pub livestream_id: i64,
    pub comment: String,
    pub tip: i64,
    /// Unix seconds
    pub created_at: i64,
}

/// Banned word as stored, newest rows have the highest ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannedWordRow {
    pub id: i64,
    /// Streamer who added the word
    pub user_id: i64,
    pub livestream_id: i64,
    pub word: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub id: i64,
    /// Reporting user
    pub user_id: i64,
    pub livestream_id: i64,
    pub livecomment_id: i64,
    pub created_at: i64,
}

/// Fields needed to register a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub hashed_password: String,
    pub dark_mode: bool,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: i64,
    pub livestream_id: i64,
    pub comment: String,
    pub tip: i64,
}
