//! Source of Truth Module
//!
//! Collaborator interfaces the caches and services call on a miss, plus the
//! in-memory database and bcrypt verifier that implement them.

mod hashing;
mod memory;
mod models;

pub use hashing::BcryptVerifier;
pub use memory::MemoryDatabase;
pub use models::{
    BannedWordRow, CommentRow, LivestreamRow, NewComment, NewUser, ReportRow, ThemeRow, UserRow,
};

use crate::error::Result;

// == Verification Collaborator ==
/// Deliberately slow password hashing.
pub trait PasswordVerifier: Send + Sync {
    /// Checks `password` against `hash`. `Ok(false)` is the mismatch outcome;
    /// `Err` is reserved for everything else (malformed hash, backend failure).
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;

    /// Produces a new hash for `password`.
    fn hash(&self, password: &str) -> Result<String>;
}

// == Profile Source Collaborator ==
/// Rows needed to assemble a user profile.
pub trait ProfileSource: Send + Sync {
    fn fetch_user_row(&self, user_id: i64) -> Result<UserRow>;

    fn fetch_theme(&self, user_id: i64) -> Result<ThemeRow>;

    /// Stored icon bytes, `None` when the user never uploaded one.
    fn fetch_icon_bytes(&self, user_id: i64) -> Result<Option<Vec<u8>>>;
}

// == Moderation Source Collaborator ==
/// Banned-word storage and the comment cleanup that goes with it.
pub trait ModerationSource: Send + Sync {
    /// Banned word rows for a stream, most recent first.
    fn fetch_banned_word_rows(&self, stream_id: i64) -> Result<Vec<BannedWordRow>>;

    /// Banned words for a stream, most recent first.
    fn fetch_banned_words(&self, stream_id: i64) -> Result<Vec<String>> {
        Ok(self
            .fetch_banned_word_rows(stream_id)?
            .into_iter()
            .map(|row| row.word)
            .collect())
    }

    /// Persists a word and returns its id.
    fn persist_banned_word(&self, user_id: i64, stream_id: i64, word: &str) -> Result<i64>;

    /// Deletes every comment on the stream containing `word`, returning how many.
    fn delete_matching_comments(&self, stream_id: i64, word: &str) -> Result<usize>;

    /// Persists the word and deletes matching comments as one commit.
    ///
    /// The default runs the two steps back to back; stores with real
    /// transactions should override it.
    fn commit_banned_word(&self, user_id: i64, stream_id: i64, word: &str) -> Result<(i64, usize)> {
        let word_id = self.persist_banned_word(user_id, stream_id, word)?;
        let deleted = self.delete_matching_comments(stream_id, word)?;
        Ok((word_id, deleted))
    }
}

// == User Store ==
/// Account persistence used by registration, login and icons.
pub trait UserStore: ProfileSource {
    fn find_user_by_name(&self, name: &str) -> Result<UserRow>;

    /// Inserts the user and its theme, returning the new user row.
    fn insert_user(&self, user: NewUser) -> Result<UserRow>;

    /// Stores icon bytes and records their hash on the user row. Returns the icon id.
    fn store_icon(&self, user_id: i64, image: Vec<u8>, icon_hash: String) -> Result<i64>;
}

// == Livestream Store ==
/// Livestreams and their comments.
pub trait LivestreamStore: Send + Sync {
    fn fetch_livestream(&self, stream_id: i64) -> Result<LivestreamRow>;

    fn insert_livestream(&self, user_id: i64, title: &str) -> Result<LivestreamRow>;

    fn fetch_comment(&self, comment_id: i64) -> Result<CommentRow>;

    fn insert_comment(&self, comment: NewComment) -> Result<CommentRow>;

    /// Comments on a stream, newest first, optionally truncated to `limit`.
    fn list_comments(&self, stream_id: i64, limit: Option<usize>) -> Result<Vec<CommentRow>>;

    /// Records that `user_id` reported a comment.
    fn insert_report(&self, user_id: i64, stream_id: i64, comment_id: i64) -> Result<ReportRow>;
}
