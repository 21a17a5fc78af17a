//! Livestreams, comments and moderation.
//!
//! Comment submission reads banned words through the moderation cache.
//! Moderation writes commit first and clear that cache entry only after a
//! fixed delay, so spam checks already in flight finish against the list they
//! started with.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{find_banned_word, ModerationWordCache, ProfileAssemblyCache};
use crate::error::{AppError, Result};
use crate::models::{Livecomment, LivecommentReport, UserProfile};
use crate::source::{
    BannedWordRow, CommentRow, LivestreamRow, LivestreamStore, ModerationSource, NewComment,
};
use crate::tasks::spawn_delayed_invalidation;

/// Outcome of a moderation write.
#[derive(Debug)]
pub struct Moderation {
    pub word_id: i64,
    /// Existing comments removed because they contain the word
    pub deleted_comments: usize,
    /// Pending cache invalidation; drop to detach
    pub invalidation: JoinHandle<()>,
}

pub struct LivecommentService {
    streams: Arc<dyn LivestreamStore>,
    moderation: Arc<dyn ModerationSource>,
    words: Arc<ModerationWordCache>,
    profiles: Arc<ProfileAssemblyCache>,
    invalidation_delay: Duration,
}

impl LivecommentService {
    pub fn new(
        streams: Arc<dyn LivestreamStore>,
        moderation: Arc<dyn ModerationSource>,
        words: Arc<ModerationWordCache>,
        profiles: Arc<ProfileAssemblyCache>,
        invalidation_delay: Duration,
    ) -> Self {
        Self {
            streams,
            moderation,
            words,
            profiles,
            invalidation_delay,
        }
    }

    pub fn create_livestream(&self, user_id: i64, title: &str) -> Result<LivestreamRow> {
        let stream = self.streams.insert_livestream(user_id, title)?;
        info!("User {} opened livestream {}", user_id, stream.id);
        Ok(stream)
    }

    // == Post Comment ==
    /// Rejects the comment if it contains a banned word, otherwise stores it.
    ///
    /// Everything that can fail runs before the insert, so a rejected request
    /// leaves no row behind.
    pub fn post_comment(
        &self,
        user_id: i64,
        stream_id: i64,
        comment: String,
        tip: i64,
    ) -> Result<Livecomment> {
        let stream = self.streams.fetch_livestream(stream_id)?;

        let words = self.words.get_words(stream.id)?;
        if let Some(word) = find_banned_word(&comment, &words) {
            debug!("Comment on stream {} hit banned word '{}'", stream.id, word);
            return Err(AppError::SpamDetected(
                "this comment was flagged as spam".to_string(),
            ));
        }

        let author = self.profiles.get_profile(user_id)?;
        let row = self.streams.insert_comment(NewComment {
            user_id,
            livestream_id: stream.id,
            comment,
            tip,
        })?;
        Ok(Self::livecomment(row, author))
    }

    /// Comments on a stream, newest first.
    pub fn list_comments(&self, stream_id: i64, limit: Option<usize>) -> Result<Vec<Livecomment>> {
        let stream = self.streams.fetch_livestream(stream_id)?;
        self.streams
            .list_comments(stream.id, limit)?
            .into_iter()
            .map(|row| self.fill(row))
            .collect()
    }

    // == Report Comment ==
    /// Files a report from `user_id` against a comment on `stream_id`.
    ///
    /// The comment must belong to the stream. The report is stored only once
    /// both profiles have been assembled.
    pub fn report_comment(
        &self,
        user_id: i64,
        stream_id: i64,
        comment_id: i64,
    ) -> Result<LivecommentReport> {
        let stream = self.streams.fetch_livestream(stream_id)?;
        let comment = self.streams.fetch_comment(comment_id)?;
        if comment.livestream_id != stream.id {
            return Err(AppError::NotFound("livecomment not found".to_string()));
        }

        let reporter = self.profiles.get_profile(user_id)?;
        let livecomment = self.fill(comment)?;
        let report = self.streams.insert_report(user_id, stream.id, comment_id)?;
        info!(
            "User {} reported comment {} on stream {}",
            user_id, comment_id, stream.id
        );

        Ok(LivecommentReport {
            id: report.id,
            reporter,
            livecomment,
            created_at: report.created_at,
        })
    }

    /// Banned word rows for the stream owner. Anyone else, or an unknown
    /// stream, gets an empty list.
    ///
    /// Reads the source directly; the moderation cache only holds the words.
    pub fn banned_words(&self, user_id: i64, stream_id: i64) -> Result<Vec<BannedWordRow>> {
        match self.streams.fetch_livestream(stream_id) {
            Ok(stream) if stream.user_id == user_id => {
                self.moderation.fetch_banned_word_rows(stream.id)
            }
            Ok(_) | Err(AppError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    // == Moderate ==
    /// Adds a banned word to a stream the caller owns.
    ///
    /// Persisting the word and deleting matching comments commit together.
    /// The cache entry is cleared by a timer `invalidation_delay` later; the
    /// call itself returns right after the commit.
    pub fn moderate(&self, user_id: i64, stream_id: i64, word: &str) -> Result<Moderation> {
        if word.is_empty() {
            return Err(AppError::InvalidRequest("NG word cannot be empty".to_string()));
        }

        let stream = self.streams.fetch_livestream(stream_id)?;
        if stream.user_id != user_id {
            return Err(AppError::InvalidRequest(
                "A streamer can't moderate livestreams that other streamers own".to_string(),
            ));
        }

        let (word_id, deleted_comments) =
            self.moderation.commit_banned_word(user_id, stream.id, word)?;
        info!(
            "Stream {} banned word {}, removed {} comments",
            stream.id, word_id, deleted_comments
        );

        let invalidation = spawn_delayed_invalidation(
            Arc::clone(&self.words),
            stream.id,
            self.invalidation_delay,
        );

        Ok(Moderation {
            word_id,
            deleted_comments,
            invalidation,
        })
    }

    fn fill(&self, row: CommentRow) -> Result<Livecomment> {
        let user = self.profiles.get_profile(row.user_id)?;
        Ok(Self::livecomment(row, user))
    }

    fn livecomment(row: CommentRow, user: UserProfile) -> Livecomment {
        Livecomment {
            id: row.id,
            user,
            livestream_id: row.livestream_id,
            comment: row.comment,
            tip: row.tip,
            created_at: row.created_at,
        }
    }
}
