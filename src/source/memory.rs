//! In-memory source of truth.
//!
//! All tables live behind one mutex so multi-step writes commit atomically.
//! Reads that the caches front go through the same lock; the caches exist to
//! keep requests from hammering it.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use super::{
    BannedWordRow, CommentRow, LivestreamRow, LivestreamStore, ModerationSource, NewComment,
    NewUser, ProfileSource, ReportRow, ThemeRow, UserRow, UserStore,
};
use crate::error::{AppError, Result};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<UserRow>,
    themes: Vec<ThemeRow>,
    livestreams: Vec<LivestreamRow>,
    comments: Vec<CommentRow>,
    banned_words: Vec<BannedWordRow>,
    reports: Vec<ReportRow>,
    icons: HashMap<i64, Vec<u8>>,
    next_user_id: i64,
    next_theme_id: i64,
    next_livestream_id: i64,
    next_comment_id: i64,
    next_word_id: i64,
    next_icon_id: i64,
    next_report_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn insert_banned_word(&mut self, user_id: i64, stream_id: i64, word: &str) -> i64 {
        let id = Self::next_id(&mut self.next_word_id);
        self.banned_words.push(BannedWordRow {
            id,
            user_id,
            livestream_id: stream_id,
            word: word.to_string(),
            created_at: unix_now(),
        });
        id
    }

    fn delete_comments_containing(&mut self, stream_id: i64, word: &str) -> usize {
        let before = self.comments.len();
        self.comments
            .retain(|c| !(c.livestream_id == stream_id && c.comment.contains(word)));
        before - self.comments.len()
    }
}

// == Memory Database ==
/// Process-local tables standing in for the relational store.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("database lock poisoned".to_string()))
    }

    /// Replaces a user's stored icon hash without touching any cache.
    pub fn set_icon_hash(&self, user_id: i64, icon_hash: Option<String>) -> Result<()> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        user.icon_hash = icon_hash;
        Ok(())
    }

    /// Renames a user's display name without touching any cache.
    pub fn set_display_name(&self, user_id: i64, display_name: &str) -> Result<()> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        user.display_name = display_name.to_string();
        Ok(())
    }
}

impl ProfileSource for MemoryDatabase {
    fn fetch_user_row(&self, user_id: i64) -> Result<UserRow> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))
    }

    fn fetch_theme(&self, user_id: i64) -> Result<ThemeRow> {
        self.tables()?
            .themes
            .iter()
            .find(|t| t.user_id == user_id)
            .copied()
            .ok_or_else(|| AppError::NotFound(format!("theme for user {}", user_id)))
    }

    fn fetch_icon_bytes(&self, user_id: i64) -> Result<Option<Vec<u8>>> {
        Ok(self.tables()?.icons.get(&user_id).cloned())
    }
}

impl ModerationSource for MemoryDatabase {
    fn fetch_banned_word_rows(&self, stream_id: i64) -> Result<Vec<BannedWordRow>> {
        let tables = self.tables()?;
        // Ids grow with creation time, so reverse insertion order is newest first
        Ok(tables
            .banned_words
            .iter()
            .rev()
            .filter(|w| w.livestream_id == stream_id)
            .cloned()
            .collect())
    }

    fn persist_banned_word(&self, user_id: i64, stream_id: i64, word: &str) -> Result<i64> {
        Ok(self.tables()?.insert_banned_word(user_id, stream_id, word))
    }

    fn delete_matching_comments(&self, stream_id: i64, word: &str) -> Result<usize> {
        Ok(self.tables()?.delete_comments_containing(stream_id, word))
    }

    fn commit_banned_word(&self, user_id: i64, stream_id: i64, word: &str) -> Result<(i64, usize)> {
        let mut tables = self.tables()?;
        let word_id = tables.insert_banned_word(user_id, stream_id, word);
        let deleted = tables.delete_comments_containing(stream_id, word);
        debug!(
            "Committed banned word {} on stream {}, removed {} comments",
            word_id, stream_id, deleted
        );
        Ok((word_id, deleted))
    }
}

impl UserStore for MemoryDatabase {
    fn find_user_by_name(&self, name: &str) -> Result<UserRow> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.name == name)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("user '{}'", name)))
    }

    fn insert_user(&self, user: NewUser) -> Result<UserRow> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.name == user.name) {
            return Err(AppError::InvalidRequest(format!(
                "the username '{}' is already taken",
                user.name
            )));
        }

        let row = UserRow {
            id: Tables::next_id(&mut tables.next_user_id),
            name: user.name,
            display_name: user.display_name,
            description: user.description,
            hashed_password: user.hashed_password,
            icon_hash: None,
        };
        let theme = ThemeRow {
            id: Tables::next_id(&mut tables.next_theme_id),
            user_id: row.id,
            dark_mode: user.dark_mode,
        };
        tables.users.push(row.clone());
        tables.themes.push(theme);
        Ok(row)
    }

    fn store_icon(&self, user_id: i64, image: Vec<u8>, icon_hash: String) -> Result<i64> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", user_id)))?;
        user.icon_hash = Some(icon_hash);

        tables.icons.insert(user_id, image);
        Ok(Tables::next_id(&mut tables.next_icon_id))
    }
}

impl LivestreamStore for MemoryDatabase {
    fn fetch_livestream(&self, stream_id: i64) -> Result<LivestreamRow> {
        self.tables()?
            .livestreams
            .iter()
            .find(|l| l.id == stream_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("livestream not found".to_string()))
    }

    fn insert_livestream(&self, user_id: i64, title: &str) -> Result<LivestreamRow> {
        let mut tables = self.tables()?;
        let row = LivestreamRow {
            id: Tables::next_id(&mut tables.next_livestream_id),
            user_id,
            title: title.to_string(),
        };
        tables.livestreams.push(row.clone());
        Ok(row)
    }

    fn fetch_comment(&self, comment_id: i64) -> Result<CommentRow> {
        self.tables()?
            .comments
            .iter()
            .find(|c| c.id == comment_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("livecomment not found".to_string()))
    }

    fn insert_comment(&self, comment: NewComment) -> Result<CommentRow> {
        let mut tables = self.tables()?;
        let row = CommentRow {
            id: Tables::next_id(&mut tables.next_comment_id),
            user_id: comment.user_id,
            livestream_id: comment.livestream_id,
            comment: comment.comment,
            tip: comment.tip,
            created_at: unix_now(),
        };
        tables.comments.push(row.clone());
        Ok(row)
    }

    fn list_comments(&self, stream_id: i64, limit: Option<usize>) -> Result<Vec<CommentRow>> {
        let tables = self.tables()?;
        Ok(tables
            .comments
            .iter()
            .rev()
            .filter(|c| c.livestream_id == stream_id)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn insert_report(&self, user_id: i64, stream_id: i64, comment_id: i64) -> Result<ReportRow> {
        let mut tables = self.tables()?;
        let row = ReportRow {
            id: Tables::next_id(&mut tables.next_report_id),
            user_id,
            livestream_id: stream_id,
            livecomment_id: comment_id,
            created_at: unix_now(),
        };
        tables.reports.push(row.clone());
        Ok(row)
    }
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            display_name: name.to_uppercase(),
            description: String::new(),
            hashed_password: "hash".to_string(),
            dark_mode: true,
        }
    }

    fn comment(stream: i64, text: &str) -> NewComment {
        NewComment {
            user_id: 1,
            livestream_id: stream,
            comment: text.to_string(),
            tip: 0,
        }
    }

    #[test]
    fn test_insert_user_creates_theme() {
        let db = MemoryDatabase::new();
        let user = db.insert_user(new_user("alice")).unwrap();

        let theme = db.fetch_theme(user.id).unwrap();
        assert!(theme.dark_mode);
        assert_eq!(db.fetch_user_row(user.id).unwrap(), user);
        assert_eq!(db.find_user_by_name("alice").unwrap().id, user.id);
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let db = MemoryDatabase::new();
        db.insert_user(new_user("alice")).unwrap();

        let result = db.insert_user(new_user("alice"));
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn test_missing_user_is_not_found() {
        let db = MemoryDatabase::new();
        assert!(matches!(db.fetch_user_row(9), Err(AppError::NotFound(_))));
        assert!(matches!(db.fetch_theme(9), Err(AppError::NotFound(_))));
        assert_eq!(db.fetch_icon_bytes(9).unwrap(), None);
    }

    #[test]
    fn test_store_icon_sets_hash() {
        let db = MemoryDatabase::new();
        let user = db.insert_user(new_user("alice")).unwrap();

        let first = db.store_icon(user.id, vec![1, 2, 3], "abc".to_string()).unwrap();
        let second = db.store_icon(user.id, vec![4], "def".to_string()).unwrap();

        assert!(second > first);
        assert_eq!(db.fetch_icon_bytes(user.id).unwrap(), Some(vec![4]));
        assert_eq!(db.fetch_user_row(user.id).unwrap().icon_hash.as_deref(), Some("def"));
    }

    #[test]
    fn test_banned_words_newest_first() {
        let db = MemoryDatabase::new();
        db.persist_banned_word(1, 42, "spam").unwrap();
        db.persist_banned_word(1, 42, "scam").unwrap();
        db.persist_banned_word(1, 7, "other").unwrap();

        assert_eq!(db.fetch_banned_words(42).unwrap(), vec!["scam", "spam"]);
        assert!(db.fetch_banned_words(99).unwrap().is_empty());
    }

    #[test]
    fn test_banned_word_rows_keep_owner_and_ids() {
        let db = MemoryDatabase::new();
        db.persist_banned_word(5, 42, "spam").unwrap();
        db.persist_banned_word(5, 42, "scam").unwrap();

        let rows = db.fetch_banned_word_rows(42).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].word, "scam");
        assert!(rows[0].id > rows[1].id);
        assert!(rows.iter().all(|r| r.user_id == 5 && r.livestream_id == 42));
        assert!(rows[0].created_at > 0);
    }

    #[test]
    fn test_fetch_comment_and_report() {
        let db = MemoryDatabase::new();
        let row = db.insert_comment(comment(42, "hello")).unwrap();

        assert_eq!(db.fetch_comment(row.id).unwrap(), row);
        assert!(matches!(db.fetch_comment(99), Err(AppError::NotFound(_))));

        let first = db.insert_report(2, 42, row.id).unwrap();
        let second = db.insert_report(3, 42, row.id).unwrap();
        assert_eq!(first.livecomment_id, row.id);
        assert_eq!(first.user_id, 2);
        assert!(second.id > first.id);
    }

    #[test]
    fn test_commit_banned_word_deletes_matching_comments() {
        let db = MemoryDatabase::new();
        db.insert_comment(comment(42, "this is spam")).unwrap();
        db.insert_comment(comment(42, "this is fine")).unwrap();
        db.insert_comment(comment(7, "spam elsewhere")).unwrap();

        let (word_id, deleted) = db.commit_banned_word(1, 42, "spam").unwrap();

        assert_eq!(word_id, 1);
        assert_eq!(deleted, 1);
        let remaining: Vec<_> = db
            .list_comments(42, None)
            .unwrap()
            .into_iter()
            .map(|c| c.comment)
            .collect();
        assert_eq!(remaining, vec!["this is fine"]);
        assert_eq!(db.list_comments(7, None).unwrap().len(), 1);
    }

    #[test]
    fn test_comment_matching_is_case_sensitive() {
        let db = MemoryDatabase::new();
        db.insert_comment(comment(42, "SPAM in caps")).unwrap();

        assert_eq!(db.delete_matching_comments(42, "spam").unwrap(), 0);
    }

    #[test]
    fn test_list_comments_newest_first_with_limit() {
        let db = MemoryDatabase::new();
        for text in ["a", "b", "c"] {
            db.insert_comment(comment(42, text)).unwrap();
        }

        let listed = db.list_comments(42, Some(2)).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].comment, "c");
        assert_eq!(listed[1].comment, "b");
        assert!(listed[0].id > listed[1].id);
    }

    #[test]
    fn test_missing_livestream() {
        let db = MemoryDatabase::new();
        assert!(matches!(db.fetch_livestream(1), Err(AppError::NotFound(_))));

        let stream = db.insert_livestream(3, "first stream").unwrap();
        assert_eq!(db.fetch_livestream(stream.id).unwrap().user_id, 3);
    }
}
