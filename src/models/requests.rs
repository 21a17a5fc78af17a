//! Request DTOs for the livestream API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::services::Registration;

/// Request body for POST /api/register
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Plaintext password, hashed before storage
    pub password: String,
    #[serde(default)]
    pub theme: ThemeRequest,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThemeRequest {
    #[serde(default)]
    pub dark_mode: bool,
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            display_name: req.display_name,
            description: req.description,
            password: req.password,
            dark_mode: req.theme.dark_mode,
        }
    }
}

/// Request body for POST /api/login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    /// Plaintext password
    pub password: String,
}

/// Request body for POST /api/icon
#[derive(Debug, Clone, Deserialize)]
pub struct PostIconRequest {
    /// Raw image bytes as a JSON array
    pub image: Vec<u8>,
}

/// Request body for POST /api/livestream
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLivestreamRequest {
    pub title: String,
}

/// Request body for POST /api/livestream/:id/livecomment
#[derive(Debug, Clone, Deserialize)]
pub struct PostLivecommentRequest {
    pub comment: String,
    #[serde(default)]
    pub tip: i64,
}

/// Request body for POST /api/livestream/:id/moderate
#[derive(Debug, Clone, Deserialize)]
pub struct ModerateRequest {
    pub ng_word: String,
}

/// Query string for GET /api/livestream/:id/livecomment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentListQuery {
    pub limit: Option<usize>,
}
