//! Assembled user profile, the value held by the profile cache.

use serde::Serialize;

/// User joined with theme and icon fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub theme: Theme,
    /// SHA-256 hex of the user's icon, or of the fallback image
    pub icon_hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Theme {
    pub id: i64,
    pub dark_mode: bool,
}
