//! Response DTOs for the livestream API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for POST /api/login
///
/// Carries the id clients send back in `X-User-Id`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
}

/// Response body for POST /api/icon
#[derive(Debug, Clone, Serialize)]
pub struct IconResponse {
    pub id: i64,
}

/// Response body for POST /api/livestream/:id/moderate
#[derive(Debug, Clone, Serialize)]
pub struct ModerateResponse {
    pub word_id: i64,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct AllCacheStats {
    pub credentials: CacheStats,
    pub profiles: CacheStats,
    pub moderation: CacheStats,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
