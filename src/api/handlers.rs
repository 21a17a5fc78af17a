//! API Handlers
//!
//! HTTP request handlers for each endpoint. Handlers only translate between
//! HTTP and the services; all caching happens below them.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::api::AuthUser;
use crate::cache::{
    Clock, CredentialVerificationCache, ModerationWordCache, ProfileAssemblyCache, SystemClock,
};
use crate::config::Config;
use crate::error::Result;
use crate::models::{
    AllCacheStats, CommentListQuery, CreateLivestreamRequest, HealthResponse, IconResponse,
    Livecomment, LivecommentReport, LoginRequest, LoginResponse, ModerateRequest, ModerateResponse,
    PostIconRequest, PostLivecommentRequest, RegisterRequest, UserProfile,
};
use crate::services::{AuthService, IconFetch, LivecommentService, UserService};
use crate::source::{BannedWordRow, BcryptVerifier, LivestreamRow, MemoryDatabase};

/// Application state shared across all handlers.
///
/// Every cache is constructed once here and handed to the services that use
/// it; handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub livecomments: Arc<LivecommentService>,
    pub credentials: Arc<CredentialVerificationCache>,
    pub profiles: Arc<ProfileAssemblyCache>,
    pub words: Arc<ModerationWordCache>,
}

impl AppState {
    /// Wires caches and services over `db`.
    ///
    /// # Arguments
    /// * `clock` - Time source for the profile cache
    /// * `fallback_icon` - Image hashed for users without an icon
    pub fn new(
        config: &Config,
        db: Arc<MemoryDatabase>,
        clock: Arc<dyn Clock>,
        fallback_icon: &[u8],
    ) -> Self {
        let credentials = Arc::new(CredentialVerificationCache::new());
        let profiles = Arc::new(ProfileAssemblyCache::new(
            db.clone(),
            clock,
            fallback_icon,
            config.profile_ttl,
        ));
        let words = Arc::new(ModerationWordCache::new(db.clone()));

        let auth = AuthService::new(
            db.clone(),
            Arc::new(BcryptVerifier::new(config.bcrypt_cost)),
            credentials.clone(),
            profiles.clone(),
        );
        let users = UserService::new(db.clone(), profiles.clone(), Arc::from(fallback_icon));
        let livecomments = LivecommentService::new(
            db.clone(),
            db,
            words.clone(),
            profiles.clone(),
            config.invalidation_delay,
        );

        Self {
            auth: Arc::new(auth),
            users: Arc::new(users),
            livecomments: Arc::new(livecomments),
            credentials,
            profiles,
            words,
        }
    }

    /// Creates a new AppState with an empty database and the system clock.
    pub fn from_config(config: &Config, fallback_icon: &[u8]) -> Self {
        Self::new(
            config,
            Arc::new(MemoryDatabase::new()),
            Arc::new(SystemClock),
            fallback_icon,
        )
    }
}

/// Handler for POST /api/register
pub async fn register_handler(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserProfile>)> {
    let profile = state.auth.register(req.into()).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Handler for POST /api/login
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let user_id = state.auth.login(&req.username, &req.password).await?;
    Ok(Json(LoginResponse { user_id }))
}

/// Handler for GET /api/user/me
pub async fn me_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.users.profile(user_id)?))
}

/// Handler for GET /api/user/:username
pub async fn user_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<UserProfile>> {
    Ok(Json(state.users.profile_by_name(&username)?))
}

/// Handler for GET /api/user/:username/icon
///
/// Answers 304 when `If-None-Match` carries the quoted icon hash.
pub async fn get_icon_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let if_none_match = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok());

    match state.users.icon(&username, if_none_match)? {
        IconFetch::NotModified => Ok(StatusCode::NOT_MODIFIED.into_response()),
        IconFetch::Image { bytes, icon_hash } => {
            let mut response = ([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response();
            let etag = icon_hash.and_then(|hash| HeaderValue::from_str(&format!("\"{}\"", hash)).ok());
            if let Some(etag) = etag {
                response.headers_mut().insert(header::ETAG, etag);
            }
            Ok(response)
        }
    }
}

/// Handler for POST /api/icon
pub async fn post_icon_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<PostIconRequest>,
) -> Result<(StatusCode, Json<IconResponse>)> {
    let id = state.users.upload_icon(user_id, req.image)?;
    Ok((StatusCode::CREATED, Json(IconResponse { id })))
}

/// Handler for POST /api/livestream
pub async fn create_livestream_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateLivestreamRequest>,
) -> Result<(StatusCode, Json<LivestreamRow>)> {
    let stream = state.livecomments.create_livestream(user_id, &req.title)?;
    Ok((StatusCode::CREATED, Json(stream)))
}

/// Handler for GET /api/livestream/:id/livecomment
pub async fn list_livecomments_handler(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(stream_id): Path<i64>,
    Query(query): Query<CommentListQuery>,
) -> Result<Json<Vec<Livecomment>>> {
    Ok(Json(state.livecomments.list_comments(stream_id, query.limit)?))
}

/// Handler for POST /api/livestream/:id/livecomment
pub async fn post_livecomment_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(stream_id): Path<i64>,
    Json(req): Json<PostLivecommentRequest>,
) -> Result<(StatusCode, Json<Livecomment>)> {
    let comment = state
        .livecomments
        .post_comment(user_id, stream_id, req.comment, req.tip)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Handler for POST /api/livestream/:id/livecomment/:livecomment_id/report
pub async fn report_livecomment_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((stream_id, comment_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<LivecommentReport>)> {
    let report = state
        .livecomments
        .report_comment(user_id, stream_id, comment_id)?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// Handler for POST /api/livestream/:id/moderate
///
/// Responds as soon as the word is committed; the cache entry is cleared in
/// the background.
pub async fn moderate_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(stream_id): Path<i64>,
    Json(req): Json<ModerateRequest>,
) -> Result<(StatusCode, Json<ModerateResponse>)> {
    let moderation = state
        .livecomments
        .moderate(user_id, stream_id, &req.ng_word)?;
    Ok((
        StatusCode::CREATED,
        Json(ModerateResponse {
            word_id: moderation.word_id,
        }),
    ))
}

/// Handler for GET /api/livestream/:id/ngwords
pub async fn ngwords_handler(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(stream_id): Path<i64>,
) -> Result<Json<Vec<BannedWordRow>>> {
    Ok(Json(state.livecomments.banned_words(user_id, stream_id)?))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<AllCacheStats> {
    Json(AllCacheStats {
        credentials: state.credentials.stats(),
        profiles: state.profiles.stats(),
        moderation: state.words.stats(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
