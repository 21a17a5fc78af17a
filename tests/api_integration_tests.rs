//! Integration Tests for API Endpoints
//!
//! Drives the full router: credentials, profile staleness, and moderation
//! timing as seen by HTTP clients.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use streamcache::{
    api::create_router,
    cache::{icon_fingerprint, ManualClock},
    source::{LivestreamStore, MemoryDatabase, ModerationSource, NewUser, UserStore},
    AppState, Config,
};
use tower::ServiceExt;

// == Helper Functions ==

const FALLBACK: &[u8] = b"fallback icon";

struct TestApp {
    router: Router,
    db: Arc<MemoryDatabase>,
    clock: Arc<ManualClock>,
    state: AppState,
}

fn create_test_app() -> TestApp {
    let db = Arc::new(MemoryDatabase::new());
    let clock = Arc::new(ManualClock::new());
    let state = AppState::new(&Config::default(), db.clone(), clock.clone(), FALLBACK);
    TestApp {
        router: create_router(state.clone()),
        db,
        clock,
        state,
    }
}

/// Inserts a user directly, skipping bcrypt.
fn seed_user(db: &MemoryDatabase, name: &str) -> i64 {
    db.insert_user(NewUser {
        name: name.to_string(),
        display_name: format!("{} on air", name),
        description: String::new(),
        hashed_password: "unused".to_string(),
        dark_mode: false,
    })
    .unwrap()
    .id
}

async fn send(app: &TestApp, method: &str, uri: &str, user: Option<i64>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header("x-user-id", id.to_string());
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

// == Registration and Login ==

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app();

    let (status, profile) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({"name": "alice", "display_name": "Alice", "password": "pw", "theme": {"dark_mode": true}})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["name"], "alice");
    assert_eq!(profile["theme"]["dark_mode"], true);
    assert_eq!(profile["icon_hash"], icon_fingerprint(FALLBACK));

    let (status, login) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "alice", "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["user_id"], profile["id"]);
}

#[tokio::test]
async fn test_reserved_username_rejected() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({"name": "pipe", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("reserved"));
}

#[tokio::test]
async fn test_repeated_bad_password_served_from_cache() {
    let app = create_test_app();
    send(
        &app,
        "POST",
        "/api/register",
        None,
        Some(json!({"name": "alice", "password": "pw"})),
    )
    .await;

    for _ in 0..3 {
        let (status, body) = send(
            &app,
            "POST",
            "/api/login",
            None,
            Some(json!({"username": "alice", "password": "guess"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "invalid username or password");
    }

    let stats = app.state.credentials.stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.total_entries, 1);
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = create_test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/api/login",
        None,
        Some(json!({"username": "nobody", "password": "pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// == Profile Staleness ==

#[tokio::test]
async fn test_icon_update_visible_after_ttl() {
    let app = create_test_app();
    let user = seed_user(&app.db, "user7");

    let (_, before) = send(&app, "GET", "/api/user/me", Some(user), None).await;
    assert_eq!(before["icon_hash"], icon_fingerprint(FALLBACK));

    app.clock.advance(Duration::from_millis(500));
    let (status, icon) = send(
        &app,
        "POST",
        "/api/icon",
        Some(user),
        Some(json!({"image": [1, 2, 3]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(icon["id"].as_i64().unwrap() > 0);

    app.clock.advance(Duration::from_millis(100));
    let (_, stale) = send(&app, "GET", "/api/user/me", Some(user), None).await;
    assert_eq!(stale["icon_hash"], before["icon_hash"]);

    app.clock.advance(Duration::from_millis(900));
    let (_, fresh) = send(&app, "GET", "/api/user/me", Some(user), None).await;
    assert_eq!(fresh["icon_hash"], icon_fingerprint(&[1, 2, 3]));
}

#[tokio::test]
async fn test_icon_download_and_not_modified() {
    let app = create_test_app();
    let user = seed_user(&app.db, "user7");

    let fallback = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/api/user/user7/icon").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(fallback.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(fallback.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], FALLBACK);

    send(&app, "POST", "/api/icon", Some(user), Some(json!({"image": [1, 2, 3]}))).await;
    let etag = format!("\"{}\"", icon_fingerprint(&[1, 2, 3]));

    let cached = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user/user7/icon")
                .header("if-none-match", &etag)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);

    let stale = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/user/user7/icon")
                .header("if-none-match", "\"stale\"")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::OK);
    assert_eq!(stale.headers()["etag"], etag.as_str());
    let bytes = axum::body::to_bytes(stale.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], &[1u8, 2, 3][..]);
}

#[tokio::test]
async fn test_profile_by_username() {
    let app = create_test_app();
    let user = seed_user(&app.db, "bob");

    let (status, profile) = send(&app, "GET", "/api/user/bob", Some(user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["display_name"], "bob on air");

    let (status, _) = send(&app, "GET", "/api/user/ghost", Some(user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_user_never_cached() {
    let app = create_test_app();

    for _ in 0..2 {
        let (status, _) = send(&app, "GET", "/api/user/me", Some(404), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    assert!(app.state.profiles.is_empty());
}

// == Comments and Moderation ==

#[tokio::test]
async fn test_stream_42_spam_scenario() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let viewer = seed_user(&app.db, "viewer");
    let stream = loop {
        let row = app.db.insert_livestream(owner, "stream").unwrap();
        if row.id == 42 {
            break row.id;
        }
    };
    app.db.persist_banned_word(owner, stream, "spam").unwrap();
    assert_eq!(&*app.state.words.get_words(stream).unwrap(), ["spam".to_string()]);

    let uri = format!("/api/livestream/{}/livecomment", stream);
    let (status, _) = send(&app, "POST", &uri, Some(viewer), Some(json!({"comment": "this is spam"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, first) = send(&app, "POST", &uri, Some(viewer), Some(json!({"comment": "this is fine"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["user"]["name"], "viewer");
    let (_, second) = send(&app, "POST", &uri, Some(viewer), Some(json!({"comment": "also fine", "tip": 5}))).await;
    assert!(second["id"].as_i64() > first["id"].as_i64());

    let (status, listed) = send(&app, "GET", &uri, Some(viewer), None).await;
    assert_eq!(status, StatusCode::OK);
    let texts: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["comment"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["also fine", "this is fine"]);
}

#[tokio::test]
async fn test_comment_from_unknown_user_does_not_break_listing() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let stream = app.db.insert_livestream(owner, "live").unwrap();
    let uri = format!("/api/livestream/{}/livecomment", stream.id);
    send(&app, "POST", &uri, Some(owner), Some(json!({"comment": "welcome"}))).await;

    let (status, _) = send(&app, "POST", &uri, Some(999), Some(json!({"comment": "hi"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, listed) = send(&app, "GET", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_report_livecomment() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let viewer = seed_user(&app.db, "viewer");
    let stream = app.db.insert_livestream(owner, "live").unwrap();
    let comments = format!("/api/livestream/{}/livecomment", stream.id);
    let (_, comment) = send(&app, "POST", &comments, Some(viewer), Some(json!({"comment": "rude"}))).await;

    let uri = format!("{}/{}/report", comments, comment["id"]);
    let (status, report) = send(&app, "POST", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["reporter"]["name"], "owner");
    assert_eq!(report["livecomment"]["comment"], "rude");
    assert_eq!(report["livecomment"]["user"]["name"], "viewer");

    let (status, body) = send(&app, "POST", &format!("{}/999/report", comments), Some(owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "livecomment not found");
}

#[tokio::test(start_paused = true)]
async fn test_moderation_visible_after_delay() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let viewer = seed_user(&app.db, "viewer");
    let (status, stream) = send(&app, "POST", "/api/livestream", Some(owner), Some(json!({"title": "live"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let stream_id = stream["id"].as_i64().unwrap();
    let comments = format!("/api/livestream/{}/livecomment", stream_id);

    // Pre-write list is cached as empty
    let (status, _) = send(&app, "POST", &comments, Some(viewer), Some(json!({"comment": "cheap gold"}))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, moderated) = send(
        &app,
        "POST",
        &format!("/api/livestream/{}/moderate", stream_id),
        Some(owner),
        Some(json!({"ng_word": "gold"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(moderated["word_id"].as_i64().unwrap() > 0);

    // Matching comment is gone as soon as the write commits
    let (_, listed) = send(&app, "GET", &comments, Some(viewer), None).await;
    assert!(listed.as_array().unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(app.state.words.get_words(stream_id).unwrap().is_empty());

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(&*app.state.words.get_words(stream_id).unwrap(), ["gold".to_string()]);
    let (status, _) = send(&app, "POST", &comments, Some(viewer), Some(json!({"comment": "more gold"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_moderate_foreign_stream_rejected() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let other = seed_user(&app.db, "other");
    let stream = app.db.insert_livestream(owner, "live").unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/livestream/{}/moderate", stream.id),
        Some(other),
        Some(json!({"ng_word": "x"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ngwords_owner_only() {
    let app = create_test_app();
    let owner = seed_user(&app.db, "owner");
    let other = seed_user(&app.db, "other");
    let stream = app.db.insert_livestream(owner, "live").unwrap();
    app.db.persist_banned_word(owner, stream.id, "spam").unwrap();
    let uri = format!("/api/livestream/{}/ngwords", stream.id);

    let (status, words) = send(&app, "GET", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(words.as_array().unwrap().len(), 1);
    assert_eq!(words[0]["word"], "spam");
    assert_eq!(words[0]["user_id"], owner);
    assert_eq!(words[0]["livestream_id"], stream.id);

    let (_, words) = send(&app, "GET", &uri, Some(other), None).await;
    assert_eq!(words, json!([]));
}

// == Stats and Health ==

#[tokio::test]
async fn test_stats_endpoint_reports_all_caches() {
    let app = create_test_app();
    let user = seed_user(&app.db, "alice");
    send(&app, "GET", "/api/user/me", Some(user), None).await;
    send(&app, "GET", "/api/user/me", Some(user), None).await;

    let (status, stats) = send(&app, "GET", "/stats", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["profiles"]["hits"], 1);
    assert_eq!(stats["profiles"]["misses"], 1);
    assert_eq!(stats["profiles"]["total_entries"], 1);
    assert_eq!(stats["credentials"]["total_entries"], 0);
    assert_eq!(stats["moderation"]["hits"], 0);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
