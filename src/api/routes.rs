//! API Routes
//!
//! Configures the Axum router with all livestream endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_livestream_handler, get_icon_handler, health_handler, list_livecomments_handler,
    login_handler, me_handler, moderate_handler, ngwords_handler, post_icon_handler,
    post_livecomment_handler, register_handler, report_livecomment_handler, stats_handler,
    user_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .route("/api/user/me", get(me_handler))
        .route("/api/user/:username", get(user_handler))
        .route("/api/user/:username/icon", get(get_icon_handler))
        .route("/api/icon", post(post_icon_handler))
        .route("/api/livestream", post(create_livestream_handler))
        .route(
            "/api/livestream/:livestream_id/livecomment",
            get(list_livecomments_handler).post(post_livecomment_handler),
        )
        .route(
            "/api/livestream/:livestream_id/livecomment/:livecomment_id/report",
            post(report_livecomment_handler),
        )
        .route("/api/livestream/:livestream_id/moderate", post(moderate_handler))
        .route("/api/livestream/:livestream_id/ngwords", get(ngwords_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
