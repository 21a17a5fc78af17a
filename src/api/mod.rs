//! API Module
//!
//! HTTP handlers and routing for the livestream backend.
//!
//! # Endpoints
//! - `POST /api/register` - Create an account
//! - `POST /api/login` - Check credentials
//! - `GET /api/user/me` - Caller's profile
//! - `GET /api/user/:username` - Profile by name
//! - `GET /api/user/:username/icon` - Icon image, 304 on a matching `If-None-Match`
//! - `POST /api/icon` - Upload the caller's icon
//! - `POST /api/livestream` - Open a livestream
//! - `GET|POST /api/livestream/:id/livecomment` - List or post comments
//! - `POST /api/livestream/:id/livecomment/:livecomment_id/report` - Report a comment
//! - `POST /api/livestream/:id/moderate` - Add a banned word
//! - `GET /api/livestream/:id/ngwords` - Banned words (owner only)
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod extract;
pub mod handlers;
pub mod routes;

pub use extract::{AuthUser, USER_ID_HEADER};
pub use handlers::*;
pub use routes::create_router;
