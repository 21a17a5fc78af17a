//! Domain values and the DTOs used for HTTP request and response bodies.

pub mod livecomment;
pub mod profile;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use livecomment::{Livecomment, LivecommentReport};
pub use profile::{Theme, UserProfile};
pub use requests::{
    CommentListQuery, CreateLivestreamRequest, LoginRequest, ModerateRequest,
    PostIconRequest, PostLivecommentRequest, RegisterRequest,
};
pub use responses::{
    AllCacheStats, HealthResponse, IconResponse, LoginResponse, ModerateResponse,
};
