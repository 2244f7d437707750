use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- JWT Claims --

/// JWT claims shared between the auth handlers (token issue) and the
/// middleware (token validation). Canonical definition lives here in
/// writein-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned by both register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

/// The current-user surface of a session: who the bearer token says you are.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub username: String,
}

// -- Pastes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePasteRequest {
    pub title: String,
    pub content: String,
    #[serde(default = "default_public")]
    pub is_public: bool,
}

fn default_public() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct PasteResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub share_url: String,
}

/// Everything the paste page renders, materialized in one response:
/// the paste, its author's display name, the ordered comment thread,
/// the like tally, and the viewer's own like status.
#[derive(Debug, Serialize)]
pub struct PasteDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub created_ago: String,
    pub comments: Vec<CommentResponse>,
    pub comments_heading: String,
    pub like_count: i64,
    pub like_label: String,
    pub has_liked: bool,
    pub share_url: String,
}

/// One dashboard card: the owner's paste with its content preview and
/// the copy-link URL.
#[derive(Debug, Serialize)]
pub struct DashboardEntry {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub preview: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub created_ago: String,
    pub share_url: String,
}

#[derive(Debug, Serialize)]
pub struct DeletePasteResponse {
    pub deleted_id: Uuid,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub paste_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub created_ago: String,
}

// -- Likes --

/// Reported only after the store confirmed the write; the client never
/// moves its counter ahead of this.
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: i64,
    pub like_label: String,
}
