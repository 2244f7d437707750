use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use writein_types::view;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Request-scoped failure taxonomy. Nothing here is fatal to the process;
/// each variant maps to one response and leaves the rest of the app alone.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// An empty state, not a failure: the slug or id matched nothing
    /// (including deletes that found no row owned by the caller).
    #[error("not found")]
    NotFound,

    /// Action needs a signed-in user; the body prompts sign-in.
    #[error("sign in required")]
    Unauthorized,

    #[error("username is already taken")]
    UsernameTaken,

    #[error("{0}")]
    Validation(&'static str),

    /// Store or transport failure. Detail stays in the server log; the
    /// client gets an opaque notification and no state was applied.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // `error` is the notification headline, `message` its body text.
        let (status, title, message) = match &self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                view::NOT_FOUND_TITLE,
                view::NOT_FOUND_MESSAGE.to_string(),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Sign in required",
                "Please sign in to continue.".to_string(),
            ),
            ApiError::UsernameTaken => (
                StatusCode::CONFLICT,
                "Signup failed",
                "Username is already taken.".to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "Invalid request", (*msg).to_string()),
            ApiError::Internal(e) => {
                error!("internal error: {e:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error",
                    "Something went wrong. Please try again.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": title,
            "message": message,
        }));

        (status, body).into_response()
    }
}
