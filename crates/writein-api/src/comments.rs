use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use uuid::Uuid;

use writein_types::api::{Claims, CreateCommentRequest};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::pastes::comment_response;

/// POST /pastes/{id}/comments — append to the thread. New comments are
/// always newest, so clients can push them onto the end of an
/// ascending-ordered list.
pub async fn post_comment(
    State(state): State<AppState>,
    Path(paste_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::Validation("comment can't be blank"));
    }

    if state.db.get_paste_by_id(&paste_id.to_string())?.is_none() {
        return Err(ApiError::NotFound);
    }

    let comment_id = Uuid::new_v4();
    state.db.insert_comment(
        &comment_id.to_string(),
        &paste_id.to_string(),
        &claims.sub.to_string(),
        &content,
    )?;

    // Fetch the submitter's own profile for immediate display.
    let profile = state.db.get_profile_by_user_id(&claims.sub.to_string())?;

    // Read the row back to pick up its stored timestamp.
    let row = state
        .db
        .get_comment_by_id(&comment_id.to_string())?
        .ok_or_else(|| anyhow::anyhow!("comment missing right after insert"))?;

    let response = comment_response(&row, profile.as_ref().map(|p| p.username.as_str()), Utc::now());
    Ok((StatusCode::CREATED, Json(response)))
}
