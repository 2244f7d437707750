use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use writein_types::api::{Claims, LikeResponse};
use writein_types::view;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// POST /pastes/{id}/like — toggle: removes the viewer's like if present,
/// adds one if not. The response carries the count as re-read after the
/// write, so clients only move their counter on confirmation; a failure
/// surfaces as an error response and changes nothing.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(paste_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<LikeResponse>> {
    if state.db.get_paste_by_id(&paste_id.to_string())?.is_none() {
        return Err(ApiError::NotFound);
    }

    let like_id = Uuid::new_v4();
    let liked = state.db.toggle_like(
        &like_id.to_string(),
        &paste_id.to_string(),
        &claims.sub.to_string(),
    )?;

    let like_count = state.db.count_likes(&paste_id.to_string())?;

    Ok(Json(LikeResponse {
        liked,
        like_count,
        like_label: view::like_label(like_count),
    }))
}
