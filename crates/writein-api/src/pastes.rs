use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::error;
use uuid::Uuid;

use writein_db::Database;
use writein_db::models::{CommentRow, PasteRow};
use writein_types::api::{
    Claims, CommentResponse, CreatePasteRequest, DashboardEntry, DeletePasteResponse,
    PasteDetailResponse, PasteResponse,
};
use writein_types::view;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::OptionalClaims;
use crate::{parse_timestamp, parse_uuid};

const SLUG_LEN: usize = 8;
const SLUG_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SLUG_ATTEMPTS: usize = 4;

/// Random lowercase-alphanumeric public identifier. 36^8 ids keep
/// collisions rare; the insert loop retries the unlucky ones.
fn generate_slug() -> String {
    let mut rng = rand::rng();
    (0..SLUG_LEN)
        .map(|_| SLUG_CHARS[rng.random_range(0..SLUG_CHARS.len())] as char)
        .collect()
}

pub async fn create_paste(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePasteRequest>,
) -> ApiResult<impl IntoResponse> {
    let title = req.title.trim().to_string();
    let content = req.content.trim().to_string();
    if title.is_empty() {
        return Err(ApiError::Validation("title can't be blank"));
    }
    if content.is_empty() {
        return Err(ApiError::Validation("content can't be blank"));
    }

    let paste_id = Uuid::new_v4();
    let user_id = claims.sub.to_string();
    let is_public = req.is_public;

    // Run blocking DB work off the async runtime
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        for _ in 0..SLUG_ATTEMPTS {
            let slug = generate_slug();
            let inserted = db.db.insert_paste(
                &paste_id.to_string(),
                &user_id,
                &title,
                &content,
                &slug,
                is_public,
            )?;
            if inserted {
                return db
                    .db
                    .get_paste_by_slug(&slug)?
                    .ok_or_else(|| anyhow::anyhow!("paste missing right after insert"));
            }
        }
        Err(anyhow::anyhow!("no free slug after {} attempts", SLUG_ATTEMPTS))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.into())
    })??;

    let response = paste_response(&row, &state.public_origin);
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /p/{slug} — everything one paste page renders.
pub async fn paste_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Extension(OptionalClaims(viewer)): Extension<OptionalClaims>,
) -> ApiResult<Json<PasteDetailResponse>> {
    let db = state.clone();
    let viewer_id = viewer.map(|c| c.sub);
    let origin = state.public_origin.clone();

    let detail = tokio::task::spawn_blocking(move || load_paste_detail(&db.db, &slug, viewer_id, &origin))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    detail.map(Json).ok_or(ApiError::NotFound)
}

/// GET /p/{slug}/raw — the bare content, for copy-paste and curl.
pub async fn raw_paste(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || db.db.get_paste_by_slug(&slug))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??
        .ok_or(ApiError::NotFound)?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        row.content,
    ))
}

/// GET /pastes/mine — the dashboard list, newest first.
pub async fn my_pastes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<Vec<DashboardEntry>>> {
    let db = state.clone();
    let user_id = claims.sub.to_string();

    let rows = tokio::task::spawn_blocking(move || db.db.get_pastes_by_user(&user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(e.into())
        })??;

    let now = Utc::now();
    let entries = rows
        .iter()
        .map(|row| {
            let created_at = parse_timestamp(&row.created_at, "paste");
            DashboardEntry {
                id: parse_uuid(&row.id, "paste id"),
                title: row.title.clone(),
                slug: row.slug.clone(),
                preview: view::preview(&row.content),
                is_public: row.is_public,
                created_at,
                created_ago: view::relative_time(created_at, now),
                share_url: view::share_url(&state.public_origin, &row.slug),
            }
        })
        .collect();

    Ok(Json(entries))
}

/// DELETE /pastes/{id} — owner-scoped; a foreign paste looks absent.
pub async fn delete_paste(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<DeletePasteResponse>> {
    let removed = state.db.delete_paste(&id.to_string(), &claims.sub.to_string())?;
    if !removed {
        return Err(ApiError::NotFound);
    }

    Ok(Json(DeletePasteResponse { deleted_id: id }))
}

/// The paste page needs five dependent lookups; they run strictly in order
/// and stop at the first miss.
fn load_paste_detail(
    db: &Database,
    slug: &str,
    viewer: Option<Uuid>,
    origin: &str,
) -> anyhow::Result<Option<PasteDetailResponse>> {
    // 1. The paste itself. A miss is the not-found state; none of the
    //    remaining queries are issued.
    let Some(paste) = db.get_paste_by_slug(slug)? else {
        return Ok(None);
    };

    // 2. Author profile (nullable).
    let author = db.get_profile_by_user_id(&paste.user_id)?;

    // 3. Comment thread, oldest first.
    let comment_rows = db.get_comments_for_paste(&paste.id)?;

    // 4. One batched profile query for the distinct commenters.
    let mut profiles: HashMap<String, String> = HashMap::new();
    if !comment_rows.is_empty() {
        let mut seen = HashSet::new();
        let commenter_ids: Vec<String> = comment_rows
            .iter()
            .filter(|c| seen.insert(c.user_id.clone()))
            .map(|c| c.user_id.clone())
            .collect();

        for profile in db.get_profiles_by_user_ids(&commenter_ids)? {
            profiles.insert(profile.user_id, profile.username);
        }
    }

    // 5. Like tally, count only.
    let like_count = db.count_likes(&paste.id)?;

    // 6. The viewer's own like status; anonymous viewers skip the query.
    let has_liked = match viewer {
        Some(user_id) => db.has_liked(&paste.id, &user_id.to_string())?,
        None => false,
    };

    let now = Utc::now();
    let comments = comment_rows
        .iter()
        .map(|row| comment_response(row, profiles.get(&row.user_id).map(String::as_str), now))
        .collect();

    let created_at = parse_timestamp(&paste.created_at, "paste");
    let comments_heading = view::comments_heading(comment_rows.len());

    Ok(Some(PasteDetailResponse {
        id: parse_uuid(&paste.id, "paste id"),
        title: paste.title,
        content: paste.content,
        author_username: view::display_name(author.as_ref().map(|p| p.username.as_str())).to_string(),
        created_at,
        created_ago: view::relative_time(created_at, now),
        comments,
        comments_heading,
        like_count,
        like_label: view::like_label(like_count),
        has_liked,
        share_url: view::share_url(origin, &paste.slug),
        slug: paste.slug,
    }))
}

pub(crate) fn comment_response(
    row: &CommentRow,
    username: Option<&str>,
    now: DateTime<Utc>,
) -> CommentResponse {
    let created_at = parse_timestamp(&row.created_at, "comment");
    CommentResponse {
        id: parse_uuid(&row.id, "comment id"),
        paste_id: parse_uuid(&row.paste_id, "comment paste id"),
        author_username: view::display_name(username).to_string(),
        content: row.content.clone(),
        created_at,
        created_ago: view::relative_time(created_at, now),
    }
}

fn paste_response(row: &PasteRow, origin: &str) -> PasteResponse {
    PasteResponse {
        id: parse_uuid(&row.id, "paste id"),
        title: row.title.clone(),
        content: row.content.clone(),
        slug: row.slug.clone(),
        is_public: row.is_public,
        created_at: parse_timestamp(&row.created_at, "paste"),
        share_url: view::share_url(origin, &row.slug),
    }
}
