use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use writein_db::Database;
use writein_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest, SessionResponse};

use crate::error::{ApiError, ApiResult};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Origin share links are derived from, e.g. `https://writein.app`.
    pub public_origin: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::Validation("username must be 3 to 32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("password must be at least 8 characters"));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::UsernameTaken);
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    let profile_id = Uuid::new_v4();

    // Credential row and display profile land together or not at all.
    state.db.create_user_with_profile(
        &user_id.to_string(),
        &profile_id.to_string(),
        &req.username,
        &password_hash,
    )?;

    let token = create_token(&state.jwt_secret, user_id, &req.username)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id,
            username: req.username,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    // Unknown user and wrong password look identical to the caller.
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized)?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored password hash unreadable: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;

    let token = create_token(&state.jwt_secret, user_id, &user.username)?;

    Ok(Json(AuthResponse {
        user_id,
        username: user.username,
        token,
    }))
}

/// The current-user surface: echoes what the validated token says.
pub async fn me(Extension(claims): Extension<Claims>) -> Json<SessionResponse> {
    Json(SessionResponse {
        user_id: claims.sub,
        username: claims.username,
    })
}

pub(crate) fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
