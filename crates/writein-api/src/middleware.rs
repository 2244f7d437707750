use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use writein_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Viewer identity on routes that render for signed-in and anonymous
/// visitors alike; `optional_auth` always inserts one.
#[derive(Debug, Clone)]
pub struct OptionalClaims(pub Option<Claims>);

/// Extract and validate JWT from the Authorization header. The secret comes
/// from shared state, so the session context is explicit per request.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = claims_from_request(&req, &state.jwt_secret).ok_or(ApiError::Unauthorized)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Like `require_auth`, but an absent or invalid token means an anonymous
/// viewer rather than a rejection.
pub async fn optional_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let claims = claims_from_request(&req, &state.jwt_secret);
    req.extensions_mut().insert(OptionalClaims(claims));
    next.run(req).await
}

fn claims_from_request(req: &Request, secret: &str) -> Option<Claims> {
    let auth_header = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;
    use axum::body::Body;
    use uuid::Uuid;

    fn request_with_auth(value: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn token_roundtrip_recovers_claims() {
        let user_id = Uuid::new_v4();
        let token = create_token("secret", user_id, "vaish").unwrap();
        let req = request_with_auth(Some(&format!("Bearer {token}")));

        let claims = claims_from_request(&req, "secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "vaish");
    }

    #[test]
    fn missing_header_yields_no_identity() {
        let req = request_with_auth(None);
        assert!(claims_from_request(&req, "secret").is_none());
    }

    #[test]
    fn wrong_secret_yields_no_identity() {
        let token = create_token("secret", Uuid::new_v4(), "vaish").unwrap();
        let req = request_with_auth(Some(&format!("Bearer {token}")));
        assert!(claims_from_request(&req, "other-secret").is_none());
    }

    #[test]
    fn non_bearer_header_yields_no_identity() {
        let req = request_with_auth(Some("Basic dXNlcjpwdw=="));
        assert!(claims_from_request(&req, "secret").is_none());
    }
}
