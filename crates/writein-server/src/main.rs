use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use writein_api::auth::{self, AppState, AppStateInner};
use writein_api::comments;
use writein_api::likes;
use writein_api::middleware::{optional_auth, require_auth};
use writein_api::pastes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "writein=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("WRITEIN_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("WRITEIN_DB_PATH").unwrap_or_else(|_| "writein.db".into());
    let host = std::env::var("WRITEIN_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("WRITEIN_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    // Origin baked into share links; falls back to the bind address.
    let public_origin = std::env::var("WRITEIN_PUBLIC_ORIGIN")
        .unwrap_or_else(|_| format!("http://{}:{}", host, port));

    // Init database
    let db = writein_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        public_origin,
    });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/p/{slug}/raw", get(pastes::raw_paste))
        .with_state(state.clone());

    // The paste page renders for anonymous viewers too; the middleware only
    // resolves who is looking.
    let viewer_routes = Router::new()
        .route("/p/{slug}", get(pastes::paste_detail))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/pastes", post(pastes::create_paste))
        .route("/pastes/mine", get(pastes::my_pastes))
        .route("/pastes/{id}", delete(pastes::delete_paste))
        .route("/pastes/{id}/comments", post(comments::post_comment))
        .route("/pastes/{id}/like", post(likes::toggle_like))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(viewer_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Writein server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
