//! Chess Session Server
//!
//! A minimal Axum-based web server that holds exactly one chess game and
//! exposes it as request/response tool calls:
//! - game lifecycle (create/reset) and move application
//! - status, legality and history queries
//! - an ASCII board rendering for humans
//!
//! The server manages state only; it never suggests or scores moves.

mod api;
mod config;

use axum::routing::{get, post};
use axum::Router;
use chess_session::GameSession;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// The single game session shared by all handlers.
///
/// Mutating tools hold the lock across the whole read-validate-apply
/// sequence; queries take the same lock, so no response ever observes a
/// torn position/history pair.
pub type SharedSession = Arc<Mutex<GameSession>>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one game this process manages.
    pub session: SharedSession,
}

/// Health check endpoint.
///
/// Returns "ok" to indicate the server is running.
async fn health() -> &'static str {
    "ok"
}

/// Builds the tool router over the given state.
fn router(state: AppState) -> Router {
    // CORS layer for cross-origin requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route(
            "/tools/create_or_reset_game",
            post(api::game::create_or_reset_game),
        )
        .route("/tools/get_status", get(api::game::get_status))
        .route("/tools/add_move", post(api::game::add_move))
        .route("/tools/is_legal", post(api::game::is_legal))
        .route("/tools/list_moves", get(api::game::list_moves))
        .route(
            "/tools/list_moves_detailed",
            get(api::game::list_moves_detailed),
        )
        .route("/tools/last_moves", get(api::game::last_moves))
        .route(
            "/tools/last_moves_detailed",
            get(api::game::last_moves_detailed),
        )
        .route("/tools/board_ascii", get(api::game::board_ascii))
        .with_state(state)
        .layer(cors)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = config::Config::load().await.expect("Failed to load config");
    let state = AppState {
        session: Arc::new(Mutex::new(GameSession::new())),
    };
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    tracing::info!("Chess session server running on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    axum::serve(listener, app).await.expect("Server error");
}
