//! Game tool handlers.
//!
//! Every tool is a self-contained request/response pair. Move rejections
//! are structured data in the response body (an `accepted` flag plus a
//! `reason` tag), never HTTP errors; only a body that fails to deserialize
//! is rejected by the extractor itself.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use chess_session::{LegalReport, MoveRecord, MoveRejection, Side, StatusReport};

use crate::AppState;

/// Response for `create_or_reset_game`.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Always true; the reset itself cannot fail.
    pub ok: bool,
    /// Snapshot of the fresh game.
    pub status: StatusReport,
    /// Move history in coordinate form (empty after a reset).
    pub moves: Vec<String>,
    /// Detailed move history (empty after a reset).
    pub moves_detailed: Vec<MoveRecord>,
}

/// Create a new game or reset the current one to the initial position.
///
/// # Endpoint
///
/// `POST /tools/create_or_reset_game`
///
/// # Response
///
/// - `200 OK`: `{ ok, status, moves, moves_detailed }`
pub async fn create_or_reset_game(State(state): State<AppState>) -> Json<ResetResponse> {
    let mut session = state.session.lock().await;
    session.reset();
    tracing::info!("game reset to the starting position");
    Json(ResetResponse {
        ok: true,
        status: session.status(),
        moves: session.move_list(),
        moves_detailed: session.moves().to_vec(),
    })
}

/// Get current position metadata.
///
/// # Endpoint
///
/// `GET /tools/get_status`
///
/// # Response
///
/// - `200 OK`: the full status snapshot, including the square-to-piece map
pub async fn get_status(State(state): State<AppState>) -> Json<StatusReport> {
    let session = state.session.lock().await;
    Json(session.status())
}

/// Request body carrying one coordinate move.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// Move in coordinate form, e.g. "e2e4" or "e7e8q".
    pub uci: String,
}

/// Response for `add_move`.
#[derive(Debug, Serialize)]
pub struct AddMoveResponse {
    /// True if the move was applied.
    pub accepted: bool,
    /// Snapshot after the call (unchanged when rejected).
    pub status: StatusReport,
    /// SAN of the accepted move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub san: Option<String>,
    /// Full history after the move (success only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moves_detailed: Option<Vec<MoveRecord>>,
    /// Rejection tag: "malformed_input", "illegal_move" or "game_over".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    /// On an illegal move, the side that was expected to move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_turn: Option<Side>,
}

/// Apply a move in coordinate (UCI) form if legal.
///
/// # Endpoint
///
/// `POST /tools/add_move` with body `{ "uci": "e2e4" }`
///
/// # Response
///
/// - `200 OK`, accepted: `{ accepted: true, san, status, moves, moves_detailed }`
/// - `200 OK`, rejected: `{ accepted: false, reason, expected_turn?, status }`
pub async fn add_move(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Json<AddMoveResponse> {
    let mut session = state.session.lock().await;
    match session.add_move(&request.uci) {
        Ok(san) => {
            tracing::info!(uci = %request.uci, san = %san, "move accepted");
            Json(AddMoveResponse {
                accepted: true,
                status: session.status(),
                san: Some(san),
                moves: Some(session.move_list()),
                moves_detailed: Some(session.moves().to_vec()),
                reason: None,
                expected_turn: None,
            })
        }
        Err(rejection) => {
            let reason = rejection.reason();
            tracing::debug!(uci = %request.uci, reason, "move rejected");
            let expected_turn = match rejection {
                MoveRejection::IllegalMove { expected_turn } => Some(expected_turn),
                _ => None,
            };
            Json(AddMoveResponse {
                accepted: false,
                status: session.status(),
                san: None,
                moves: None,
                moves_detailed: None,
                reason: Some(reason),
                expected_turn,
            })
        }
    }
}

/// Check if a coordinate move is legal in the current position.
///
/// # Endpoint
///
/// `POST /tools/is_legal` with body `{ "uci": "e2e4" }`
///
/// # Response
///
/// - `200 OK`: `{ legal }`, plus `parse_error` when the input did not parse
pub async fn is_legal(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Json<LegalReport> {
    let session = state.session.lock().await;
    Json(session.check_legal(&request.uci))
}

/// Return all moves played so far in coordinate form, oldest first.
///
/// # Endpoint
///
/// `GET /tools/list_moves`
pub async fn list_moves(State(state): State<AppState>) -> Json<Vec<String>> {
    let session = state.session.lock().await;
    Json(session.move_list())
}

/// Return the detailed move history: `{ ply, side, uci, san }` per entry.
///
/// # Endpoint
///
/// `GET /tools/list_moves_detailed`
pub async fn list_moves_detailed(State(state): State<AppState>) -> Json<Vec<MoveRecord>> {
    let session = state.session.lock().await;
    Json(session.moves().to_vec())
}

/// Query parameters for the last-moves tools.
#[derive(Debug, Deserialize)]
pub struct LastMovesQuery {
    /// How many trailing moves to return; defaults to 1.
    pub n: Option<i64>,
}

/// Return the last N moves in coordinate form, chronological order.
///
/// # Endpoint
///
/// `GET /tools/last_moves?n=1`
///
/// # Response
///
/// - `200 OK`: trailing moves; `n <= 0` yields an empty array and an
///   oversized `n` yields the whole history
pub async fn last_moves(
    State(state): State<AppState>,
    Query(query): Query<LastMovesQuery>,
) -> Json<Vec<String>> {
    let session = state.session.lock().await;
    Json(session.last_moves(query.n.unwrap_or(1)))
}

/// Detailed form of `last_moves`.
///
/// # Endpoint
///
/// `GET /tools/last_moves_detailed?n=1`
pub async fn last_moves_detailed(
    State(state): State<AppState>,
    Query(query): Query<LastMovesQuery>,
) -> Json<Vec<MoveRecord>> {
    let session = state.session.lock().await;
    Json(session.last_moves_detailed(query.n.unwrap_or(1)))
}

/// Return an ASCII rendering of the board from White's perspective.
///
/// Human-oriented; callers making decisions should use the `pieces` map
/// from `get_status` instead.
///
/// # Endpoint
///
/// `GET /tools/board_ascii`
pub async fn board_ascii(State(state): State<AppState>) -> String {
    let session = state.session.lock().await;
    session.ascii_board()
}
