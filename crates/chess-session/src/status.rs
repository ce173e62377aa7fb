//! Status snapshot derivation.
//!
//! Nothing here is stored: the whole report is recomputed from the current
//! position and history on every call, so there is no independent state to
//! keep consistent.

use crate::rules::{EndReason, GameResult, RulesEngine};
use crate::session::GameSession;
use crate::Side;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything a caller can observe about the current game.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Complete position in Forsyth-Edwards Notation.
    pub fen: String,
    pub side_to_move: Side,
    pub fullmove_number: u32,
    pub halfmove_clock: u32,
    /// Number of half-moves played since the last reset.
    pub ply_count: usize,
    /// Castling availability as written in the FEN ("KQkq", "-", ...).
    pub castling_rights: String,
    /// En-passant target square as written in the FEN, "-" when none.
    pub en_passant_square: String,
    /// Coordinate form of the last move, absent before the first move.
    pub last_move_uci: Option<String>,
    /// SAN of the last move, absent before the first move.
    pub last_move_san: Option<String>,
    pub who_moved_last: Option<Side>,
    /// True if the side to move is currently in check.
    pub is_check: bool,
    pub is_game_over: bool,
    /// Only present once the game has ended.
    pub result: Option<GameResult>,
    /// Only present once the game has ended.
    pub reason: Option<EndReason>,
    /// Every occupied square mapped to its FEN piece letter, so callers
    /// never have to parse the FEN to know piece placement.
    pub pieces: BTreeMap<String, String>,
}

impl<R: RulesEngine> GameSession<R> {
    /// Builds the full status snapshot for the current position.
    pub fn status(&self) -> StatusReport {
        let rules = self.rules();
        let position = self.position();
        let fen = rules.fen(position);
        let (castling_rights, en_passant_square) = {
            // FEN fields: placement, turn, castling, en passant, clocks.
            let mut fields = fen.split_whitespace().skip(2);
            (
                fields.next().unwrap_or("-").to_string(),
                fields.next().unwrap_or("-").to_string(),
            )
        };
        let last = self.moves().last();
        let outcome = self.outcome();
        StatusReport {
            side_to_move: rules.side_to_move(position),
            fullmove_number: rules.fullmove_number(position),
            halfmove_clock: rules.halfmove_clock(position),
            ply_count: self.ply_count(),
            castling_rights,
            en_passant_square,
            last_move_uci: last.map(|m| m.uci.clone()),
            last_move_san: last.map(|m| m.san.clone()),
            who_moved_last: last.map(|m| m.side),
            is_check: rules.is_check(position),
            is_game_over: outcome.is_some(),
            result: outcome.map(|o| o.result),
            reason: outcome.map(|o| o.reason),
            pieces: rules.piece_map(position),
            fen,
        }
    }
}
