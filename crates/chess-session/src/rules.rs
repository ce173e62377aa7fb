//! Rules engine abstraction.
//!
//! The session delegates all chess legality to a [`RulesEngine`], so the
//! session core stays independent of which concrete rules implementation is
//! linked. [`StandardRules`] is the production implementation, backed by
//! `shakmaty`.

use crate::{CoordinateMove, Side};
use serde::{Deserialize, Serialize};
use shakmaty::fen::Fen;
use shakmaty::san::SanPlus;
use shakmaty::uci::Uci;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Piece, Position, Rank, Role, Square};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

/// The rule that ended a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    ThreefoldRepetition,
}

/// Terminal result plus the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOutcome {
    pub result: GameResult,
    pub reason: EndReason,
}

impl GameOutcome {
    pub(crate) const fn draw(reason: EndReason) -> Self {
        GameOutcome {
            result: GameResult::Draw,
            reason,
        }
    }
}

/// Error returned when a FEN string cannot be turned into a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid FEN: {0}")]
pub struct InvalidFen(pub String);

/// Capability surface the session needs from a chess rules implementation.
pub trait RulesEngine {
    /// The position representation this engine works on.
    type Position: Clone + fmt::Debug + Send + Sync;

    /// Returns the standard starting position.
    fn initial_position(&self) -> Self::Position;

    /// Parses a full position notation (FEN) string into a position.
    fn position_from_fen(&self, fen: &str) -> Result<Self::Position, InvalidFen>;

    /// Enumerates all legal moves in coordinate form.
    fn legal_moves(&self, position: &Self::Position) -> Vec<CoordinateMove>;

    /// Returns true if the coordinate move is legal in the position.
    fn is_legal(&self, position: &Self::Position, mv: &CoordinateMove) -> bool {
        self.apply_move(position, mv).is_some()
    }

    /// Applies a legal move, returning the resulting position and the move's
    /// short algebraic notation relative to `position`. Returns `None` if
    /// the move is not legal.
    fn apply_move(
        &self,
        position: &Self::Position,
        mv: &CoordinateMove,
    ) -> Option<(Self::Position, String)>;

    /// The side to move.
    fn side_to_move(&self, position: &Self::Position) -> Side;

    /// True if the side to move is in check.
    fn is_check(&self, position: &Self::Position) -> bool;

    /// Terminal result detectable from the position alone (checkmate,
    /// stalemate, insufficient material). Move-rule and repetition draws
    /// need history and clocks; the session derives those itself.
    fn outcome(&self, position: &Self::Position) -> Option<GameOutcome>;

    /// Plies since the last capture or pawn move.
    fn halfmove_clock(&self, position: &Self::Position) -> u32;

    /// Current fullmove number (starts at 1).
    fn fullmove_number(&self, position: &Self::Position) -> u32;

    /// Complete FEN for the position.
    fn fen(&self, position: &Self::Position) -> String;

    /// The part of the position that matters for repetition detection:
    /// placement, side to move, castling rights and en-passant target.
    fn repetition_key(&self, position: &Self::Position) -> String {
        let fen = self.fen(position);
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    /// Every occupied square mapped to its FEN piece letter.
    fn piece_map(&self, position: &Self::Position) -> BTreeMap<String, String>;

    /// Human-oriented board rendering, ranks 8 down to 1.
    fn ascii_board(&self, position: &Self::Position) -> String;
}

/// Standard chess rules backed by `shakmaty`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RulesEngine for StandardRules {
    type Position = Chess;

    fn initial_position(&self) -> Chess {
        Chess::new()
    }

    fn position_from_fen(&self, fen: &str) -> Result<Chess, InvalidFen> {
        fen.parse::<Fen>()
            .map_err(|e| InvalidFen(e.to_string()))?
            .into_position(CastlingMode::Standard)
            .map_err(|e| InvalidFen(e.to_string()))
    }

    fn legal_moves(&self, position: &Chess) -> Vec<CoordinateMove> {
        position
            .legal_moves()
            .iter()
            .filter_map(|m| match m.to_uci(CastlingMode::Standard) {
                Uci::Normal {
                    from,
                    to,
                    promotion,
                } => Some(CoordinateMove {
                    from,
                    to,
                    promotion,
                }),
                _ => None,
            })
            .collect()
    }

    fn is_legal(&self, position: &Chess, mv: &CoordinateMove) -> bool {
        mv.to_uci().to_move(position).is_ok()
    }

    fn apply_move(&self, position: &Chess, mv: &CoordinateMove) -> Option<(Chess, String)> {
        let m = mv.to_uci().to_move(position).ok()?;
        let san = SanPlus::from_move(position.clone(), &m).to_string();
        let mut next = position.clone();
        next.play_unchecked(&m);
        Some((next, san))
    }

    fn side_to_move(&self, position: &Chess) -> Side {
        position.turn().into()
    }

    fn is_check(&self, position: &Chess) -> bool {
        position.is_check()
    }

    fn outcome(&self, position: &Chess) -> Option<GameOutcome> {
        if position.is_checkmate() {
            let result = match position.turn() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            };
            Some(GameOutcome {
                result,
                reason: EndReason::Checkmate,
            })
        } else if position.is_stalemate() {
            Some(GameOutcome::draw(EndReason::Stalemate))
        } else if position.is_insufficient_material() {
            Some(GameOutcome::draw(EndReason::InsufficientMaterial))
        } else {
            None
        }
    }

    fn halfmove_clock(&self, position: &Chess) -> u32 {
        position.halfmoves()
    }

    fn fullmove_number(&self, position: &Chess) -> u32 {
        position.fullmoves().get()
    }

    fn fen(&self, position: &Chess) -> String {
        Fen::from_position(position.clone(), EnPassantMode::Always).to_string()
    }

    fn repetition_key(&self, position: &Chess) -> String {
        // EnPassantMode::Legal so a phantom en-passant target does not make
        // otherwise identical positions count as different.
        let fen = Fen::from_position(position.clone(), EnPassantMode::Legal).to_string();
        fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
    }

    fn piece_map(&self, position: &Chess) -> BTreeMap<String, String> {
        let board = position.board();
        let mut pieces = BTreeMap::new();
        for square in Square::ALL {
            if let Some(piece) = board.piece_at(square) {
                pieces.insert(square.to_string(), fen_char(piece).to_string());
            }
        }
        pieces
    }

    fn ascii_board(&self, position: &Chess) -> String {
        let board = position.board();
        let mut out = String::new();
        for rank in Rank::ALL.iter().rev() {
            for file in File::ALL {
                if file != File::A {
                    out.push(' ');
                }
                match board.piece_at(Square::from_coords(file, *rank)) {
                    Some(piece) => out.push(fen_char(piece)),
                    None => out.push('.'),
                }
            }
            if *rank != Rank::First {
                out.push('\n');
            }
        }
        out
    }
}

/// FEN letter for a piece: uppercase for white, lowercase for black.
fn fen_char(piece: Piece) -> char {
    let ch = match piece.role {
        Role::Pawn => 'p',
        Role::Knight => 'n',
        Role::Bishop => 'b',
        Role::Rook => 'r',
        Role::Queen => 'q',
        Role::King => 'k',
    };
    if piece.color.is_white() {
        ch.to_ascii_uppercase()
    } else {
        ch
    }
}
