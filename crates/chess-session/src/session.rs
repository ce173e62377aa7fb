//! The game session: one authoritative position plus move history.

use crate::rules::{EndReason, GameOutcome, InvalidFen, RulesEngine, StandardRules};
use crate::{CoordinateMove, ParseMoveError, Side};
use serde::Serialize;
use thiserror::Error;

/// One accepted half-move. Immutable once appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveRecord {
    /// 1-based half-move index.
    pub ply: u32,
    /// Side that made the move.
    pub side: Side,
    /// The move in normalized coordinate (UCI) form.
    pub uci: String,
    /// Short algebraic notation, relative to the position before the move.
    pub san: String,
}

/// Why a move was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    /// The input does not parse as a coordinate move.
    #[error("malformed move input: {0}")]
    MalformedInput(#[from] ParseMoveError),
    /// The move parses but is not legal in the current position.
    #[error("illegal move; {expected_turn} is expected to move")]
    IllegalMove {
        /// The side whose turn it actually is.
        expected_turn: Side,
    },
    /// The game has already ended; no further moves are accepted.
    #[error("the game is already over")]
    GameOver,
}

impl MoveRejection {
    /// Machine-readable reason tag used in tool responses.
    pub fn reason(&self) -> &'static str {
        match self {
            MoveRejection::MalformedInput(_) => "malformed_input",
            MoveRejection::IllegalMove { .. } => "illegal_move",
            MoveRejection::GameOver => "game_over",
        }
    }
}

/// Outcome of a legality probe. Never an error: malformed input is simply
/// reported as not legal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegalReport {
    /// True if the move is legal in the current position.
    pub legal: bool,
    /// Present when the input did not parse as a coordinate move.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

/// A single chess game held in memory.
///
/// The session owns the authoritative position; everything callers can
/// observe (turn, check, termination, notation) is derived from it through
/// the injected [`RulesEngine`]. A move either fully applies or is rejected
/// with no state change.
#[derive(Debug, Clone)]
pub struct GameSession<R: RulesEngine = StandardRules> {
    rules: R,
    position: R::Position,
    moves: Vec<MoveRecord>,
    /// Repetition key of every position seen since the last reset,
    /// starting position included.
    seen_positions: Vec<String>,
    outcome: Option<GameOutcome>,
}

impl GameSession<StandardRules> {
    /// Creates a session at the standard starting position.
    pub fn new() -> Self {
        Self::with_rules(StandardRules)
    }

    /// Creates a session over an arbitrary FEN position.
    pub fn from_fen(fen: &str) -> Result<Self, InvalidFen> {
        let rules = StandardRules;
        let position = rules.position_from_fen(fen)?;
        let key = rules.repetition_key(&position);
        let mut session = GameSession {
            rules,
            position,
            moves: Vec::new(),
            seen_positions: vec![key],
            outcome: None,
        };
        session.refresh_outcome();
        Ok(session)
    }
}

impl Default for GameSession<StandardRules> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RulesEngine> GameSession<R> {
    /// Creates a session at the given rules engine's starting position.
    pub fn with_rules(rules: R) -> Self {
        let position = rules.initial_position();
        let key = rules.repetition_key(&position);
        GameSession {
            rules,
            position,
            moves: Vec::new(),
            seen_positions: vec![key],
            outcome: None,
        }
    }

    /// Resets to the starting position and clears the move history.
    /// Idempotent; repeated calls always yield the same state.
    pub fn reset(&mut self) {
        self.position = self.rules.initial_position();
        self.moves.clear();
        self.seen_positions.clear();
        self.seen_positions
            .push(self.rules.repetition_key(&self.position));
        self.outcome = None;
    }

    /// Returns the current position.
    pub fn position(&self) -> &R::Position {
        &self.position
    }

    /// Returns the rules engine in use.
    pub fn rules(&self) -> &R {
        &self.rules
    }

    /// Returns the accepted move history, oldest first.
    pub fn moves(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Number of half-moves applied since the last reset.
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }

    /// Returns the game outcome if the game has ended.
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    /// True if the game has ended.
    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Validates and applies a coordinate move.
    ///
    /// On success the position is replaced wholesale, a [`MoveRecord`] is
    /// appended and the accepted move's SAN is returned. Every rejection
    /// leaves position and history untouched.
    pub fn add_move(&mut self, input: &str) -> Result<String, MoveRejection> {
        let mv: CoordinateMove = input.parse()?;
        if self.outcome.is_some() {
            return Err(MoveRejection::GameOver);
        }
        let side = self.rules.side_to_move(&self.position);
        let (next, san) = self
            .rules
            .apply_move(&self.position, &mv)
            .ok_or(MoveRejection::IllegalMove {
                expected_turn: side,
            })?;
        self.moves.push(MoveRecord {
            ply: self.moves.len() as u32 + 1,
            side,
            uci: mv.to_string(),
            san: san.clone(),
        });
        self.position = next;
        self.seen_positions
            .push(self.rules.repetition_key(&self.position));
        self.refresh_outcome();
        Ok(san)
    }

    /// Probes whether a move would be legal, without touching state.
    pub fn check_legal(&self, input: &str) -> LegalReport {
        match input.parse::<CoordinateMove>() {
            Ok(mv) => LegalReport {
                legal: self.rules.is_legal(&self.position, &mv),
                parse_error: None,
            },
            Err(err) => LegalReport {
                legal: false,
                parse_error: Some(err.to_string()),
            },
        }
    }

    /// All accepted moves in coordinate form, oldest first.
    pub fn move_list(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.uci.clone()).collect()
    }

    /// The final `n` moves in coordinate form, in chronological order.
    /// `n <= 0` yields nothing; an oversized `n` yields the whole history.
    pub fn last_moves(&self, n: i64) -> Vec<String> {
        self.tail(n).iter().map(|m| m.uci.clone()).collect()
    }

    /// Detailed form of [`last_moves`](Self::last_moves).
    pub fn last_moves_detailed(&self, n: i64) -> Vec<MoveRecord> {
        self.tail(n).to_vec()
    }

    fn tail(&self, n: i64) -> &[MoveRecord] {
        if n <= 0 {
            return &[];
        }
        let keep = (n as usize).min(self.moves.len());
        &self.moves[self.moves.len() - keep..]
    }

    /// Human-oriented board rendering from White's perspective.
    pub fn ascii_board(&self) -> String {
        self.rules.ascii_board(&self.position)
    }

    /// How many times the current position has occurred since the reset.
    pub fn position_count(&self) -> usize {
        let current = self.rules.repetition_key(&self.position);
        self.seen_positions.iter().filter(|k| **k == current).count()
    }

    /// Re-derives the terminal flag after a position change.
    ///
    /// Checkmate, stalemate and insufficient material come from the rules
    /// engine; the move-rule and repetition draws need the halfmove clock
    /// and the position history.
    fn refresh_outcome(&mut self) {
        if let Some(outcome) = self.rules.outcome(&self.position) {
            self.outcome = Some(outcome);
            return;
        }
        if self.rules.halfmove_clock(&self.position) >= 100 {
            self.outcome = Some(GameOutcome::draw(EndReason::FiftyMoveRule));
            return;
        }
        if self.position_count() >= 3 {
            self.outcome = Some(GameOutcome::draw(EndReason::ThreefoldRepetition));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::GameResult;
    use proptest::prelude::*;

    #[test]
    fn new_session() {
        let session = GameSession::new();
        assert_eq!(session.ply_count(), 0);
        assert!(!session.is_game_over());
        assert!(session.moves().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut session = GameSession::new();
        session.add_move("e2e4").unwrap();
        session.reset();
        let once = session.status();
        session.reset();
        let twice = session.status();
        assert_eq!(once.fen, twice.fen);
        assert_eq!(session.ply_count(), 0);
        assert!(once.last_move_uci.is_none());
    }

    #[test]
    fn starting_fen_round_trips() {
        let session = GameSession::new();
        let fen = session.status().fen;
        assert_eq!(fen, "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
        let reparsed = GameSession::from_fen(&fen).unwrap();
        assert_eq!(reparsed.status().fen, fen);
    }

    #[test]
    fn add_move_alternates_sides() {
        let mut session = GameSession::new();
        assert_eq!(session.add_move("e2e4").unwrap(), "e4");
        assert_eq!(session.status().side_to_move, Side::Black);
        assert_eq!(session.status().last_move_uci.as_deref(), Some("e2e4"));
        assert_eq!(session.add_move("e7e5").unwrap(), "e5");
        assert_eq!(session.status().side_to_move, Side::White);
        assert_eq!(session.moves()[0].side, Side::White);
        assert_eq!(session.moves()[1].side, Side::Black);
    }

    #[test]
    fn input_is_normalized() {
        let mut session = GameSession::new();
        session.add_move("  E2E4 ").unwrap();
        assert_eq!(session.move_list(), ["e2e4"]);
    }

    #[test]
    fn illegal_move_reports_expected_turn() {
        let mut session = GameSession::new();
        let before = session.status();
        let err = session.add_move("e2e5").unwrap_err();
        assert_eq!(
            err,
            MoveRejection::IllegalMove {
                expected_turn: Side::White
            }
        );
        let after = session.status();
        assert_eq!(before.fen, after.fen);
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn wrong_side_move_reports_expected_turn() {
        let mut session = GameSession::new();
        session.add_move("e2e4").unwrap();
        let err = session.add_move("d2d4").unwrap_err();
        assert_eq!(
            err,
            MoveRejection::IllegalMove {
                expected_turn: Side::Black
            }
        );
        assert_eq!(session.move_list(), ["e2e4"]);
    }

    #[test]
    fn malformed_moves_are_rejected_without_state_change() {
        let mut session = GameSession::new();
        for input in ["", "e2", "e2e9", "i2i4", "e7e8x", "0000"] {
            let err = session.add_move(input).unwrap_err();
            assert!(
                matches!(err, MoveRejection::MalformedInput(_)),
                "input {input:?}"
            );
        }
        assert_eq!(session.ply_count(), 0);
    }

    #[test]
    fn fools_mate_is_checkmate() {
        let mut session = GameSession::new();
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            session.add_move(uci).unwrap();
        }
        let status = session.status();
        assert!(status.is_game_over);
        assert_eq!(status.result, Some(GameResult::BlackWins));
        assert_eq!(status.reason, Some(EndReason::Checkmate));
        assert_eq!(session.moves().last().unwrap().san, "Qh4#");

        // Terminal flag set: nothing else is accepted, nothing changes.
        assert_eq!(session.add_move("a2a3").unwrap_err(), MoveRejection::GameOver);
        assert_eq!(session.ply_count(), 4);
    }

    #[test]
    fn stalemate_from_fen() {
        let session = GameSession::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(session.is_game_over());
        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.result, GameResult::Draw);
        assert_eq!(outcome.reason, EndReason::Stalemate);
    }

    #[test]
    fn insufficient_material_from_fen() {
        let session = GameSession::from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1").unwrap();
        assert!(session.is_game_over());
        assert_eq!(
            session.outcome().unwrap().reason,
            EndReason::InsufficientMaterial
        );
    }

    #[test]
    fn fifty_move_rule_ends_game() {
        let mut session = GameSession::from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 1").unwrap();
        assert!(!session.is_game_over());
        session.add_move("a1a2").unwrap();
        assert!(session.is_game_over());
        assert_eq!(session.outcome().unwrap().reason, EndReason::FiftyMoveRule);
    }

    #[test]
    fn threefold_repetition_ends_game() {
        let mut session = GameSession::new();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for uci in shuffle {
            session.add_move(uci).unwrap();
        }
        // Starting position seen twice now.
        assert_eq!(session.position_count(), 2);
        assert!(!session.is_game_over());

        for uci in shuffle {
            session.add_move(uci).unwrap();
        }
        assert_eq!(session.position_count(), 3);
        assert!(session.is_game_over());
        assert_eq!(
            session.outcome().unwrap().reason,
            EndReason::ThreefoldRepetition
        );
    }

    #[test]
    fn promotion_produces_a_queen() {
        let mut session = GameSession::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let san = session.add_move("e7e8q").unwrap();
        assert_eq!(san, "e8=Q");
        let pieces = session.status().pieces;
        assert_eq!(pieces.get("e8").map(String::as_str), Some("Q"));
        assert!(!pieces.contains_key("e7"));
    }

    #[test]
    fn last_moves_windows() {
        let mut session = GameSession::new();
        for uci in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            session.add_move(uci).unwrap();
        }
        assert_eq!(session.last_moves(2), ["g1f3", "b8c6"]);
        assert_eq!(session.last_moves(99), session.move_list());
        assert!(session.last_moves(0).is_empty());
        assert!(session.last_moves(-5).is_empty());

        let detailed = session.last_moves_detailed(1);
        assert_eq!(detailed.len(), 1);
        assert_eq!(detailed[0].ply, 4);
        assert_eq!(detailed[0].side, Side::Black);
        assert_eq!(detailed[0].uci, "b8c6");
    }

    #[test]
    fn check_legal_never_fails() {
        let session = GameSession::new();
        assert!(session.check_legal("e2e4").legal);

        let probe = session.check_legal("e2e5");
        assert!(!probe.legal);
        assert!(probe.parse_error.is_none());

        let malformed = session.check_legal("not-a-move");
        assert!(!malformed.legal);
        assert!(malformed.parse_error.is_some());
    }

    proptest! {
        #[test]
        fn random_games_keep_history_consistent(picks in prop::collection::vec(any::<u16>(), 0..60)) {
            let rules = StandardRules;
            let mut session = GameSession::new();
            let mut accepted = 0usize;
            for pick in picks {
                if session.is_game_over() {
                    break;
                }
                let legal = rules.legal_moves(session.position());
                prop_assert!(!legal.is_empty());
                let mv = legal[pick as usize % legal.len()];
                session.add_move(&mv.to_string()).unwrap();
                accepted += 1;
            }
            prop_assert_eq!(session.ply_count(), accepted);
            for (idx, record) in session.moves().iter().enumerate() {
                let expected = if idx % 2 == 0 { Side::White } else { Side::Black };
                prop_assert_eq!(record.side, expected);
                prop_assert_eq!(record.ply as usize, idx + 1);
            }
        }
    }
}
