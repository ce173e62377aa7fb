//! Single-game chess session core.
//!
//! This crate is the state machine behind the chess tool server:
//! - [`GameSession`] owns the one authoritative position and the move history
//! - [`RulesEngine`] abstracts the chess rules implementation
//! - [`StandardRules`] implements it on top of `shakmaty`
//! - [`StatusReport`] is the full derived status snapshot
//!
//! The session never inspects positions itself; everything it reports is
//! derived through the rules engine, so the core stays testable regardless
//! of which rules backend is linked.

mod mov;
mod rules;
mod session;
mod side;
mod status;

pub use mov::{CoordinateMove, ParseMoveError};
pub use rules::{EndReason, GameOutcome, GameResult, InvalidFen, RulesEngine, StandardRules};
pub use session::{GameSession, LegalReport, MoveRecord, MoveRejection};
pub use side::Side;
pub use status::StatusReport;
