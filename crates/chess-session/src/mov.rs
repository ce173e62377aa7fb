//! Coordinate-form move representation and parsing.

use shakmaty::uci::Uci;
use shakmaty::{Role, Square};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for coordinate move parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseMoveError {
    /// The string is not valid coordinate-move syntax.
    #[error("invalid coordinate move {0:?}: expected from-square, to-square and an optional promotion letter")]
    Syntax(String),
    /// The string parsed, but not as a plain from/to move (null or drop move).
    #[error("{0:?} is not a from/to coordinate move")]
    NotFromTo(String),
}

/// A move in coordinate form: source square, destination square, optional
/// promotion piece. Carries no legality information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoordinateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl CoordinateMove {
    /// Returns the UCI form of this move.
    pub fn to_uci(&self) -> Uci {
        Uci::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl FromStr for CoordinateMove {
    type Err = ParseMoveError;

    /// Parses text like "e2e4" or "e7e8q". Surrounding whitespace is
    /// ignored and letters are case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match Uci::from_str(&normalized) {
            Ok(Uci::Normal {
                from,
                to,
                promotion,
            }) => Ok(CoordinateMove {
                from,
                to,
                promotion,
            }),
            Ok(_) => Err(ParseMoveError::NotFromTo(s.trim().to_string())),
            Err(_) => Err(ParseMoveError::Syntax(s.trim().to_string())),
        }
    }
}

impl fmt::Display for CoordinateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
