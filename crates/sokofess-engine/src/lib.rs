//! Sokoban board model for the feature-space solver.
//!
//! - [`core`] holds the static level geometry ([`Board`], [`Level`]), coordinates
//!   ([`Position`], [`Direction`]) and the immutable [`State`] with its player
//!   [`Reachability`].
//! - [`engine`] holds the macro-move abstraction ([`MacroMove`]), move generation,
//!   coordinate notation and solution replay.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// Reason a macro move could not be realized on a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum InfeasibleMove {
    #[display("no box at {_0}")]
    NoBoxAtStart(#[error(not(source))] Position),
    #[display("box at {_0} cannot be pushed off the board")]
    OutOfBounds(#[error(not(source))] Position),
    #[display("push destination {_0} is blocked")]
    Blocked(#[error(not(source))] Position),
    #[display("player cannot reach {_0} to push")]
    PlayerUnreachable(#[error(not(source))] Position),
    #[display("box ended at {actual} instead of {expected}")]
    WrongDestination { expected: Position, actual: Position },
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum LevelParseError {
    #[display("level is empty")]
    Empty,
    #[display("unexpected character {_0:?} at ({_1}, {_2})")]
    UnexpectedChar(#[error(not(source))] char, usize, usize),
    #[display("level has no player")]
    NoPlayer,
    #[display("level has more than one player")]
    MultiplePlayers,
    #[display("level is too large ({_0}x{_1})")]
    TooLarge(#[error(not(source))] usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid notation {_0:?}")]
pub struct NotationError(#[error(not(source))] pub String);
