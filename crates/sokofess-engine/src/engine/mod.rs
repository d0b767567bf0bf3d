//! Moves on top of the board model.
//!
//! - [`MacroMove`] - one or more consecutive pushes of a single box, the edge
//!   type of the search tree
//! - [`MoveGenerator`] - enumerates the macro moves available in a state,
//!   chaining up to [`MoveGenerator::MAX_PUSHES`] pushes of the same box
//! - [`notation`] - `(col,row)` coordinate notation (`A..Z`, `AA`, ... and
//!   1-based rows)
//! - [`replay`] - player walking paths, LURD strings and solution checking
//!
//! Infeasibility is an ordinary return value ([`InfeasibleMove`]), never a
//! panic:
//!
//! ```
//! use sokofess_engine::{Level, MacroMove, Position, Direction};
//!
//! let level = Level::from_ascii("#@$.#").unwrap();
//! let push = MacroMove::from_pushes(Position::new(2, 0), &[Direction::Right]).unwrap();
//! let next = push.apply(level.board(), level.initial_state()).unwrap();
//! assert!(next.is_solved(level.board()));
//!
//! let blocked = MacroMove::from_pushes(Position::new(2, 0), &[Direction::Left]).unwrap();
//! assert!(blocked.apply(level.board(), level.initial_state()).is_err());
//! ```
//!
//! [`InfeasibleMove`]: crate::InfeasibleMove

pub use self::{macro_move::*, notation::*, replay::*};

mod macro_move;
pub mod notation;
pub mod replay;
