//! Feature space search (FESS) for Sokoban.
//!
//! [`FessSolver`] ties the pieces together:
//!
//! - [`advisor`] - seven advisors recommending moves that improve one metric
//! - [`weight`] - the 0:1 weight scheme and move selection
//! - [`feature_space`] - cells keyed by feature vector and the cyclic picker
//! - [`tree`] - the arena-backed search tree
//!
//! ```
//! use sokofess_engine::Level;
//! use sokofess_search::{FessSolver, SolverConfig};
//!
//! let level = Level::from_ascii("#@$.#").unwrap();
//! let mut solver = FessSolver::new(&level, SolverConfig::default());
//! let outcome = solver.solve();
//! assert!(outcome.is_solved());
//! assert_eq!(outcome.moves[0].to_string(), "(C,1)-(D,1)");
//! ```

pub use self::{
    advisor::{Advisor, Recommendation},
    candidate::SimulatedMove,
    config::{ConfigError, SolverConfig},
    fess::{FessSolver, ProgressCallback},
    statistics::{SearchOutcome, SearchProgress, SearchStatistics, SearchStatus},
    weight::{WeightedMove, assign_weights, select_best},
};

pub mod advisor;
mod candidate;
mod config;
pub mod feature_space;
mod fess;
mod statistics;
pub mod tree;
pub mod weight;
