//! Dead-state detection.
//!
//! Five independent techniques, any of which proves that a state can no
//! longer be solved:
//!
//! 1. [`DeadlockTechnique::Pattern`] - boxes on dead squares and 2x2 blocks of
//!    walls and boxes
//! 2. [`DeadlockTechnique::Freeze`] - a box off target that can never move
//!    along either axis
//! 3. [`DeadlockTechnique::Corral`] - a region the player cannot enter whose
//!    boundary boxes cannot be pushed
//! 4. [`DeadlockTechnique::Matching`] - no perfect assignment of boxes to
//!    targets they can reach
//! 5. [`DeadlockTechnique::Retrograde`] - after turning frozen boxes into walls
//!    the remaining boxes cannot fill the remaining targets
//!
//! Techniques 1 and 2 never report a solvable state, which is why
//! [`DeadlockMode::Conservative`] (the default) runs only those. Corral
//! detection is a heuristic and may prune solvable branches, so the full set
//! is an explicit opt-in through [`DeadlockMode::Aggressive`].

use serde::{Deserialize, Serialize};
use sokofess_engine::{BoxGrid, State};

use crate::level_analysis::LevelAnalysis;

mod corral;
mod freeze;
mod matching;
mod pattern;
mod retrograde;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum DeadlockMode {
    /// Static patterns and freeze detection.
    #[default]
    #[display("conservative")]
    Conservative,
    /// All five techniques.
    #[display("aggressive")]
    Aggressive,
}

impl DeadlockMode {
    #[must_use]
    pub fn techniques(self) -> &'static [DeadlockTechnique] {
        match self {
            Self::Conservative => &[DeadlockTechnique::Pattern, DeadlockTechnique::Freeze],
            Self::Aggressive => &DeadlockTechnique::ALL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum DeadlockTechnique {
    #[display("pattern")]
    Pattern,
    #[display("freeze")]
    Freeze,
    #[display("corral")]
    Corral,
    #[display("matching")]
    Matching,
    #[display("retrograde")]
    Retrograde,
}

impl DeadlockTechnique {
    pub const ALL: [Self; 5] = [
        Self::Pattern,
        Self::Freeze,
        Self::Corral,
        Self::Matching,
        Self::Retrograde,
    ];

    fn detect(self, level: &LevelAnalysis, state: &State, grid: &BoxGrid) -> bool {
        match self {
            Self::Pattern => pattern::detect(level, state, grid),
            Self::Freeze => freeze::detect(level, state, grid),
            Self::Corral => corral::detect(level, state, grid),
            Self::Matching => matching::detect(level, state),
            Self::Retrograde => retrograde::detect(level, state, grid),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DeadlockDetector<'a> {
    level: &'a LevelAnalysis,
    mode: DeadlockMode,
}

impl<'a> DeadlockDetector<'a> {
    #[must_use]
    pub fn new(level: &'a LevelAnalysis, mode: DeadlockMode) -> Self {
        Self { level, mode }
    }

    #[must_use]
    pub fn mode(&self) -> DeadlockMode {
        self.mode
    }

    #[must_use]
    pub fn is_deadlocked(&self, state: &State) -> bool {
        self.detect(state).is_some()
    }

    /// First technique, in [`DeadlockTechnique::ALL`] order, that proves
    /// `state` dead.
    #[must_use]
    pub fn detect(&self, state: &State) -> Option<DeadlockTechnique> {
        let board = self.level.board();
        if state.is_solved(board) {
            return None;
        }
        let grid = state.box_grid(board);
        self.mode
            .techniques()
            .iter()
            .copied()
            .find(|technique| technique.detect(self.level, state, &grid))
    }
}
