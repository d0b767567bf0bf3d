//! Retrograde capacity check.
//!
//! Frozen boxes are turned into walls. The targets they do not occupy are then
//! re-analysed backwards with those walls in place, and the mobile boxes must
//! still be assignable one-to-one to the remaining targets.

use sokofess_engine::{BoxGrid, Position, State};

use crate::{
    deadlock::{freeze::is_frozen, matching},
    level_analysis::LevelAnalysis,
    push_reach::pull_region,
};

pub(super) fn detect(level: &LevelAnalysis, state: &State, grid: &BoxGrid) -> bool {
    let board = level.board();
    let (frozen, mobile): (Vec<Position>, Vec<Position>) = state
        .boxes()
        .iter()
        .partition(|b| is_frozen(level, grid, **b));
    if frozen.is_empty() {
        return false;
    }
    if frozen.iter().any(|b| !board.is_target(*b)) {
        return true;
    }

    let targets: Vec<Position> = board
        .targets()
        .iter()
        .copied()
        .filter(|t| !frozen.contains(t))
        .collect();
    let regions: Vec<Vec<bool>> = targets
        .iter()
        .map(|t| pull_region(board, *t, |p| frozen.contains(&p)))
        .collect();
    !matching::has_perfect_matching(&mobile, targets.len(), |b, t| {
        regions[t][board.index(b)]
    })
}
