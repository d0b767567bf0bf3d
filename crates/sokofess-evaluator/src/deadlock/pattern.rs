//! Static patterns: a box off target on a dead square, or a 2x2 window made
//! only of walls and boxes with at least one box off target.

use sokofess_engine::{BoxGrid, Position, State};

use crate::level_analysis::LevelAnalysis;

pub(super) fn detect(level: &LevelAnalysis, state: &State, grid: &BoxGrid) -> bool {
    let board = level.board();
    let push_reach = level.push_reach();
    if state
        .boxes()
        .iter()
        .any(|b| !board.is_target(*b) && push_reach.is_dead_square(board, *b))
    {
        return true;
    }

    state.boxes().iter().any(|b| {
        // the four windows containing `b`
        [(0, 0), (1, 0), (0, 1), (1, 1)].into_iter().any(|(dx, dy)| {
            let (Some(x0), Some(y0)) = (b.x.checked_sub(dx), b.y.checked_sub(dy)) else {
                return false;
            };
            let window = [
                Position::new(x0, y0),
                Position::new(x0 + 1, y0),
                Position::new(x0, y0 + 1),
                Position::new(x0 + 1, y0 + 1),
            ];
            window
                .iter()
                .all(|p| board.is_wall(*p) || grid.has_box(*p))
                && window
                    .iter()
                    .any(|p| grid.has_box(*p) && !board.is_target(*p))
        })
    })
}
