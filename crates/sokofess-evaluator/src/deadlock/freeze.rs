//! Freeze deadlocks.
//!
//! A box is blocked along an axis when a wall is on either side, when both
//! sides are dead squares, or when a neighbouring box on that axis is itself
//! frozen. While a neighbour is checked the box that led to it counts as a
//! wall, which resolves mutually blocking clusters. A box blocked along both
//! axes is frozen; a frozen box off target is a deadlock.

use sokofess_engine::{BoxGrid, Direction, Position, State};

use crate::level_analysis::LevelAnalysis;

/// Upper bound on neighbour checks per query; exceeding it answers "not
/// frozen".
const MAX_VISITS: usize = 512;

pub(super) fn detect(level: &LevelAnalysis, state: &State, grid: &BoxGrid) -> bool {
    let board = level.board();
    state
        .boxes()
        .iter()
        .filter(|b| !board.is_target(**b))
        .any(|b| is_frozen(level, grid, *b))
}

/// The box at `pos` can never be pushed again.
pub(super) fn is_frozen(level: &LevelAnalysis, grid: &BoxGrid, pos: Position) -> bool {
    let mut walls = vec![];
    let mut visits = 0;
    frozen(level, grid, pos, &mut walls, &mut visits)
}

fn frozen(
    level: &LevelAnalysis,
    grid: &BoxGrid,
    pos: Position,
    walls: &mut Vec<Position>,
    visits: &mut usize,
) -> bool {
    *visits += 1;
    if *visits > MAX_VISITS {
        return false;
    }
    walls.push(pos);
    let result = blocked(level, grid, pos, Direction::Left, walls, visits)
        && blocked(level, grid, pos, Direction::Up, walls, visits);
    walls.pop();
    result
}

fn blocked(
    level: &LevelAnalysis,
    grid: &BoxGrid,
    pos: Position,
    dir: Direction,
    walls: &mut Vec<Position>,
    visits: &mut usize,
) -> bool {
    let board = level.board();
    let sides = [pos.step(dir), pos.step(dir.reverse())];
    let is_wall = |side: Option<Position>| {
        side.is_none_or(|p| board.is_wall(p) || walls.contains(&p))
    };
    if sides.iter().any(|s| is_wall(*s)) {
        return true;
    }
    let push_reach = level.push_reach();
    if sides
        .iter()
        .flatten()
        .all(|p| push_reach.is_dead_square(board, *p))
    {
        return true;
    }
    sides
        .into_iter()
        .flatten()
        .any(|p| grid.has_box(p) && frozen(level, grid, p, walls, visits))
}

#[cfg(test)]
mod tests {
    use sokofess_engine::Level;

    use super::*;

    fn check(art: &str) -> bool {
        let level = Level::from_ascii(art).unwrap();
        let analysis = LevelAnalysis::new(&level);
        let state = level.initial_state();
        detect(&analysis, state, &state.box_grid(level.board()))
    }

    #[test]
    fn test_chain_of_boxes_freeze_each_other() {
        assert!(check(
            r"
            ########
            #--#---#
            #--$$--#
            #-@-$#-#
            #-...--#
            ########
            "
        ));
    }

    #[test]
    fn test_boxes_on_targets_do_not_count() {
        assert!(!check(
            r"
            #######
            #-**--#
            #-@---#
            #######
            "
        ));
    }

    #[test]
    fn test_box_free_on_one_axis_is_not_frozen() {
        assert!(!check(
            r"
            #######
            #-----#
            #-@$-.#
            #-----#
            #######
            "
        ));
    }
}
