//! Corral deadlocks.
//!
//! A corral is a component of free squares the player cannot walk into. It
//! still needs work when it holds an empty target or is fenced by a box off
//! target. If none of the fence boxes can be pushed from where the player
//! stands, the corral is treated as dead. Pushing some unrelated box may open
//! the fence later, so this is a heuristic that can prune solvable states.

use sokofess_engine::{Board, BoxGrid, Direction, Position, Reachability, State};

use crate::level_analysis::LevelAnalysis;

pub(super) fn detect(level: &LevelAnalysis, state: &State, grid: &BoxGrid) -> bool {
    let board = level.board();
    let reach = Reachability::compute(board, state);
    let mut seen = vec![false; board.len()];

    for start in board.floor_squares() {
        if seen[board.index(start)] || reach.contains(start) || grid.has_box(start) {
            continue;
        }
        seen[board.index(start)] = true;
        let mut corral = vec![start];
        let mut fence: Vec<Position> = vec![];
        let mut i = 0;
        while i < corral.len() {
            let pos = corral[i];
            i += 1;
            for dir in Direction::ALL {
                let Some(next) = board.open_neighbor(pos, dir) else {
                    continue;
                };
                if grid.has_box(next) {
                    if !fence.contains(&next) {
                        fence.push(next);
                    }
                } else if !seen[board.index(next)] {
                    seen[board.index(next)] = true;
                    corral.push(next);
                }
            }
        }

        let needs_work = corral.iter().any(|p| board.is_target(*p))
            || fence.iter().any(|b| !board.is_target(*b));
        if needs_work && !fence.iter().any(|b| can_push(board, grid, &reach, *b)) {
            return true;
        }
    }
    false
}

fn can_push(
    board: &Board,
    grid: &BoxGrid,
    reach: &Reachability,
    box_pos: Position,
) -> bool {
    Direction::ALL.into_iter().any(|dir| {
        box_pos.step(dir.reverse()).is_some_and(|p| reach.contains(p))
            && box_pos.step(dir).is_some_and(|p| grid.is_free(board, p))
    })
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
    fn test_sealed_target_room() {
        // the fence box has its twin behind it and the corral ahead
        assert!(check(
            r"
            ########
            #@$$-..#
            ########
            "
        ));
    }

    #[test]
    fn test_pushable_fence_is_fine() {
        assert!(!check(
            r"
            #######
            #@-$-.#
            #######
            "
        ));
    }
}
