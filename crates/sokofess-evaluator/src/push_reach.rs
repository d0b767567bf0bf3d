//! Lone-box push reachability, computed backwards by pulling from targets.

use std::collections::VecDeque;

use sokofess_engine::{Board, Direction, Position};

/// Squares from which a box alone on the board can be pushed onto `target`,
/// with squares for which `blocked` holds acting as walls.
///
/// Player access between pushes is not modelled, so the region is a superset
/// of the truly reachable squares. That keeps every "unreachable" verdict
/// derived from it sound.
#[must_use]
pub fn pull_region<F>(board: &Board, target: Position, blocked: F) -> Vec<bool>
where
    F: Fn(Position) -> bool,
{
    let mut region = vec![false; board.len()];
    if !board.is_floor(target) {
        return region;
    }
    let open = |pos: Position| board.is_floor(pos) && !blocked(pos);
    region[board.index(target)] = true;
    let mut queue = VecDeque::from([target]);
    while let Some(pos) = queue.pop_front() {
        for dir in Direction::ALL {
            // the box moves to `next`, the player backs off to `beyond`
            let Some(next) = pos.step(dir).filter(|p| open(*p)) else {
                continue;
            };
            if !next.step(dir).is_some_and(open) {
                continue;
            }
            let i = board.index(next);
            if !region[i] {
                region[i] = true;
                queue.push_back(next);
            }
        }
    }
    region
}

/// Per-target pull regions on the empty board plus the derived dead squares.
#[derive(Debug, Clone)]
pub struct PushReachTable {
    regions: Vec<Vec<bool>>,
    dead: Vec<bool>,
}

impl PushReachTable {
    #[must_use]
    pub fn new(board: &Board) -> Self {
        let regions: Vec<Vec<bool>> = board
            .targets()
            .iter()
            .map(|t| pull_region(board, *t, |_| false))
            .collect();
        let mut dead = vec![false; board.len()];
        for pos in board.floor_squares() {
            let i = board.index(pos);
            dead[i] = !regions.iter().any(|r| r[i]);
        }
        Self { regions, dead }
    }

    /// A box on `pos` can never reach any target.
    #[must_use]
    pub fn is_dead_square(&self, board: &Board, pos: Position) -> bool {
        board.contains(pos) && self.dead[board.index(pos)]
    }

    /// A lone box on `pos` can be pushed onto the `target_index`-th target.
    #[must_use]
    pub fn can_reach(&self, board: &Board, pos: Position, target_index: usize) -> bool {
        board.contains(pos) && self.regions[target_index][board.index(pos)]
    }

    #[must_use]
    pub fn dead_square_count(&self) -> usize {
        self.dead.iter().filter(|d| **d).count()
    }
}
