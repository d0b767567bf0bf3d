use serde::{Deserialize, Serialize};

use super::{Board, Direction, Position};

/// Player position plus box positions.
///
/// States are never mutated once built: applying a move produces a new state.
/// Boxes are kept sorted so that equal box sets compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    player: Position,
    boxes: Vec<Position>,
}

impl State {
    #[must_use]
    pub fn new(player: Position, mut boxes: Vec<Position>) -> Self {
        boxes.sort_unstable();
        boxes.dedup();
        Self { player, boxes }
    }

    #[must_use]
    pub fn player(&self) -> Position {
        self.player
    }

    #[must_use]
    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }

    #[must_use]
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    #[must_use]
    pub fn has_box(&self, pos: Position) -> bool {
        self.boxes.binary_search(&pos).is_ok()
    }

    /// True when the box set equals the target set, wherever the player is.
    #[must_use]
    pub fn is_solved(&self, board: &Board) -> bool {
        // both lists are in row-major order
        self.boxes == board.targets()
    }

    /// True when the player and every box stand on floor inside `board` and
    /// the player does not share a square with a box.
    #[must_use]
    pub fn fits(&self, board: &Board) -> bool {
        board.is_floor(self.player)
            && !self.has_box(self.player)
            && self.boxes.iter().all(|b| board.is_floor(*b))
    }

    #[must_use]
    pub fn boxes_on_targets(&self, board: &Board) -> usize {
        self.boxes.iter().filter(|b| board.is_target(**b)).count()
    }

    /// Moves the box at `from` to `to` and places the player at `player`.
    #[must_use]
    pub(crate) fn with_box_moved(&self, from: Position, to: Position, player: Position) -> Self {
        let boxes = self
            .boxes
            .iter()
            .map(|b| if *b == from { to } else { *b })
            .collect();
        Self::new(player, boxes)
    }

    #[must_use]
    pub fn box_grid(&self, board: &Board) -> BoxGrid {
        BoxGrid::new(board, &self.boxes)
    }

    /// Key identifying this state up to where the player stands inside its
    /// reachable area.
    #[must_use]
    pub fn key(&self, board: &Board) -> StateKey {
        let reach = Reachability::compute(board, self);
        StateKey {
            player: reach.canonical_player(),
            boxes: self.boxes.clone(),
        }
    }
}

/// Duplicate-detection key: normalized player square and the box set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    player: Position,
    boxes: Vec<Position>,
}

impl StateKey {
    #[must_use]
    pub fn player(&self) -> Position {
        self.player
    }

    #[must_use]
    pub fn boxes(&self) -> &[Position] {
        &self.boxes
    }
}

/// Per-square box occupancy for constant-time lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxGrid {
    width: u16,
    height: u16,
    occupied: Vec<bool>,
}

impl BoxGrid {
    #[must_use]
    pub fn new(board: &Board, boxes: &[Position]) -> Self {
        let mut occupied = vec![false; board.len()];
        for b in boxes {
            occupied[board.index(*b)] = true;
        }
        Self {
            width: board.width(),
            height: board.height(),
            occupied,
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height)
            .then(|| usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x))
    }

    #[must_use]
    pub fn has_box(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.occupied[i])
    }

    pub fn set(&mut self, pos: Position, occupied: bool) {
        if let Some(i) = self.index(pos) {
            self.occupied[i] = occupied;
        }
    }

    /// Square is inside the board, not a wall and holds no box.
    #[must_use]
    pub fn is_free(&self, board: &Board, pos: Position) -> bool {
        board.is_floor(pos) && !self.has_box(pos)
    }
}

/// Squares the player can walk to without pushing anything.
#[derive(Debug, Clone)]
pub struct Reachability {
    width: u16,
    height: u16,
    reachable: Vec<bool>,
    area: usize,
    canonical: Position,
}

impl Reachability {
    #[must_use]
    pub fn compute(board: &Board, state: &State) -> Self {
        Self::compute_with(board, &state.box_grid(board), state.player())
    }

    /// Flood fill from `start` over floor squares not occupied in `boxes`.
    #[must_use]
    pub fn compute_with(board: &Board, boxes: &BoxGrid, start: Position) -> Self {
        let mut reachable = vec![false; board.len()];
        let mut area = 0;
        let mut canonical = start;
        if board.is_floor(start) {
            reachable[board.index(start)] = true;
            area = 1;
            let mut stack = vec![start];
            while let Some(pos) = stack.pop() {
                for dir in Direction::ALL {
                    let Some(next) = board.open_neighbor(pos, dir) else {
                        continue;
                    };
                    let i = board.index(next);
                    if reachable[i] || boxes.has_box(next) {
                        continue;
                    }
                    reachable[i] = true;
                    area += 1;
                    canonical = canonical.min(next);
                    stack.push(next);
                }
            }
        }
        Self {
            width: board.width(),
            height: board.height(),
            reachable,
            area,
            canonical,
        }
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width
            && pos.y < self.height
            && self.reachable[usize::from(pos.y) * usize::from(self.width) + usize::from(pos.x)]
    }

    /// Number of reachable squares, including the player's own.
    #[must_use]
    pub fn area(&self) -> usize {
        self.area
    }

    /// Top-left-most reachable square.
    #[must_use]
    pub fn canonical_player(&self) -> Position {
        self.canonical
    }
}

#[cfg(test)]
mod tests {
    use crate::Level;

    use super::*;

    #[test]
    fn test_boxes_are_sorted_and_solved_ignores_player() {
        let level = Level::from_ascii(
            r"
            ######
            #*-@*#
            ######
            ",
        )
        .unwrap();
        let state = level.initial_state();
        assert!(state.is_solved(level.board()));
        let moved = State::new(Position::new(2, 1), state.boxes().iter().rev().copied().collect());
        assert_eq!(moved.boxes(), state.boxes());
        assert!(moved.is_solved(level.board()));
    }

    #[test]
    fn test_fits_rejects_walls_and_out_of_board_squares() {
        let level = Level::from_ascii("#@$.#").unwrap();
        let board = level.board();
        assert!(level.initial_state().fits(board));
        assert!(!State::new(Position::new(1, 0), vec![Position::new(40, 7)]).fits(board));
        assert!(!State::new(Position::new(1, 0), vec![Position::new(0, 0)]).fits(board));
        assert!(!State::new(Position::new(9, 0), vec![Position::new(2, 0)]).fits(board));
        assert!(!State::new(Position::new(2, 0), vec![Position::new(2, 0)]).fits(board));
    }

    #[test]
    fn test_not_solved_when_box_off_target() {
        let level = Level::from_ascii("#@$.#").unwrap();
        assert!(!level.initial_state().is_solved(level.board()));
        assert_eq!(level.initial_state().boxes_on_targets(level.board()), 0);
    }

    #[test]
    fn test_reachability_stops_at_boxes() {
        let level = Level::from_ascii(
            r"
            #######
            #-@$--#
            #--#--#
            #######
            ",
        )
        .unwrap();
        let reach = Reachability::compute(level.board(), level.initial_state());
        assert!(reach.contains(Position::new(1, 1)));
        assert!(reach.contains(Position::new(2, 2)));
        assert!(!reach.contains(Position::new(3, 1)));
        assert!(!reach.contains(Position::new(4, 1)));
        assert_eq!(reach.area(), 4);
        assert_eq!(reach.canonical_player(), Position::new(1, 1));
    }

    #[test]
    fn test_key_normalizes_player() {
        let level = Level::from_ascii(
            r"
            ######
            #@---#
            #-$.-#
            ######
            ",
        )
        .unwrap();
        let board = level.board();
        let a = level.initial_state();
        let b = State::new(Position::new(4, 1), a.boxes().to_vec());
        assert_ne!(a, &b);
        assert_eq!(a.key(board), b.key(board));
    }
}
