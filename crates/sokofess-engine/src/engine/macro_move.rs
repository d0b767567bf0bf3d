use std::{collections::VecDeque, fmt};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::{
    InfeasibleMove,
    core::{Board, BoxGrid, Direction, Position, Reachability, State},
};

use super::notation;

/// Search-edge weight of a move: advisor-recommended moves are free.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MoveWeight {
    Advised,
    #[default]
    Difficult,
}

impl MoveWeight {
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Advised => 0,
            Self::Difficult => 1,
        }
    }
}

pub type PushPath = ArrayVec<Direction, { MoveGenerator::MAX_PUSHES }>;

/// One or more consecutive pushes of the same box.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacroMove {
    from: Position,
    to: Position,
    pushes: PushPath,
    player_path: Option<Vec<Direction>>,
    weight: MoveWeight,
}

impl MacroMove {
    /// Builds the move pushing the box at `from` along `pushes`.
    ///
    /// Returns `None` for an empty or over-long push list, or one that leaves
    /// the non-negative quadrant. Board feasibility is only checked by
    /// [`MacroMove::apply`].
    #[must_use]
    pub fn from_pushes(from: Position, pushes: &[Direction]) -> Option<Self> {
        if pushes.is_empty() {
            return None;
        }
        let pushes = PushPath::try_from(pushes).ok()?;
        let to = pushes
            .iter()
            .try_fold(from, |pos, dir| pos.step(*dir))?;
        Some(Self {
            from,
            to,
            pushes,
            player_path: None,
            weight: MoveWeight::default(),
        })
    }

    #[must_use]
    pub fn from(&self) -> Position {
        self.from
    }

    #[must_use]
    pub fn to(&self) -> Position {
        self.to
    }

    #[must_use]
    pub fn pushes(&self) -> &[Direction] {
        &self.pushes
    }

    #[must_use]
    pub fn push_count(&self) -> usize {
        self.pushes.len()
    }

    #[must_use]
    pub fn weight(&self) -> MoveWeight {
        self.weight
    }

    #[must_use]
    pub fn with_weight(mut self, weight: MoveWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Walk the player takes to reach the square behind the box before the
    /// first push, when known. Walks between chained pushes that change
    /// direction are not part of it; [`to_lurd`](super::to_lurd) renders the
    /// complete player movement.
    #[must_use]
    pub fn player_path(&self) -> Option<&[Direction]> {
        self.player_path.as_deref()
    }

    #[must_use]
    pub fn with_player_path(mut self, path: Vec<Direction>) -> Self {
        self.player_path = Some(path);
        self
    }

    /// Deterministic ordering key, independent of weight and player path.
    #[must_use]
    pub fn sort_key(&self) -> (Position, Position, &[Direction]) {
        (self.from, self.to, &self.pushes)
    }

    /// Same box, same pushes (weight and player path are not compared).
    #[must_use]
    pub fn same_pushes(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }

    /// Applies the move to `state`, producing the successor state.
    pub fn apply(&self, board: &Board, state: &State) -> Result<State, InfeasibleMove> {
        if !state.has_box(self.from) {
            return Err(InfeasibleMove::NoBoxAtStart(self.from));
        }
        let mut current = state.clone();
        let mut box_pos = self.from;
        for dir in &self.pushes {
            (current, box_pos) = push_once(board, &current, box_pos, *dir)?;
        }
        if box_pos != self.to {
            return Err(InfeasibleMove::WrongDestination {
                expected: self.to,
                actual: box_pos,
            });
        }
        Ok(current)
    }
}

impl fmt::Display for MacroMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            notation::coordinate_to_notation(self.from),
            notation::coordinate_to_notation(self.to)
        )
    }
}

/// Applies `mv` to `state`.
pub fn apply(board: &Board, state: &State, mv: &MacroMove) -> Result<State, InfeasibleMove> {
    mv.apply(board, state)
}

fn push_once(
    board: &Board,
    state: &State,
    box_pos: Position,
    dir: Direction,
) -> Result<(State, Position), InfeasibleMove> {
    let dest = box_pos
        .step(dir)
        .filter(|dest| board.contains(*dest))
        .ok_or(InfeasibleMove::OutOfBounds(box_pos))?;
    if board.is_wall(dest) || state.has_box(dest) {
        return Err(InfeasibleMove::Blocked(dest));
    }
    let behind = box_pos
        .step(dir.reverse())
        .filter(|behind| board.is_floor(*behind) && !state.has_box(*behind))
        .ok_or(InfeasibleMove::PlayerUnreachable(box_pos))?;
    if !Reachability::compute(board, state).contains(behind) {
        return Err(InfeasibleMove::PlayerUnreachable(behind));
    }
    Ok((state.with_box_moved(box_pos, dest, box_pos), dest))
}

/// Enumerates macro moves of a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveGenerator {
    max_pushes: usize,
}

impl Default for MoveGenerator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl MoveGenerator {
    pub const MAX_PUSHES: usize = 3;

    /// `max_pushes` is clamped to `1..=MAX_PUSHES`.
    #[must_use]
    pub fn new(max_pushes: usize) -> Self {
        Self {
            max_pushes: max_pushes.clamp(1, Self::MAX_PUSHES),
        }
    }

    #[must_use]
    pub fn max_pushes(&self) -> usize {
        self.max_pushes
    }

    /// All macro moves of `state`, grouped by box in board order.
    ///
    /// For each box, every square it can reach within `max_pushes` pushes
    /// (other boxes fixed) yields one move using the fewest pushes found.
    #[must_use]
    pub fn generate(&self, board: &Board, state: &State) -> Vec<MacroMove> {
        let root_reach = Reachability::compute(board, state);
        let root_grid = state.box_grid(board);
        let mut moves = vec![];
        for &start in state.boxes() {
            let mut grid = root_grid.clone();
            grid.set(start, false);
            let mut ends = vec![start];
            let mut queue = VecDeque::from([(start, state.player(), PushPath::new())]);
            while let Some((box_pos, player, path)) = queue.pop_front() {
                if path.len() >= self.max_pushes {
                    continue;
                }
                grid.set(box_pos, true);
                let intermediate;
                let reach = if path.is_empty() {
                    &root_reach
                } else {
                    intermediate = Reachability::compute_with(board, &grid, player);
                    &intermediate
                };
                for dir in Direction::ALL {
                    let Some(dest) = push_destination(board, &grid, reach, box_pos, dir) else {
                        continue;
                    };
                    if ends.contains(&dest) {
                        continue;
                    }
                    ends.push(dest);
                    let mut next_path = path.clone();
                    next_path.push(dir);
                    moves.push(MacroMove {
                        from: start,
                        to: dest,
                        pushes: next_path.clone(),
                        player_path: None,
                        weight: MoveWeight::default(),
                    });
                    queue.push_back((dest, box_pos, next_path));
                }
                grid.set(box_pos, false);
            }
        }
        moves
    }

    /// Number of single pushes available in `state`.
    #[must_use]
    pub fn count_single_pushes(board: &Board, state: &State) -> usize {
        let reach = Reachability::compute(board, state);
        let grid = state.box_grid(board);
        state
            .boxes()
            .iter()
            .map(|b| {
                Direction::ALL
                    .into_iter()
                    .filter(|dir| push_destination(board, &grid, &reach, *b, *dir).is_some())
                    .count()
            })
            .sum()
    }
}

/// Destination of pushing the box at `box_pos` in `dir`, when the player can
/// stand behind it and the square ahead is free.
fn push_destination(
    board: &Board,
    grid: &BoxGrid,
    reach: &Reachability,
    box_pos: Position,
    dir: Direction,
) -> Option<Position> {
    let behind = box_pos.step(dir.reverse())?;
    let dest = box_pos.step(dir)?;
    (reach.contains(behind) && grid.is_free(board, dest)).then_some(dest)
}

#[cfg(test)]
mod tests {
    use crate::Level;

    use super::*;

    fn corridor() -> Level {
        Level::from_ascii(
            r"
            ########
            #@$---.#
            ########
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_apply_single_push() {
        let level = Level::from_ascii("#@$.#").unwrap();
        let mv = MacroMove::from_pushes(Position::new(2, 0), &[Direction::Right]).unwrap();
        let next = mv.apply(level.board(), level.initial_state()).unwrap();
        assert_eq!(next.boxes(), &[Position::new(3, 0)]);
        assert_eq!(next.player(), Position::new(2, 0));
        assert_eq!(next.box_count(), level.initial_state().box_count());
    }

    #[test]
    fn test_apply_rejects_infeasible() {
        let level = Level::from_ascii("#@$.#").unwrap();
        let board = level.board();
        let state = level.initial_state();

        let no_box = MacroMove::from_pushes(Position::new(3, 0), &[Direction::Right]).unwrap();
        assert_eq!(
            no_box.apply(board, state),
            Err(InfeasibleMove::NoBoxAtStart(Position::new(3, 0)))
        );

        let into_player = MacroMove::from_pushes(Position::new(2, 0), &[Direction::Left]).unwrap();
        assert!(into_player.apply(board, state).is_err());

        let into_wall =
            MacroMove::from_pushes(Position::new(2, 0), &[Direction::Right, Direction::Right])
                .unwrap();
        assert_eq!(
            into_wall.apply(board, state),
            Err(InfeasibleMove::Blocked(Position::new(4, 0)))
        );
    }

    #[test]
    fn test_apply_rejects_out_of_bounds() {
        let level = Level::from_ascii("@$").unwrap();
        let mv = MacroMove::from_pushes(Position::new(1, 0), &[Direction::Right]).unwrap();
        assert_eq!(
            mv.apply(level.board(), level.initial_state()),
            Err(InfeasibleMove::OutOfBounds(Position::new(1, 0)))
        );
    }

    #[test]
    fn test_apply_requires_player_access() {
        let level = Level::from_ascii(
            r"
            #######
            #@-$-.#
            #######
            ",
        )
        .unwrap();
        // the box itself cuts the player off from its right side
        let mv = MacroMove::from_pushes(Position::new(3, 1), &[Direction::Left]).unwrap();
        let result = mv.apply(level.board(), level.initial_state());
        assert_eq!(
            result,
            Err(InfeasibleMove::PlayerUnreachable(Position::new(4, 1)))
        );
    }

    #[test]
    fn test_generate_chains_pushes() {
        let level = corridor();
        let one = MoveGenerator::new(1).generate(level.board(), level.initial_state());
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].to(), Position::new(3, 1));

        let three = MoveGenerator::new(3).generate(level.board(), level.initial_state());
        let ends: Vec<_> = three.iter().map(MacroMove::to).collect();
        assert_eq!(
            ends,
            [Position::new(3, 1), Position::new(4, 1), Position::new(5, 1)]
        );
        assert!(three.iter().all(|m| m.push_count() == usize::from(m.to().x - 2)));
        for mv in &three {
            let next = mv.apply(level.board(), level.initial_state()).unwrap();
            assert_eq!(next.boxes(), &[mv.to()]);
        }
    }

    #[test]
    fn test_generate_turns_when_player_can_walk_around() {
        let level = Level::from_ascii(
            r"
            #######
            #-----#
            #-@$--#
            #-----#
            #######
            ",
        )
        .unwrap();
        let moves = MoveGenerator::new(2).generate(level.board(), level.initial_state());
        // right then down needs the player to walk around the box
        assert!(moves.iter().any(|m| m.pushes() == [Direction::Right, Direction::Down]
            || m.pushes() == [Direction::Down, Direction::Right]));
        let mut ends: Vec<_> = moves.iter().map(MacroMove::to).collect();
        ends.sort();
        ends.dedup();
        assert_eq!(ends.len(), moves.len());
        for mv in &moves {
            assert!(mv.apply(level.board(), level.initial_state()).is_ok(), "{mv}");
        }
    }

    #[test]
    fn test_count_single_pushes() {
        let level = corridor();
        assert_eq!(
            MoveGenerator::count_single_pushes(level.board(), level.initial_state()),
            1
        );
    }

    #[test]
    fn test_display_uses_notation() {
        let mv = MacroMove::from_pushes(Position::new(1, 0), &[Direction::Right]).unwrap();
        assert_eq!(mv.to_string(), "(B,1)-(C,1)");
    }

    #[test]
    fn test_serialized_shape() {
        let mv = MacroMove::from_pushes(Position::new(1, 0), &[Direction::Right, Direction::Right])
            .unwrap()
            .with_weight(MoveWeight::Advised);
        let json = serde_json::to_value(&mv).unwrap();
        assert_eq!(json["from"], serde_json::json!({ "x": 1, "y": 0 }));
        assert_eq!(json["to"], serde_json::json!({ "x": 3, "y": 0 }));
        assert_eq!(json["pushes"], serde_json::json!(["Right", "Right"]));
        assert_eq!(json["weight"], "advised");
        assert!(json["player_path"].is_null());

        let back: MacroMove = serde_json::from_value(json).unwrap();
        assert_eq!(back, mv);
        assert_eq!(serde_json::to_value(MoveWeight::Difficult).unwrap(), "difficult");
    }
}
