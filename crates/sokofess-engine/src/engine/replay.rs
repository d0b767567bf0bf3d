//! Replaying move lists: walking paths, LURD strings and solution checks.

use std::collections::VecDeque;

use crate::{
    InfeasibleMove,
    core::{Board, Direction, Level, Position, State},
};

use super::MacroMove;

/// Shortest walk of the player from its square to `goal` without pushing.
#[must_use]
pub fn player_path(board: &Board, state: &State, goal: Position) -> Option<Vec<Direction>> {
    let start = state.player();
    if start == goal {
        return Some(vec![]);
    }
    let grid = state.box_grid(board);
    if !grid.is_free(board, goal) {
        return None;
    }
    let mut came_from: Vec<Option<Direction>> = vec![None; board.len()];
    let mut seen = vec![false; board.len()];
    seen[board.index(start)] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(pos) = queue.pop_front() {
        for dir in Direction::ALL {
            let Some(next) = board.open_neighbor(pos, dir) else {
                continue;
            };
            let i = board.index(next);
            if seen[i] || grid.has_box(next) {
                continue;
            }
            seen[i] = true;
            came_from[i] = Some(dir);
            if next == goal {
                let mut path = vec![];
                let mut cur = goal;
                while let Some(dir) = came_from[board.index(cur)] {
                    path.push(dir);
                    cur = cur.step(dir.reverse())?;
                }
                path.reverse();
                return Some(path);
            }
            queue.push_back(next);
        }
    }
    None
}

/// Replays `moves` from the level start and attaches to each move the walk
/// the player takes before its first push. Repositioning walks between the
/// pushes of a turning move are only rendered by [`to_lurd`].
pub fn annotate_player_paths(
    level: &Level,
    moves: &[MacroMove],
) -> Result<Vec<MacroMove>, InfeasibleMove> {
    let board = level.board();
    let mut state = level.initial_state().clone();
    let mut annotated = Vec::with_capacity(moves.len());
    for mv in moves {
        let first = mv.pushes().first().copied();
        let behind = first
            .and_then(|dir| mv.from().step(dir.reverse()))
            .ok_or(InfeasibleMove::PlayerUnreachable(mv.from()))?;
        let walk = player_path(board, &state, behind)
            .ok_or(InfeasibleMove::PlayerUnreachable(behind))?;
        state = mv.apply(board, &state)?;
        annotated.push(mv.clone().with_player_path(walk));
    }
    Ok(annotated)
}

/// Renders a move list as LURD: lowercase walks, uppercase pushes.
pub fn to_lurd(level: &Level, moves: &[MacroMove]) -> Result<String, InfeasibleMove> {
    let board = level.board();
    let mut state = level.initial_state().clone();
    let mut out = String::new();
    for mv in moves {
        let mut box_pos = mv.from();
        for dir in mv.pushes() {
            let behind = box_pos
                .step(dir.reverse())
                .ok_or(InfeasibleMove::PlayerUnreachable(box_pos))?;
            let path = player_path(board, &state, behind)
                .ok_or(InfeasibleMove::PlayerUnreachable(behind))?;
            out.extend(path.iter().map(|d| d.lurd_char(false)));
            out.push(dir.lurd_char(true));
            let single = MacroMove::from_pushes(box_pos, &[*dir])
                .ok_or(InfeasibleMove::OutOfBounds(box_pos))?;
            state = single.apply(board, &state)?;
            box_pos = single.to();
        }
    }
    Ok(out)
}

/// True when `moves` can be replayed from the start and end in a solved state.
#[must_use]
pub fn verify_solution(level: &Level, moves: &[MacroMove]) -> bool {
    let board = level.board();
    let mut state = level.initial_state().clone();
    for mv in moves {
        match mv.apply(board, &state) {
            Ok(next) => state = next,
            Err(_) => return false,
        }
    }
    state.is_solved(board)
}
