//! Box-to-target assignment.
//!
//! Every box needs a distinct target it can still be pushed to (ignoring the
//! other boxes). Augmenting paths find a maximum matching; anything short of
//! one target per box is a deadlock.

use sokofess_engine::{Position, State};

use crate::level_analysis::LevelAnalysis;

pub(super) fn detect(level: &LevelAnalysis, state: &State) -> bool {
    let board = level.board();
    let push_reach = level.push_reach();
    !has_perfect_matching(state.boxes(), board.targets().len(), |b, t| {
        push_reach.can_reach(board, b, t)
    })
}

/// True when each box can be assigned its own target and no target is left
/// over.
pub(super) fn has_perfect_matching<F>(boxes: &[Position], target_count: usize, reaches: F) -> bool
where
    F: Fn(Position, usize) -> bool,
{
    if boxes.len() != target_count {
        return false;
    }
    let edges: Vec<Vec<usize>> = boxes
        .iter()
        .map(|b| (0..target_count).filter(|t| reaches(*b, *t)).collect())
        .collect();
    if edges.iter().any(Vec::is_empty) {
        return false;
    }
    let mut owner: Vec<Option<usize>> = vec![None; target_count];
    for b in 0..boxes.len() {
        let mut visited = vec![false; target_count];
        if !augment(b, &edges, &mut owner, &mut visited) {
            return false;
        }
    }
    true
}

fn augment(
    b: usize,
    edges: &[Vec<usize>],
    owner: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    for &t in &edges[b] {
        if visited[t] {
            continue;
        }
        visited[t] = true;
        let current = owner[t];
        if current.is_none_or(|other| augment(other, edges, owner, visited)) {
            owner[t] = Some(b);
            return true;
        }
    }
    false
}
