//! Retrograde packing analysis.
//!
//! The plan is computed once per level from the fully packed configuration:
//!
//! - **Basins**: for every target, the squares from which a box can be pushed
//!   onto it while all other targets are already filled.
//! - **Sink**: the basin scoring highest on capacity, proximity to other
//!   targets and maneuverability, weighted by the number of initial boxes
//!   already inside it. Boxes outside the sink that are not on a target are
//!   "out of plan".
//! - **Order**: boxes are pulled out of the packed board one by one, always
//!   taking the removable target closest to the sink; the packing order is the
//!   reverse of that removal order.
//!
//! When no removal order exists the plan has no order and packing falls back
//! to counting boxes on targets.

use std::collections::VecDeque;

use sokofess_engine::{Board, Direction, Position, State};
use tracing::warn;

use crate::{push_reach::pull_region, room::RoomAnalysis, room::RoomId};

#[derive(Debug, Clone)]
pub struct Basin {
    target: Position,
    squares: Vec<bool>,
    size: usize,
}

impl Basin {
    #[must_use]
    pub fn target(&self) -> Position {
        self.target
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn contains(&self, board: &Board, pos: Position) -> bool {
        board.contains(pos) && self.squares[board.index(pos)]
    }
}

#[derive(Debug, Clone)]
pub struct PackingPlan {
    order: Option<Vec<Position>>,
    basins: Vec<Basin>,
    sink: Option<usize>,
    sink_room: Option<RoomId>,
}

impl PackingPlan {
    #[must_use]
    pub fn new(board: &Board, initial: &State, rooms: &RoomAnalysis) -> Self {
        let targets = board.targets();
        let basins: Vec<Basin> = targets
            .iter()
            .map(|&target| {
                let squares = pull_region(board, target, |p| p != target && board.is_target(p));
                let size = squares.iter().filter(|s| **s).count();
                Basin {
                    target,
                    squares,
                    size,
                }
            })
            .collect();

        let sink = basins
            .iter()
            .enumerate()
            .map(|(i, basin)| (sink_score(board, initial, &basins, basin), i))
            // highest score, first target on ties
            .max_by(|(a, i), (b, j)| a.cmp(b).then(j.cmp(i)))
            .map(|(_, i)| i);

        let sink_room = sink.and_then(|i| {
            rooms
                .rooms()
                .iter()
                .map(|room| {
                    let overlap = room
                        .squares()
                        .iter()
                        .filter(|p| basins[i].contains(board, **p))
                        .count();
                    (overlap, room.id())
                })
                .filter(|(overlap, _)| *overlap > 0)
                .max_by(|(a, x), (b, y)| a.cmp(b).then(y.cmp(x)))
                .map(|(_, id)| id)
        });

        let order = if targets.is_empty() {
            Some(vec![])
        } else {
            sink.and_then(|i| removal_order(board, initial, &basins[i]))
        };
        if order.is_none() {
            warn!("no retrograde packing order found, packing falls back to boxes on targets");
        }
        let order = order.map(|mut removal| {
            removal.reverse();
            removal
        });

        Self {
            order,
            basins,
            sink,
            sink_room,
        }
    }

    /// A packing order was found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.order.is_some()
    }

    /// Targets in the order they should be filled.
    #[must_use]
    pub fn order(&self) -> Option<&[Position]> {
        self.order.as_deref()
    }

    #[must_use]
    pub fn basins(&self) -> &[Basin] {
        &self.basins
    }

    #[must_use]
    pub fn sink(&self) -> Option<&Basin> {
        self.sink.map(|i| &self.basins[i])
    }

    /// Room overlapping the sink basin the most.
    #[must_use]
    pub fn sink_room(&self) -> Option<RoomId> {
        self.sink_room
    }

    #[must_use]
    pub fn in_sink(&self, board: &Board, pos: Position) -> bool {
        self.sink().is_some_and(|basin| basin.contains(board, pos))
    }

    /// Targets filled following the packing order, up to the first empty one.
    /// Without an order, every box on a target counts.
    #[must_use]
    pub fn packed_count(&self, board: &Board, state: &State) -> u32 {
        let count = match &self.order {
            Some(order) => order.iter().take_while(|t| state.has_box(**t)).count(),
            None => state.boxes_on_targets(board),
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Boxes off target and outside the sink basin.
    #[must_use]
    pub fn out_of_plan_count(&self, board: &Board, state: &State) -> u32 {
        if self.sink.is_none() {
            return 0;
        }
        let count = state
            .boxes()
            .iter()
            .filter(|b| !board.is_target(**b) && !self.in_sink(board, **b))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

fn sink_score(board: &Board, initial: &State, basins: &[Basin], basin: &Basin) -> u64 {
    let capacity = board
        .floor_squares()
        .filter(|p| basin.contains(board, *p) && !board.is_target(*p))
        .count();
    let proximity = basins
        .iter()
        .filter(|other| {
            other.target != basin.target
                && Direction::ALL
                    .iter()
                    .filter_map(|d| other.target.step(*d))
                    .any(|p| basin.contains(board, p))
        })
        .count();
    let accessibility = board
        .floor_squares()
        .filter(|p| basin.contains(board, *p))
        .filter(|p| {
            let open = |d| board.open_neighbor(*p, d).is_some();
            (open(Direction::Left) && open(Direction::Right))
                || (open(Direction::Up) && open(Direction::Down))
        })
        .count();
    let boxes_inside = initial
        .boxes()
        .iter()
        .filter(|b| basin.contains(board, **b))
        .count();
    let base = capacity + 2 * proximity + accessibility;
    (base as u64) * (1 + boxes_inside as u64)
}

/// Pulls boxes off a fully packed board; returns targets in removal order.
fn removal_order(board: &Board, initial: &State, sink: &Basin) -> Option<Vec<Position>> {
    let sink_distance = distance_from(board, |p| sink.contains(board, p));
    let mut remaining: Vec<Position> = board.targets().to_vec();
    let mut removed = Vec::with_capacity(remaining.len());
    let mut seeds: Vec<Position> = board
        .floor_squares()
        .filter(|p| sink.contains(board, *p) && !board.is_target(*p))
        .collect();
    seeds.push(initial.player());

    while !remaining.is_empty() {
        let reach = walkable(board, &seeds, &remaining);
        let free = |p: Position| board.is_floor(p) && !remaining.contains(&p);
        let candidate = remaining
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                Direction::ALL.iter().any(|d| {
                    t.step(*d).is_some_and(|first| {
                        free(first)
                            && reach[board.index(first)]
                            && first.step(*d).is_some_and(free)
                    })
                })
            })
            .min_by_key(|(_, t)| (sink_distance[board.index(**t)], **t))
            .map(|(i, _)| i)?;
        removed.push(remaining.remove(candidate));
    }
    Some(removed)
}

fn walkable(board: &Board, seeds: &[Position], blocked: &[Position]) -> Vec<bool> {
    let mut reach = vec![false; board.len()];
    let mut stack: Vec<Position> = seeds
        .iter()
        .copied()
        .filter(|p| board.is_floor(*p) && !blocked.contains(p))
        .collect();
    for p in &stack {
        reach[board.index(*p)] = true;
    }
    while let Some(pos) = stack.pop() {
        for dir in Direction::ALL {
            if let Some(next) = board.open_neighbor(pos, dir)
                && !reach[board.index(next)]
                && !blocked.contains(&next)
            {
                reach[board.index(next)] = true;
                stack.push(next);
            }
        }
    }
    reach
}

/// Walking distance from the nearest square satisfying `source`.
fn distance_from<F>(board: &Board, source: F) -> Vec<u32>
where
    F: Fn(Position) -> bool,
{
    let mut dist = vec![u32::MAX; board.len()];
    let mut queue = VecDeque::new();
    for pos in board.floor_squares().filter(|p| source(*p)) {
        dist[board.index(pos)] = 0;
        queue.push_back(pos);
    }
    while let Some(pos) = queue.pop_front() {
        let d = dist[board.index(pos)];
        for dir in Direction::ALL {
            if let Some(next) = board.open_neighbor(pos, dir)
                && dist[board.index(next)] == u32::MAX
            {
                dist[board.index(next)] = d + 1;
                queue.push_back(next);
            }
        }
    }
    dist
}
