//! Room segmentation, inter-room passages and the hotspot relation.
//!
//! All of this depends on walls and targets only, so it is computed once per
//! level:
//!
//! 1. Floor squares boxed in by walls on both sides of one axis are "narrow".
//! 2. The remaining floor is flood filled; components of at least
//!    `min_room_size` squares are rooms.
//! 3. Every other floor square belongs to a passage region. A passage region
//!    touching two or more rooms links each pair of them; it is a tunnel when
//!    it has at most two squares.
//! 4. The hotspot table answers "does a wall on `y` change how many targets are
//!    reachable from `x`" for every pair of floor squares.

use std::collections::BTreeSet;

use sokofess_engine::{Board, Direction, Position, State};

pub const DEFAULT_MIN_ROOM_SIZE: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
#[display("room#{_0}")]
pub struct RoomId(pub usize);

#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    squares: Vec<Position>,
    target_count: usize,
}

impl Room {
    #[must_use]
    pub fn id(&self) -> RoomId {
        self.id
    }

    #[must_use]
    pub fn squares(&self) -> &[Position] {
        &self.squares
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.squares.len()
    }

    #[must_use]
    pub fn target_count(&self) -> usize {
        self.target_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::IsVariant)]
pub enum PassageKind {
    #[display("tunnel")]
    Tunnel,
    #[display("opening")]
    Opening,
}

#[derive(Debug, Clone)]
pub struct RoomConnection {
    rooms: (RoomId, RoomId),
    squares: Vec<Position>,
    kind: PassageKind,
}

impl RoomConnection {
    #[must_use]
    pub fn rooms(&self) -> (RoomId, RoomId) {
        self.rooms
    }

    #[must_use]
    pub fn squares(&self) -> &[Position] {
        &self.squares
    }

    #[must_use]
    pub fn kind(&self) -> PassageKind {
        self.kind
    }
}

/// Precomputed `is_hotspot(x, y)` over all pairs of floor squares.
#[derive(Debug, Clone)]
pub struct HotspotTable {
    floor_index: Vec<Option<usize>>,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl HotspotTable {
    #[must_use]
    pub fn new(board: &Board) -> Self {
        let mut floor_index = vec![None; board.len()];
        let floor: Vec<Position> = board.floor_squares().collect();
        for (n, pos) in floor.iter().enumerate() {
            floor_index[board.index(*pos)] = Some(n);
        }
        let words_per_row = floor.len().div_ceil(64);
        let mut bits = vec![0u64; words_per_row * floor.len()];

        let (base_labels, base_targets) = label_components(board, None);
        for (yn, &y) in floor.iter().enumerate() {
            let (labels, targets) = label_components(board, Some(y));
            for (xn, &x) in floor.iter().enumerate() {
                if x == y {
                    continue;
                }
                let xi = board.index(x);
                let base_label = base_labels[xi].unwrap_or(usize::MAX);
                let mut before = base_targets.get(base_label).copied().unwrap_or(0);
                if board.is_target(y) && base_labels[board.index(y)] == base_labels[xi] {
                    before -= 1;
                }
                let after = labels[xi]
                    .and_then(|l| targets.get(l).copied())
                    .unwrap_or(0);
                if before != after {
                    bits[xn * words_per_row + yn / 64] |= 1 << (yn % 64);
                }
            }
        }
        Self {
            floor_index,
            words_per_row,
            bits,
        }
    }

    /// True when walling off `y` changes the number of targets (other than
    /// `y` itself) reachable from `x`.
    #[must_use]
    pub fn is_hotspot(&self, board: &Board, x: Position, y: Position) -> bool {
        if !board.contains(x) || !board.contains(y) {
            return false;
        }
        let (Some(xn), Some(yn)) = (
            self.floor_index[board.index(x)],
            self.floor_index[board.index(y)],
        ) else {
            return false;
        };
        self.bits[xn * self.words_per_row + yn / 64] & (1 << (yn % 64)) != 0
    }
}

/// Labels floor components (with `extra_wall` treated as wall) and counts the
/// targets in each, not counting `extra_wall`.
fn label_components(
    board: &Board,
    extra_wall: Option<Position>,
) -> (Vec<Option<usize>>, Vec<usize>) {
    let mut labels = vec![None; board.len()];
    let mut targets = vec![];
    for start in board.floor_squares() {
        if Some(start) == extra_wall || labels[board.index(start)].is_some() {
            continue;
        }
        let label = targets.len();
        let mut count = 0;
        labels[board.index(start)] = Some(label);
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if board.is_target(pos) {
                count += 1;
            }
            for dir in Direction::ALL {
                if let Some(next) = board.open_neighbor(pos, dir)
                    && Some(next) != extra_wall
                    && labels[board.index(next)].is_none()
                {
                    labels[board.index(next)] = Some(label);
                    stack.push(next);
                }
            }
        }
        targets.push(count);
    }
    (labels, targets)
}

/// Rooms, passages and hotspots of one level.
#[derive(Debug, Clone)]
pub struct RoomAnalysis {
    rooms: Vec<Room>,
    connections: Vec<RoomConnection>,
    room_of: Vec<Option<RoomId>>,
    passage: Vec<bool>,
    hotspots: HotspotTable,
}

impl RoomAnalysis {
    #[must_use]
    pub fn new(board: &Board, min_room_size: usize) -> Self {
        let narrow = |pos: Position| {
            let walled = |a: Direction, b: Direction| {
                board.open_neighbor(pos, a).is_none() && board.open_neighbor(pos, b).is_none()
            };
            walled(Direction::Left, Direction::Right) || walled(Direction::Up, Direction::Down)
        };

        let mut room_of = vec![None; board.len()];
        let mut seen = vec![false; board.len()];
        let mut rooms = vec![];
        for start in board.floor_squares() {
            if seen[board.index(start)] || narrow(start) {
                continue;
            }
            let squares = flood(board, start, &mut seen, |p| !narrow(p));
            if squares.len() < min_room_size {
                continue;
            }
            let id = RoomId(rooms.len());
            for pos in &squares {
                room_of[board.index(*pos)] = Some(id);
            }
            let target_count = squares.iter().filter(|p| board.is_target(**p)).count();
            rooms.push(Room {
                id,
                squares,
                target_count,
            });
        }

        let mut seen = vec![false; board.len()];
        let mut passage = vec![false; board.len()];
        let mut connections = vec![];
        for start in board.floor_squares() {
            let si = board.index(start);
            if seen[si] || room_of[si].is_some() {
                continue;
            }
            let squares = flood(board, start, &mut seen, |p| room_of[board.index(p)].is_none());
            let touching: BTreeSet<RoomId> = squares
                .iter()
                .flat_map(|p| Direction::ALL.map(|d| board.open_neighbor(*p, d)))
                .flatten()
                .filter_map(|n| room_of[board.index(n)])
                .collect();
            if touching.len() < 2 {
                continue;
            }
            for pos in &squares {
                passage[board.index(*pos)] = true;
            }
            let kind = if squares.len() <= 2 {
                PassageKind::Tunnel
            } else {
                PassageKind::Opening
            };
            let touching: Vec<RoomId> = touching.into_iter().collect();
            for (i, a) in touching.iter().enumerate() {
                for b in &touching[i + 1..] {
                    connections.push(RoomConnection {
                        rooms: (*a, *b),
                        squares: squares.clone(),
                        kind,
                    });
                }
            }
        }

        Self {
            rooms,
            connections,
            room_of,
            passage,
            hotspots: HotspotTable::new(board),
        }
    }

    #[must_use]
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    #[must_use]
    pub fn connections(&self) -> &[RoomConnection] {
        &self.connections
    }

    #[must_use]
    pub fn hotspots(&self) -> &HotspotTable {
        &self.hotspots
    }

    #[must_use]
    pub fn room_at(&self, board: &Board, pos: Position) -> Option<&Room> {
        if !board.contains(pos) {
            return None;
        }
        self.room_of[board.index(pos)].map(|id| &self.rooms[id.0])
    }

    /// Square lies on a passage linking two rooms.
    #[must_use]
    pub fn is_passage(&self, board: &Board, pos: Position) -> bool {
        board.contains(pos) && self.passage[board.index(pos)]
    }

    /// Number of boxes standing on inter-room passages.
    #[must_use]
    pub fn room_connectivity(&self, board: &Board, state: &State) -> u32 {
        count_u32(state.boxes().iter().filter(|b| self.is_passage(board, **b)))
    }

    /// Number of boxes not on a target for which a box on `y` is a hotspot.
    #[must_use]
    pub fn disruption(&self, board: &Board, state: &State, y: Position) -> u32 {
        count_u32(state.boxes().iter().filter(|x| {
            **x != y && !board.is_target(**x) && self.hotspots.is_hotspot(board, **x, y)
        }))
    }

    /// Number of boxes acting as a hotspot for at least one other box.
    #[must_use]
    pub fn hotspot_count(&self, board: &Board, state: &State) -> u32 {
        count_u32(
            state
                .boxes()
                .iter()
                .filter(|y| self.disruption(board, state, **y) > 0),
        )
    }

    /// The box square that is a hotspot for the largest number of other boxes.
    /// Ties go to the first box in board order; `None` when no box blocks any
    /// other.
    #[must_use]
    pub fn find_most_disruptive_hotspot(&self, board: &Board, state: &State) -> Option<Position> {
        let mut best: Option<(u32, Position)> = None;
        for &y in state.boxes() {
            let blocked = self.disruption(board, state, y);
            if blocked > 0 && best.is_none_or(|(n, _)| blocked > n) {
                best = Some((blocked, y));
            }
        }
        best.map(|(_, pos)| pos)
    }
}

fn flood<F>(board: &Board, start: Position, seen: &mut [bool], include: F) -> Vec<Position>
where
    F: Fn(Position) -> bool,
{
    let mut squares = vec![start];
    seen[board.index(start)] = true;
    let mut i = 0;
    while i < squares.len() {
        let pos = squares[i];
        i += 1;
        for dir in Direction::ALL {
            if let Some(next) = board.open_neighbor(pos, dir)
                && !seen[board.index(next)]
                && include(next)
            {
                seen[board.index(next)] = true;
                squares.push(next);
            }
        }
    }
    squares.sort_unstable();
    squares
}

fn count_u32<I: Iterator>(iter: I) -> u32 {
    u32::try_from(iter.count()).unwrap_or(u32::MAX)
}
