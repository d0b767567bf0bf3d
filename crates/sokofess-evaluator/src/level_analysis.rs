use sokofess_engine::{Board, Level};
use tracing::debug;

use crate::{
    packing_plan::PackingPlan,
    push_reach::PushReachTable,
    room::{DEFAULT_MIN_ROOM_SIZE, RoomAnalysis},
};

/// Everything derived from walls, targets and the initial state, computed
/// once per level and shared by every state evaluation.
#[derive(Debug, Clone)]
pub struct LevelAnalysis {
    level: Level,
    push_reach: PushReachTable,
    rooms: RoomAnalysis,
    plan: PackingPlan,
}

impl LevelAnalysis {
    #[must_use]
    pub fn new(level: &Level) -> Self {
        Self::with_min_room_size(level, DEFAULT_MIN_ROOM_SIZE)
    }

    #[must_use]
    pub fn with_min_room_size(level: &Level, min_room_size: usize) -> Self {
        let board = level.board();
        let push_reach = PushReachTable::new(board);
        let rooms = RoomAnalysis::new(board, min_room_size);
        let plan = PackingPlan::new(board, level.initial_state(), &rooms);
        debug!(
            rooms = rooms.rooms().len(),
            passages = rooms.connections().len(),
            dead_squares = push_reach.dead_square_count(),
            plan_valid = plan.is_valid(),
            "level analysed"
        );
        Self {
            level: level.clone(),
            push_reach,
            rooms,
            plan,
        }
    }

    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.level.board()
    }

    #[must_use]
    pub fn push_reach(&self) -> &PushReachTable {
        &self.push_reach
    }

    #[must_use]
    pub fn rooms(&self) -> &RoomAnalysis {
        &self.rooms
    }

    #[must_use]
    pub fn plan(&self) -> &PackingPlan {
        &self.plan
    }
}
