//! Lazily evaluated metrics of a single state.
//!
//! Each metric is computed on first access and cached, so callers that only
//! need one feature (the advisors, mostly) do not pay for the others.

use std::cell::OnceCell;

use sokofess_engine::{Board, Direction, MoveGenerator, Reachability, State};

use crate::level_analysis::LevelAnalysis;

#[derive(Debug)]
pub struct StateAnalysis<'a> {
    level: &'a LevelAnalysis,
    state: State,
    reachability: OnceCell<Reachability>,
    packing: OnceCell<u32>,
    connectivity: OnceCell<u32>,
    room_connectivity: OnceCell<u32>,
    out_of_plan: OnceCell<u32>,
    hotspots: OnceCell<u32>,
    mobility: OnceCell<u32>,
}

impl<'a> StateAnalysis<'a> {
    #[must_use]
    pub fn new(level: &'a LevelAnalysis, state: &State) -> Self {
        Self {
            level,
            state: state.clone(),
            reachability: OnceCell::new(),
            packing: OnceCell::new(),
            connectivity: OnceCell::new(),
            room_connectivity: OnceCell::new(),
            out_of_plan: OnceCell::new(),
            hotspots: OnceCell::new(),
            mobility: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn level(&self) -> &'a LevelAnalysis {
        self.level
    }

    #[must_use]
    pub fn board(&self) -> &'a Board {
        self.level.board()
    }

    #[must_use]
    pub fn state(&self) -> &State {
        &self.state
    }

    #[must_use]
    pub fn reachability(&self) -> &Reachability {
        self.reachability
            .get_or_init(|| Reachability::compute(self.board(), &self.state))
    }

    /// Targets filled in packing order.
    #[must_use]
    pub fn packing(&self) -> u32 {
        *self
            .packing
            .get_or_init(|| self.level.plan().packed_count(self.board(), &self.state))
    }

    /// Connected components of squares holding neither wall nor box.
    #[must_use]
    pub fn connectivity(&self) -> u32 {
        *self.connectivity.get_or_init(|| {
            let board = self.board();
            let grid = self.state.box_grid(board);
            let mut seen = vec![false; board.len()];
            let mut components = 0;
            for start in board.floor_squares() {
                if seen[board.index(start)] || grid.has_box(start) {
                    continue;
                }
                components += 1;
                seen[board.index(start)] = true;
                let mut stack = vec![start];
                while let Some(pos) = stack.pop() {
                    for dir in Direction::ALL {
                        if let Some(next) = pos.step(dir)
                            && grid.is_free(board, next)
                            && !seen[board.index(next)]
                        {
                            seen[board.index(next)] = true;
                            stack.push(next);
                        }
                    }
                }
            }
            components
        })
    }

    /// Boxes parked on inter-room passages.
    #[must_use]
    pub fn room_connectivity(&self) -> u32 {
        *self
            .room_connectivity
            .get_or_init(|| self.level.rooms().room_connectivity(self.board(), &self.state))
    }

    #[must_use]
    pub fn out_of_plan(&self) -> u32 {
        *self
            .out_of_plan
            .get_or_init(|| self.level.plan().out_of_plan_count(self.board(), &self.state))
    }

    /// Boxes blocking target access for at least one other box.
    #[must_use]
    pub fn hotspots(&self) -> u32 {
        *self
            .hotspots
            .get_or_init(|| self.level.rooms().hotspot_count(self.board(), &self.state))
    }

    /// Single pushes currently available to the player.
    #[must_use]
    pub fn mobility(&self) -> u32 {
        *self.mobility.get_or_init(|| {
            let count = MoveGenerator::count_single_pushes(self.board(), &self.state);
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }
}
