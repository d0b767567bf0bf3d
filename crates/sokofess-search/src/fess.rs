//! Feature space search.
//!
//! The engine keeps a tree of distinct states and projects every node onto
//! the cell of its feature vector. Each outer iteration picks the next cell
//! in creation order (round robin), gathers the unexpanded moves of all nodes
//! in that cell, expands the one preferred by the weight scheme and inserts
//! the resulting state:
//!
//! - a new state becomes a new node, its candidate moves are simulated,
//!   filtered for deadlocks and weighted by the advisors
//! - a known state reached with a strictly lower accumulated weight is moved
//!   under the new parent
//! - anything else is dropped
//!
//! The run ends when a node is solved, when no cell has an unexpanded move
//! left, or when the time or node budget is exhausted. Budgets are checked
//! once per outer iteration.

use std::time::{Duration, Instant};

use sokofess_engine::{Level, MacroMove, MoveGenerator, MoveWeight, State, annotate_player_paths};
use sokofess_evaluator::{DeadlockDetector, FeatureCalculator, LevelAnalysis};
use tracing::{debug, info, trace, warn};

use crate::{
    advisor,
    candidate::SimulatedMove,
    config::SolverConfig,
    feature_space::{CellId, FeatureSpace},
    statistics::{SearchOutcome, SearchProgress, SearchStatistics, SearchStatus},
    tree::{NodeId, SearchTree},
    weight::{self, MoveOption, WeightedMove},
};

pub type ProgressCallback<'c> = dyn FnMut(&SearchProgress) + 'c;

/// Solver for one level. Static analysis is done once in [`FessSolver::new`];
/// each call to a `solve` method runs a fresh search.
#[derive(Debug)]
pub struct FessSolver {
    analysis: LevelAnalysis,
    config: SolverConfig,
    statistics: SearchStatistics,
}

impl FessSolver {
    #[must_use]
    pub fn new(level: &Level, config: SolverConfig) -> Self {
        let analysis = LevelAnalysis::with_min_room_size(level, config.min_room_size);
        Self {
            analysis,
            config,
            statistics: SearchStatistics::default(),
        }
    }

    #[must_use]
    pub fn analysis(&self) -> &LevelAnalysis {
        &self.analysis
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Statistics of the last search.
    #[must_use]
    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Solves the level from its initial state within the configured budgets.
    pub fn solve(&mut self) -> SearchOutcome {
        let initial = self.analysis.level().initial_state().clone();
        let max_time = self.config.time_limit();
        let max_nodes = self.config.max_nodes;
        self.run(&initial, max_time, max_nodes, None)
    }

    /// Like [`FessSolver::solve`], reporting progress every
    /// `progress_interval` iterations.
    pub fn solve_with_progress(&mut self, progress: &mut ProgressCallback<'_>) -> SearchOutcome {
        let initial = self.analysis.level().initial_state().clone();
        let max_time = self.config.time_limit();
        let max_nodes = self.config.max_nodes;
        self.run(&initial, max_time, max_nodes, Some(progress))
    }

    /// Solves from an arbitrary state with explicit budgets. `None` means no
    /// time budget.
    pub fn solve_from(
        &mut self,
        initial: &State,
        max_time: Option<Duration>,
        max_nodes: usize,
    ) -> SearchOutcome {
        self.run(initial, max_time, max_nodes, None)
    }

    fn run(
        &mut self,
        initial: &State,
        max_time: Option<Duration>,
        max_nodes: usize,
        progress: Option<&mut ProgressCallback<'_>>,
    ) -> SearchOutcome {
        let mut search = Search::new(&self.analysis, &self.config, max_time, max_nodes);
        let outcome = search.run(initial, progress);
        self.statistics = outcome.statistics.clone();
        outcome
    }
}

#[derive(Debug, Clone, Copy)]
struct Choice {
    cell: CellId,
    node: NodeId,
    index: usize,
}

/// State of one search run.
struct Search<'a> {
    analysis: &'a LevelAnalysis,
    calculator: FeatureCalculator<'a>,
    detector: DeadlockDetector<'a>,
    generator: MoveGenerator,
    progress_interval: usize,
    max_time: Option<Duration>,
    max_nodes: usize,
    started: Instant,
    tree: SearchTree,
    space: FeatureSpace,
    statistics: SearchStatistics,
    solved: Option<NodeId>,
}

impl<'a> Search<'a> {
    fn new(
        analysis: &'a LevelAnalysis,
        config: &SolverConfig,
        max_time: Option<Duration>,
        max_nodes: usize,
    ) -> Self {
        Self {
            analysis,
            calculator: FeatureCalculator::new(analysis),
            detector: DeadlockDetector::new(analysis, config.deadlock_mode),
            generator: config.move_generator(),
            progress_interval: config.progress_interval,
            max_time,
            max_nodes,
            started: Instant::now(),
            tree: SearchTree::new(),
            space: FeatureSpace::new(),
            statistics: SearchStatistics::default(),
            solved: None,
        }
    }

    fn run(
        &mut self,
        initial: &State,
        mut progress: Option<&mut ProgressCallback<'_>>,
    ) -> SearchOutcome {
        self.started = Instant::now();
        let board = self.analysis.board();
        let targets = board.targets().len();
        info!(
            event = "solve_start",
            boxes = initial.box_count(),
            targets,
            max_nodes = self.max_nodes,
            max_time_secs = self.max_time.map(|limit| limit.as_secs_f64()),
            deadlock_mode = %self.detector.mode(),
        );

        if !initial.fits(board) {
            warn!(
                player = %initial.player(),
                "initial state has a player or box off the floor of the level"
            );
            return self.finish(initial, SearchStatus::Exhausted);
        }
        if initial.box_count() != targets {
            warn!(
                boxes = initial.box_count(),
                targets, "box and target counts differ, level is unsolvable"
            );
            return self.finish(initial, SearchStatus::Exhausted);
        }
        if let Some(technique) = self.detector.detect(initial) {
            warn!(%technique, "initial state is deadlocked");
            self.statistics.deadlocks_detected += 1;
            return self.finish(initial, SearchStatus::Exhausted);
        }

        let unexpanded = self.weighted_candidates(initial);
        let features = self.calculator.features(initial);
        let root = self
            .tree
            .insert_root(initial.key(board), initial.clone(), features, unexpanded);
        self.space.project(features, root);
        if initial.is_solved(board) {
            self.solved = Some(root);
        }

        let mut iterations = 0;
        let mut current_cell = None;
        loop {
            if self.solved.is_some() {
                return self.finish(initial, SearchStatus::Solved);
            }
            if self.budget_exhausted() {
                return self.finish(initial, SearchStatus::TimedOut);
            }
            let Some(choice) = self.next_choice() else {
                return self.finish(initial, SearchStatus::Exhausted);
            };
            iterations += 1;
            if current_cell != Some(choice.cell) {
                let features = self.space.cell(choice.cell).features();
                debug!(cell = %choice.cell, %features, "switching cell");
                current_cell = Some(choice.cell);
            }
            self.expand(choice);

            if self.progress_interval > 0 && iterations % self.progress_interval == 0 {
                let snapshot = self.snapshot(iterations, current_cell);
                debug!(%snapshot, "search progress");
                if let Some(callback) = progress.as_deref_mut() {
                    callback(&snapshot);
                }
            }
        }
    }

    fn budget_exhausted(&self) -> bool {
        self.tree.len() >= self.max_nodes
            || self
                .max_time
                .is_some_and(|limit| self.started.elapsed() >= limit)
    }

    /// Picks the next cell, in cyclic order, that still has unexpanded moves
    /// and the best move in it.
    fn next_choice(&mut self) -> Option<Choice> {
        for _ in 0..self.space.len() {
            let cell = self.space.next_cell()?;
            let tree = &self.tree;
            let options = self.space.cell(cell).nodes().iter().flat_map(|&node| {
                let parent = tree.node(node);
                parent
                    .unexpanded()
                    .iter()
                    .enumerate()
                    .map(move |(index, weighted)| MoveOption {
                        node,
                        parent_weight: parent.weight(),
                        parent_features: parent.features(),
                        index,
                        weighted,
                    })
            });
            if let Some(best) = weight::select_best(options) {
                return Some(Choice {
                    cell,
                    node: best.node,
                    index: best.index,
                });
            }
        }
        None
    }

    fn expand(&mut self, choice: Choice) {
        let board = self.analysis.board();
        let weighted = self.tree.take_move(choice.node, choice.index);
        self.statistics.nodes_expanded += 1;
        match weighted.weight() {
            MoveWeight::Advised => self.statistics.advisor_moves_used += 1,
            MoveWeight::Difficult => self.statistics.difficult_moves_used += 1,
        }

        let next = match weighted.mv().apply(board, self.tree.node(choice.node).state()) {
            Ok(next) => next,
            Err(err) => {
                self.statistics.infeasible_moves += 1;
                debug!(%err, mv = %weighted.mv(), "discarding infeasible move");
                return;
            }
        };
        let key = next.key(board);
        if let Some(existing) = self.tree.find(&key) {
            if self.tree.reparent(existing, choice.node, weighted.into_move()) {
                trace!(node = %existing, parent = %choice.node, "reparented on cheaper path");
            }
            return;
        }

        let features = weighted.features();
        let unexpanded = self.weighted_candidates(&next);
        let solved = next.is_solved(board);
        let id = self.tree.insert_child(
            choice.node,
            weighted.into_move(),
            key,
            next,
            features,
            unexpanded,
        );
        let (cell, created) = self.space.project(features, id);
        if created {
            debug!(%cell, %features, "new feature space cell");
        }
        if solved {
            self.solved = Some(id);
        }
    }

    /// Simulates every generated move of `state`, drops infeasible and
    /// deadlocked results and weights the rest by the advisors.
    fn weighted_candidates(&mut self, state: &State) -> Vec<WeightedMove> {
        let board = self.analysis.board();
        let mut candidates = vec![];
        for mv in self.generator.generate(board, state) {
            match mv.apply(board, state) {
                Ok(next) => {
                    if let Some(technique) = self.detector.detect(&next) {
                        self.statistics.deadlocks_detected += 1;
                        trace!(%technique, mv = %mv, "pruned deadlocked move");
                        continue;
                    }
                    candidates.push(SimulatedMove::new(mv, self.calculator.analyze(&next)));
                }
                Err(err) => {
                    self.statistics.infeasible_moves += 1;
                    debug!(%err, mv = %mv, "discarding infeasible move");
                }
            }
        }
        let current = self.calculator.analyze(state);
        let recommendations = advisor::recommend(&current, &candidates);
        weight::assign_weights(&candidates, &recommendations)
    }

    fn snapshot(&self, iterations: usize, current_cell: Option<CellId>) -> SearchProgress {
        SearchProgress {
            iterations,
            nodes_expanded: self.statistics.nodes_expanded,
            total_nodes: self.tree.len(),
            feature_space_cells: self.space.len(),
            elapsed_secs: self.started.elapsed().as_secs_f64(),
            current_cell: current_cell.map(|cell| self.space.cell(cell).features()),
        }
    }

    fn solution(&self, initial: &State) -> Vec<MacroMove> {
        let Some(node) = self.solved else {
            return vec![];
        };
        let moves = self.tree.path_to(node);
        let level = Level::new(self.analysis.board().clone(), initial.clone());
        match annotate_player_paths(&level, &moves) {
            Ok(annotated) => annotated,
            Err(err) => {
                warn!(%err, "could not annotate player paths");
                moves
            }
        }
    }

    fn finish(&mut self, initial: &State, status: SearchStatus) -> SearchOutcome {
        let moves = self.solution(initial);
        let stats = &mut self.statistics;
        stats.total_nodes = self.tree.len();
        stats.feature_space_cells = self.space.len();
        stats.search_time = self.started.elapsed().as_secs_f64();
        stats.solution_length = moves.len();
        stats.solution_pushes = moves.iter().map(MacroMove::push_count).sum();
        info!(
            event = "solve_end",
            %status,
            nodes_expanded = stats.nodes_expanded,
            total_nodes = stats.total_nodes,
            cells = stats.feature_space_cells,
            deadlocks = stats.deadlocks_detected,
            solution_length = stats.solution_length,
            search_time = stats.search_time,
        );
        SearchOutcome {
            status,
            moves,
            statistics: self.statistics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use sokofess_engine::{Position, to_lurd, verify_solution};
    use sokofess_evaluator::DeadlockMode;

    use super::*;

    fn solve(art: &str) -> (Level, SearchOutcome) {
        let level = Level::from_ascii(art).unwrap();
        let mut solver = FessSolver::new(&level, SolverConfig::default());
        let outcome = solver.solve();
        assert_eq!(solver.statistics(), &outcome.statistics);
        (level, outcome)
    }

    #[test]
    fn test_single_push_corridor() {
        let (_, outcome) = solve("@$.");
        assert!(outcome.is_solved());
        assert_eq!(outcome.moves.len(), 1);
        let mv = &outcome.moves[0];
        assert_eq!((mv.from(), mv.to()), (Position::new(1, 0), Position::new(2, 0)));
        assert_eq!(mv.push_count(), 1);
        assert_eq!(mv.to_string(), "(B,1)-(C,1)");
        assert_eq!(outcome.statistics.solution_length, 1);
        assert_eq!(outcome.statistics.solution_pushes, 1);
    }

    #[test]
    fn test_walled_corridor() {
        let (level, outcome) = solve("#@$.#");
        assert!(outcome.is_solved());
        assert_eq!(outcome.moves.len(), 1);
        assert_eq!(outcome.moves[0].from(), Position::new(2, 0));
        assert!(verify_solution(&level, &outcome.moves));
        assert_eq!(to_lurd(&level, &outcome.moves).unwrap(), "R");
    }

    #[test]
    fn test_already_solved() {
        let (_, outcome) = solve(
            r"
            #####
            #@**#
            #####
            ",
        );
        assert_eq!(outcome.status, SearchStatus::Solved);
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.statistics.solution_length, 0);
    }

    #[test]
    fn test_corner_pushes_are_pruned_and_siblings_explored() {
        let art = r"
            ######
            #----#
            #-$@.#
            #----#
            ######
            ";
        let level = Level::from_ascii(art).unwrap();
        let analysis = LevelAnalysis::new(&level);
        let detector = DeadlockDetector::new(&analysis, DeadlockMode::Conservative);
        let cornered = State::new(Position::new(3, 2), vec![Position::new(1, 1)]);
        assert!(detector.is_deadlocked(&cornered));

        let (level, outcome) = solve(art);
        assert!(outcome.is_solved());
        assert!(outcome.statistics.deadlocks_detected > 0);
        assert!(verify_solution(&level, &outcome.moves));
    }

    #[test]
    fn test_no_live_moves_is_exhausted() {
        let (_, outcome) = solve(
            r"
            ######
            #-$@.#
            ######
            ",
        );
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert!(outcome.moves.is_empty());
        assert!(outcome.statistics.deadlocks_detected > 0);
    }

    #[test]
    fn test_box_target_mismatch_is_exhausted() {
        let (_, outcome) = solve("#@$..#");
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert_eq!(outcome.statistics.total_nodes, 0);
    }

    #[test]
    fn test_state_off_the_board_is_exhausted() {
        let level = Level::from_ascii("#@$.#").unwrap();
        let mut solver = FessSolver::new(&level, SolverConfig::default());
        let stray = State::new(Position::new(1, 0), vec![Position::new(40, 7)]);
        let outcome = solver.solve_from(&stray, None, 100);
        assert_eq!(outcome.status, SearchStatus::Exhausted);
        assert!(outcome.moves.is_empty());
        assert_eq!(outcome.statistics.total_nodes, 0);

        let in_wall = State::new(Position::new(1, 0), vec![Position::new(4, 0)]);
        let outcome = solver.solve_from(&in_wall, None, 100);
        assert_eq!(outcome.status, SearchStatus::Exhausted);
    }

    #[test]
    fn test_node_budget_times_out() {
        let level = Level::from_ascii(
            r"
            #######
            #-----#
            #-$@--#
            #----.#
            #######
            ",
        )
        .unwrap();
        let mut solver = FessSolver::new(&level, SolverConfig::default());
        let outcome = solver.solve_from(level.initial_state(), None, 1);
        assert_eq!(outcome.status, SearchStatus::TimedOut);
        assert_eq!(outcome.statistics.total_nodes, 1);
    }

    #[test]
    fn test_two_box_level() {
        let (level, outcome) = solve(
            r"
            ########
            #------#
            #-$--$-#
            #--##--#
            #-.--.-#
            #---@--#
            ########
            ",
        );
        assert!(outcome.is_solved());
        assert!(verify_solution(&level, &outcome.moves));
        assert!(outcome.moves.iter().all(|mv| mv.player_path().is_some()));
    }

    #[test]
    fn test_progress_callback_is_called() {
        let level = Level::from_ascii(
            r"
            ########
            #------#
            #-$--$-#
            #--##--#
            #-.--.-#
            #---@--#
            ########
            ",
        )
        .unwrap();
        let config = SolverConfig {
            progress_interval: 1,
            ..SolverConfig::default()
        };
        let mut solver = FessSolver::new(&level, config);
        let mut reports = vec![];
        let outcome = solver.solve_with_progress(&mut |p: &SearchProgress| reports.push(p.clone()));
        assert!(outcome.is_solved());
        assert_eq!(reports.len(), outcome.statistics.nodes_expanded);
        assert!(reports.windows(2).all(|w| w[0].iterations < w[1].iterations));
    }

    #[test]
    fn test_tree_invariants_hold_after_search() {
        let level = Level::from_ascii(
            r"
            #########
            #---#---#
            #-$-----#
            #-$-#-..#
            #-@-#---#
            #########
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let config = SolverConfig::default();
        let mut search = Search::new(&analysis, &config, None, 400);
        let _ = search.run(level.initial_state(), None);

        let board = level.board();
        let box_count = level.initial_state().box_count();
        for (id, node) in search.tree.iter() {
            assert_eq!(node.state().box_count(), box_count);
            assert_eq!(search.tree.find(&node.state().key(board)), Some(id));
            let cell = search.space.find(&node.features()).unwrap();
            assert!(search.space.cell(cell).nodes().contains(&id));
            assert_eq!(node.features(), search.calculator.features(node.state()));
            match (node.parent(), node.via()) {
                (Some(parent), Some(via)) => {
                    let parent = search.tree.node(parent);
                    assert!(via.weight().value() <= 1);
                    assert_eq!(node.weight(), parent.weight() + via.weight().value());
                    assert_eq!(node.depth(), parent.depth() + 1);
                    assert!(parent.children().contains(&id));
                }
                (None, None) => assert_eq!(id, NodeId(0)),
                _ => panic!("node {id} has a parent without a move"),
            }
        }
    }
}
