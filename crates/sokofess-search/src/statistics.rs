use std::fmt;

use serde::{Deserialize, Serialize};
use sokofess_engine::MacroMove;
use sokofess_evaluator::FeatureVector;

/// Counters of one search run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStatistics {
    /// Moves taken off the unexpanded lists and simulated.
    pub nodes_expanded: usize,
    /// Distinct states in the search tree.
    pub total_nodes: usize,
    pub feature_space_cells: usize,
    /// Child states discarded as dead, plus a dead root.
    pub deadlocks_detected: usize,
    /// Expansions of weight-0 (advised) moves.
    pub advisor_moves_used: usize,
    /// Expansions of weight-1 moves.
    pub difficult_moves_used: usize,
    pub infeasible_moves: usize,
    /// Wall-clock seconds.
    pub search_time: f64,
    /// Macro moves in the solution, 0 when none was found.
    pub solution_length: usize,
    pub solution_pushes: usize,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[display("solved")]
    Solved,
    /// No unexpanded move is left anywhere in the feature space.
    #[display("exhausted")]
    Exhausted,
    /// The time or node budget ran out.
    #[display("timed out")]
    TimedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    pub moves: Vec<MacroMove>,
    pub statistics: SearchStatistics,
}

impl SearchOutcome {
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.status.is_solved()
    }

    /// The solution, if one was found.
    #[must_use]
    pub fn solution(&self) -> Option<&[MacroMove]> {
        self.is_solved().then_some(self.moves.as_slice())
    }
}

/// Snapshot handed to the progress callback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchProgress {
    pub iterations: usize,
    pub nodes_expanded: usize,
    pub total_nodes: usize,
    pub feature_space_cells: usize,
    pub elapsed_secs: f64,
    /// Cell the last expansion was taken from.
    pub current_cell: Option<FeatureVector>,
}

impl fmt::Display for SearchProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iter {}: {} expanded, {} nodes, {} cells, {:.1}s",
            self.iterations,
            self.nodes_expanded,
            self.total_nodes,
            self.feature_space_cells,
            self.elapsed_secs
        )?;
        if let Some(cell) = &self.current_cell {
            write!(f, ", cell {cell}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_serialize_with_field_names() {
        let stats = SearchStatistics {
            nodes_expanded: 3,
            solution_length: 1,
            ..SearchStatistics::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["nodes_expanded"], 3);
        assert_eq!(json["solution_length"], 1);
        assert_eq!(json["deadlocks_detected"], 0);
    }

    #[test]
    fn test_progress_display() {
        let progress = SearchProgress {
            iterations: 1000,
            nodes_expanded: 990,
            total_nodes: 812,
            feature_space_cells: 14,
            elapsed_secs: 1.24,
            current_cell: Some(FeatureVector {
                packing: 2,
                connectivity: 1,
                room_connectivity: 0,
                out_of_plan: 3,
            }),
        };
        assert_eq!(
            progress.to_string(),
            "iter 1000: 990 expanded, 812 nodes, 14 cells, 1.2s, cell [2, 1, 0, 3]"
        );
    }

    #[test]
    fn test_unsolved_outcome_has_no_solution() {
        let outcome = SearchOutcome {
            status: SearchStatus::TimedOut,
            moves: vec![],
            statistics: SearchStatistics::default(),
        };
        assert!(!outcome.is_solved());
        assert!(outcome.solution().is_none());
    }
}
