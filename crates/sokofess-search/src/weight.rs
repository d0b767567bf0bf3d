//! The 0:1 weight scheme.
//!
//! A move recommended by any advisor costs 0, every other move costs 1. The
//! search always expands the move with the smallest accumulated weight
//! (`parent weight + move weight`) in the chosen cell. Ties are broken by the
//! progress the move makes in feature space (see
//! [`FeatureVector::progress_to`]), then in favour of weight-0 moves, then by
//! node and move order so the choice never depends on hash iteration.

use std::cmp::Ordering;

use sokofess_engine::{MacroMove, MoveWeight};
use sokofess_evaluator::FeatureVector;

use crate::{advisor::Recommendation, candidate::SimulatedMove, tree::NodeId};

/// An unexpanded move with its weight and the features of its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedMove {
    mv: MacroMove,
    features: FeatureVector,
}

impl WeightedMove {
    #[must_use]
    pub fn new(mv: MacroMove, features: FeatureVector) -> Self {
        Self { mv, features }
    }

    #[must_use]
    pub fn mv(&self) -> &MacroMove {
        &self.mv
    }

    #[must_use]
    pub fn into_move(self) -> MacroMove {
        self.mv
    }

    #[must_use]
    pub fn weight(&self) -> MoveWeight {
        self.mv.weight()
    }

    /// Features of the state the move leads to.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        self.features
    }
}

/// Weight 0 for every recommended candidate, weight 1 for the rest.
#[must_use]
pub fn assign_weights(
    candidates: &[SimulatedMove<'_>],
    recommendations: &[Recommendation],
) -> Vec<WeightedMove> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let weight = if recommendations.iter().any(|r| r.candidate == i) {
                MoveWeight::Advised
            } else {
                MoveWeight::Difficult
            };
            WeightedMove::new(candidate.mv().clone().with_weight(weight), candidate.features())
        })
        .collect()
}

/// One unexpanded move of one node, as seen by [`select_best`].
#[derive(Debug, Clone, Copy)]
pub struct MoveOption<'m> {
    pub node: NodeId,
    pub parent_weight: u32,
    pub parent_features: FeatureVector,
    /// Position in the node's unexpanded list.
    pub index: usize,
    pub weighted: &'m WeightedMove,
}

impl MoveOption<'_> {
    #[must_use]
    pub fn accumulated_weight(&self) -> u32 {
        self.parent_weight + self.weighted.weight().value()
    }

    #[must_use]
    pub fn progress(&self) -> i64 {
        self.parent_features.progress_to(&self.weighted.features())
    }

    /// `Less` when `self` should be expanded before `other`.
    fn preference(&self, other: &Self) -> Ordering {
        self.accumulated_weight()
            .cmp(&other.accumulated_weight())
            .then_with(|| other.progress().cmp(&self.progress()))
            .then_with(|| self.weighted.weight().cmp(&other.weighted.weight()))
            .then_with(|| self.node.cmp(&other.node))
            .then_with(|| {
                self.weighted
                    .mv()
                    .sort_key()
                    .cmp(&other.weighted.mv().sort_key())
            })
    }
}

/// The option to expand next.
#[must_use]
pub fn select_best<'m, I>(options: I) -> Option<MoveOption<'m>>
where
    I: IntoIterator<Item = MoveOption<'m>>,
{
    options.into_iter().min_by(MoveOption::preference)
}

#[cfg(test)]
mod tests {
    use sokofess_engine::{Direction, Level, MoveGenerator, Position};
    use sokofess_evaluator::{FeatureCalculator, LevelAnalysis};

    use crate::advisor::{Advisor, recommend};

    use super::*;

    fn weighted(
        from: Position,
        dir: Direction,
        weight: MoveWeight,
        features: FeatureVector,
    ) -> WeightedMove {
        let mv = MacroMove::from_pushes(from, &[dir]).unwrap().with_weight(weight);
        WeightedMove::new(mv, features)
    }

    fn option(node: usize, parent_weight: u32, weighted: &WeightedMove) -> MoveOption<'_> {
        MoveOption {
            node: NodeId(node),
            parent_weight,
            parent_features: FeatureVector::default(),
            index: 0,
            weighted,
        }
    }

    #[test]
    fn test_lowest_accumulated_weight_wins() {
        let flat = FeatureVector::default();
        let better = FeatureVector {
            packing: 3,
            ..flat
        };
        let cheap = weighted(Position::new(5, 5), Direction::Up, MoveWeight::Difficult, flat);
        let advised = weighted(Position::new(1, 1), Direction::Up, MoveWeight::Advised, better);
        // weight 1 + 1 against 2 + 0: equal, packing progress decides
        let best = select_best([option(0, 1, &cheap), option(1, 2, &advised)]).unwrap();
        assert_eq!(best.node, NodeId(1));
        // 0 + 1 beats 2 + 0 whatever the progress
        let best = select_best([option(0, 0, &cheap), option(1, 2, &advised)]).unwrap();
        assert_eq!(best.node, NodeId(0));
    }

    #[test]
    fn test_weight_zero_breaks_progress_ties() {
        let flat = FeatureVector::default();
        let hard = weighted(Position::new(1, 1), Direction::Up, MoveWeight::Difficult, flat);
        let advised = weighted(Position::new(2, 2), Direction::Up, MoveWeight::Advised, flat);
        let best = select_best([option(0, 0, &hard), option(1, 1, &advised)]).unwrap();
        assert_eq!(best.weighted.weight(), MoveWeight::Advised);
    }

    #[test]
    fn test_order_is_stable_for_identical_options() {
        let flat = FeatureVector::default();
        let a = weighted(Position::new(1, 1), Direction::Up, MoveWeight::Difficult, flat);
        let b = weighted(Position::new(1, 1), Direction::Down, MoveWeight::Difficult, flat);
        let forward = select_best([option(3, 0, &a), option(3, 0, &b)]).unwrap();
        let backward = select_best([option(3, 0, &b), option(3, 0, &a)]).unwrap();
        assert_eq!(forward.weighted, backward.weighted);
    }

    #[test]
    fn test_packing_move_is_weighted_zero_and_selected() {
        // the box can go four ways, only one of them onto the target
        let level = Level::from_ascii(
            r"
            #######
            #-----#
            #--$.-#
            #-@---#
            #-----#
            #######
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let state = level.initial_state();
        let board = level.board();
        let current = calculator.analyze(state);
        let mut moves = MoveGenerator::new(1).generate(board, state);
        moves.reverse();

        let candidates: Vec<SimulatedMove<'_>> = moves
            .into_iter()
            .map(|mv| {
                let next = mv.apply(board, state).unwrap();
                SimulatedMove::new(mv, calculator.analyze(&next))
            })
            .collect();
        let packing = Advisor::Packing.suggest(&current, &candidates).unwrap();
        assert_eq!(candidates.len(), 4);
        assert_eq!(candidates[packing].mv().to(), Position::new(4, 2));

        let recommendations = recommend(&current, &candidates);
        let weights = assign_weights(&candidates, &recommendations);
        assert_eq!(weights[packing].weight(), MoveWeight::Advised);

        let root = calculator.features(state);
        let best = select_best(weights.iter().enumerate().map(|(index, weighted)| MoveOption {
            node: NodeId(0),
            parent_weight: 0,
            parent_features: root,
            index,
            weighted,
        }))
        .unwrap();
        assert_eq!(best.index, packing);
    }
}
