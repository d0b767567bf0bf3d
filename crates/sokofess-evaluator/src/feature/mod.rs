//! Projection of states onto the four-dimensional feature space.
//!
//! The search groups nodes by their [`FeatureVector`]:
//!
//! - **packing** - targets filled following the packing plan (higher is better)
//! - **connectivity** - components of free squares (lower is better)
//! - **room connectivity** - boxes parked on inter-room passages (lower is better)
//! - **out of plan** - boxes off target outside the sink basin (lower is better)
//!
//! The vector is always recomputed from the state; nothing is patched
//! incrementally. Individual measurements are exposed as [`FeatureSource`]
//! implementations (see [`source`]), together with the two auxiliary metrics
//! used only by advisors: hotspots and mobility.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sokofess_engine::State;

use crate::{level_analysis::LevelAnalysis, state_analysis::StateAnalysis};

pub use self::source::{
    BoxedFeatureSource, Connectivity, FeatureSource, Hotspots, Mobility, OutOfPlan, Packing,
    RoomConnectivity, all_feature_sources,
};

pub mod source;

/// Which way a measurement should move for the state to get better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSignal {
    Positive,
    Negative,
}

impl FeatureSignal {
    /// Signed improvement from `before` to `after`; positive is better.
    #[must_use]
    pub fn gain(self, before: u32, after: u32) -> i64 {
        let delta = i64::from(after) - i64::from(before);
        match self {
            Self::Positive => delta,
            Self::Negative => -delta,
        }
    }

    #[must_use]
    pub fn improves(self, before: u32, after: u32) -> bool {
        self.gain(before, after) > 0
    }

    #[must_use]
    pub fn worsens(self, before: u32, after: u32) -> bool {
        self.gain(before, after) < 0
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[display("[{packing}, {connectivity}, {room_connectivity}, {out_of_plan}]")]
pub struct FeatureVector {
    pub packing: u32,
    pub connectivity: u32,
    pub room_connectivity: u32,
    pub out_of_plan: u32,
}

impl FeatureVector {
    /// Lexicographic progress score of moving from `self` to `next`: out of
    /// plan weighs most, then packing, connectivity and room connectivity.
    #[must_use]
    pub fn progress_to(&self, next: &Self) -> i64 {
        1000 * FeatureSignal::Negative.gain(self.out_of_plan, next.out_of_plan)
            + 100 * FeatureSignal::Positive.gain(self.packing, next.packing)
            + 10 * FeatureSignal::Negative.gain(self.connectivity, next.connectivity)
            + FeatureSignal::Negative.gain(self.room_connectivity, next.room_connectivity)
    }

    /// Orders vectors by progress score relative to a common origin.
    #[must_use]
    pub fn cmp_progress(origin: &Self, a: &Self, b: &Self) -> Ordering {
        origin.progress_to(a).cmp(&origin.progress_to(b))
    }
}

/// Maps states to feature vectors for one level.
#[derive(Debug, Clone, Copy)]
pub struct FeatureCalculator<'a> {
    level: &'a LevelAnalysis,
}

impl<'a> FeatureCalculator<'a> {
    #[must_use]
    pub fn new(level: &'a LevelAnalysis) -> Self {
        Self { level }
    }

    #[must_use]
    pub fn level(&self) -> &'a LevelAnalysis {
        self.level
    }

    #[must_use]
    pub fn analyze(&self, state: &State) -> StateAnalysis<'a> {
        StateAnalysis::new(self.level, state)
    }

    #[must_use]
    pub fn features(&self, state: &State) -> FeatureVector {
        Self::vector_of(&self.analyze(state))
    }

    #[must_use]
    pub fn vector_of(analysis: &StateAnalysis<'_>) -> FeatureVector {
        FeatureVector {
            packing: analysis.packing(),
            connectivity: analysis.connectivity(),
            room_connectivity: analysis.room_connectivity(),
            out_of_plan: analysis.out_of_plan(),
        }
    }
}

#[cfg(test)]
mod tests {
    use sokofess_engine::{Level, Position};

    use super::*;

    #[test]
    fn test_features_of_simple_push() {
        let level = Level::from_ascii(
            r"
            #######
            #@$--.#
            #######
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let start = calculator.features(level.initial_state());
        assert_eq!(
            start,
            FeatureVector {
                packing: 0,
                connectivity: 2,
                room_connectivity: 0,
                out_of_plan: 0,
            }
        );
        let solved = State::new(Position::new(4, 1), vec![Position::new(5, 1)]);
        let end = calculator.features(&solved);
        assert_eq!(end.packing, 1);
        assert_eq!(end.connectivity, 1);
        assert_eq!(start.progress_to(&end), 100 + 10);
        assert_eq!(end.to_string(), "[1, 1, 0, 0]");
    }

    #[test]
    fn test_features_are_deterministic() {
        let level = Level::from_ascii(
            r"
            ########
            #@-$--.#
            #--$--.#
            ########
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let a = calculator.features(level.initial_state());
        let b = calculator.features(level.initial_state());
        assert_eq!(a, b);
    }

    #[test]
    fn test_vector_serializes_with_named_fields() {
        let vector = FeatureVector {
            packing: 2,
            ..FeatureVector::default()
        };
        let json = serde_json::to_value(vector).unwrap();
        assert_eq!(json["packing"], 2);
        assert_eq!(json["room_connectivity"], 0);
    }

    #[test]
    fn test_signal_gain() {
        assert_eq!(FeatureSignal::Positive.gain(1, 3), 2);
        assert_eq!(FeatureSignal::Negative.gain(1, 3), -2);
        assert!(FeatureSignal::Negative.improves(2, 1));
        assert!(!FeatureSignal::Negative.improves(1, 1));
        assert!(FeatureSignal::Positive.worsens(1, 0));
    }

    #[test]
    fn test_out_of_plan_dominates_progress() {
        let origin = FeatureVector {
            packing: 0,
            connectivity: 1,
            room_connectivity: 1,
            out_of_plan: 2,
        };
        let packs = FeatureVector {
            packing: 1,
            ..origin
        };
        let returns = FeatureVector {
            out_of_plan: 1,
            ..origin
        };
        assert_eq!(
            FeatureVector::cmp_progress(&origin, &returns, &packs),
            Ordering::Greater
        );
    }
}
