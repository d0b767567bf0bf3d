//! Static and per-state analysis of Sokoban positions.
//!
//! Level-wide tables are built once into a [`LevelAnalysis`]:
//!
//! - [`push_reach`] - lone-box reachability per target and dead squares
//! - [`room`] - rooms, the passages between them and the hotspot relation
//! - [`packing_plan`] - sink basin and retrograde packing order
//!
//! Per-state work goes through [`StateAnalysis`], which caches each metric on
//! first use. On top of it sit the [`FeatureCalculator`] projecting states onto
//! the feature space and the [`DeadlockDetector`].

pub use self::{
    deadlock::{DeadlockDetector, DeadlockMode, DeadlockTechnique},
    feature::{FeatureCalculator, FeatureSignal, FeatureVector},
    level_analysis::LevelAnalysis,
    state_analysis::StateAnalysis,
};

pub mod deadlock;
pub mod feature;
mod level_analysis;
pub mod packing_plan;
pub mod push_reach;
pub mod room;
mod state_analysis;
