//! Individual state measurements.
//!
//! Each source reads one lazily computed metric off a [`StateAnalysis`] and
//! declares which direction counts as an improvement. Advisors compare a
//! source before and after a candidate move.

use std::fmt;

use crate::{feature::FeatureSignal, state_analysis::StateAnalysis};

#[must_use]
pub fn all_feature_sources() -> Vec<BoxedFeatureSource> {
    vec![
        // feature space axes
        Box::new(Packing),
        Box::new(Connectivity),
        Box::new(RoomConnectivity),
        Box::new(OutOfPlan),
        // advisor-only metrics
        Box::new(Hotspots),
        Box::new(Mobility),
    ]
}

pub trait FeatureSource: fmt::Debug + Send + Sync {
    #[must_use]
    fn id(&self) -> &str;
    #[must_use]
    fn name(&self) -> &str;
    #[must_use]
    fn signal(&self) -> FeatureSignal;
    #[must_use]
    fn clone_boxed(&self) -> BoxedFeatureSource;
    #[must_use]
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32;

    /// Strict improvement from `before` to `after`.
    #[must_use]
    fn improves(&self, before: &StateAnalysis<'_>, after: &StateAnalysis<'_>) -> bool {
        self.signal()
            .improves(self.extract_raw(before), self.extract_raw(after))
    }
}

pub type BoxedFeatureSource = Box<dyn FeatureSource>;

impl Clone for BoxedFeatureSource {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl FeatureSource for BoxedFeatureSource {
    fn id(&self) -> &str {
        self.as_ref().id()
    }

    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn signal(&self) -> FeatureSignal {
        self.as_ref().signal()
    }

    fn clone_boxed(&self) -> BoxedFeatureSource {
        self.as_ref().clone_boxed()
    }

    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        self.as_ref().extract_raw(analysis)
    }
}

/// Targets filled in packing-plan order.
///
/// Counts targets along the plan's order until the first empty one, so a box
/// parked on a target that must be filled later does not count. Without a
/// valid plan every box on a target counts.
#[derive(Debug, Clone)]
pub struct Packing;

impl FeatureSource for Packing {
    fn id(&self) -> &'static str {
        "packing"
    }
    fn name(&self) -> &'static str {
        "Packing"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Positive
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.packing()
    }
}

/// Connected components of squares free of walls and boxes.
#[derive(Debug, Clone)]
pub struct Connectivity;

impl FeatureSource for Connectivity {
    fn id(&self) -> &'static str {
        "connectivity"
    }
    fn name(&self) -> &'static str {
        "Connectivity"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Negative
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.connectivity()
    }
}

/// Boxes standing on passages between rooms.
#[derive(Debug, Clone)]
pub struct RoomConnectivity;

impl FeatureSource for RoomConnectivity {
    fn id(&self) -> &'static str {
        "room_connectivity"
    }
    fn name(&self) -> &'static str {
        "Room Connectivity"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Negative
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.room_connectivity()
    }
}

/// Boxes off target and outside the sink basin.
#[derive(Debug, Clone)]
pub struct OutOfPlan;

impl FeatureSource for OutOfPlan {
    fn id(&self) -> &'static str {
        "out_of_plan"
    }
    fn name(&self) -> &'static str {
        "Out of Plan"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Negative
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.out_of_plan()
    }
}

/// Boxes that cut at least one other box off from a target.
#[derive(Debug, Clone)]
pub struct Hotspots;

impl FeatureSource for Hotspots {
    fn id(&self) -> &'static str {
        "hotspots"
    }
    fn name(&self) -> &'static str {
        "Hotspots"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Negative
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.hotspots()
    }
}

/// Single pushes available to the player.
#[derive(Debug, Clone)]
pub struct Mobility;

impl FeatureSource for Mobility {
    fn id(&self) -> &'static str {
        "mobility"
    }
    fn name(&self) -> &'static str {
        "Mobility"
    }
    fn signal(&self) -> FeatureSignal {
        FeatureSignal::Positive
    }
    fn clone_boxed(&self) -> BoxedFeatureSource {
        Box::new(self.clone())
    }
    fn extract_raw(&self, analysis: &StateAnalysis<'_>) -> u32 {
        analysis.mobility()
    }
}
