use sokofess_engine::{MacroMove, State};
use sokofess_evaluator::{FeatureCalculator, FeatureVector, StateAnalysis};

/// A candidate move paired with the analysis of the state it leads to.
///
/// Advisors compare these against the current state; metrics are computed on
/// demand and cached, so each candidate pays only for what is asked of it.
#[derive(Debug)]
pub struct SimulatedMove<'a> {
    mv: MacroMove,
    analysis: StateAnalysis<'a>,
}

impl<'a> SimulatedMove<'a> {
    #[must_use]
    pub fn new(mv: MacroMove, analysis: StateAnalysis<'a>) -> Self {
        Self { mv, analysis }
    }

    #[must_use]
    pub fn mv(&self) -> &MacroMove {
        &self.mv
    }

    #[must_use]
    pub fn state(&self) -> &State {
        self.analysis.state()
    }

    #[must_use]
    pub fn analysis(&self) -> &StateAnalysis<'a> {
        &self.analysis
    }

    #[must_use]
    pub fn features(&self) -> FeatureVector {
        FeatureCalculator::vector_of(&self.analysis)
    }
}
