//! Move recommendations.
//!
//! Each advisor looks at the current state and the simulated candidates and
//! recommends at most one move that strictly improves the metric it watches:
//!
//! | Advisor | Metric | Better when |
//! |---------|--------|-------------|
//! | [`Advisor::OutOfPlan`] | boxes outside the sink basin | lower |
//! | [`Advisor::Opener`] | boxes blocked by the most disruptive hotspot | lower |
//! | [`Advisor::Packing`] | targets filled in plan order | higher |
//! | [`Advisor::Connectivity`] | free-square components | lower |
//! | [`Advisor::RoomConnectivity`] | boxes on passages | lower |
//! | [`Advisor::Hotspots`] | boxes blocking other boxes | lower |
//! | [`Advisor::Explorer`] | available single pushes | higher |
//!
//! The opener only considers moves of the hotspot box and rejects moves that
//! increase connectivity. Among improving candidates the largest gain wins,
//! then the smallest move in board order.

use serde::{Deserialize, Serialize};
use sokofess_evaluator::{
    StateAnalysis,
    feature::{self, FeatureSource},
};

use crate::candidate::SimulatedMove;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Advisor {
    #[display("out-of-plan")]
    OutOfPlan,
    #[display("opener")]
    Opener,
    #[display("packing")]
    Packing,
    #[display("connectivity")]
    Connectivity,
    #[display("room-connectivity")]
    RoomConnectivity,
    #[display("hotspots")]
    Hotspots,
    #[display("explorer")]
    Explorer,
}

/// One advisor's pick, as an index into the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recommendation {
    pub advisor: Advisor,
    pub candidate: usize,
}

impl Advisor {
    /// All advisors in priority order.
    pub const ALL: [Self; 7] = [
        Self::OutOfPlan,
        Self::Opener,
        Self::Packing,
        Self::Connectivity,
        Self::RoomConnectivity,
        Self::Hotspots,
        Self::Explorer,
    ];

    /// Metric watched by the advisor; the opener's hotspot disruption has no
    /// standalone source.
    #[must_use]
    pub fn source(self) -> Option<&'static dyn FeatureSource> {
        match self {
            Self::OutOfPlan => Some(&feature::OutOfPlan),
            Self::Opener => None,
            Self::Packing => Some(&feature::Packing),
            Self::Connectivity => Some(&feature::Connectivity),
            Self::RoomConnectivity => Some(&feature::RoomConnectivity),
            Self::Hotspots => Some(&feature::Hotspots),
            Self::Explorer => Some(&feature::Mobility),
        }
    }

    /// Index of the recommended candidate, if any candidate improves the
    /// advisor's metric.
    #[must_use]
    pub fn suggest(
        self,
        current: &StateAnalysis<'_>,
        candidates: &[SimulatedMove<'_>],
    ) -> Option<usize> {
        match self.source() {
            Some(source) => {
                let before = source.extract_raw(current);
                let gains = candidates.iter().enumerate().map(|(i, candidate)| {
                    let after = source.extract_raw(candidate.analysis());
                    (source.signal().gain(before, after), i)
                });
                pick_best(candidates, gains)
            }
            None => suggest_opening(current, candidates),
        }
    }
}

/// Runs every advisor in priority order.
#[must_use]
pub fn recommend(
    current: &StateAnalysis<'_>,
    candidates: &[SimulatedMove<'_>],
) -> Vec<Recommendation> {
    Advisor::ALL
        .into_iter()
        .filter_map(|advisor| {
            advisor
                .suggest(current, candidates)
                .map(|candidate| Recommendation { advisor, candidate })
        })
        .collect()
}

fn suggest_opening(
    current: &StateAnalysis<'_>,
    candidates: &[SimulatedMove<'_>],
) -> Option<usize> {
    let board = current.board();
    let rooms = current.level().rooms();
    let hotspot = rooms.find_most_disruptive_hotspot(board, current.state())?;
    let before = rooms.disruption(board, current.state(), hotspot);
    let connectivity = feature::Connectivity;
    let signal = connectivity.signal();
    let connected = connectivity.extract_raw(current);

    let gains = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.mv().from() == hotspot)
        .filter(|(_, c)| !signal.worsens(connected, connectivity.extract_raw(c.analysis())))
        .map(|(i, c)| {
            let after = rooms.disruption(board, c.state(), c.mv().to());
            (i64::from(before) - i64::from(after), i)
        });
    pick_best(candidates, gains)
}

/// Highest strictly positive gain; ties go to the smallest move.
fn pick_best<I>(candidates: &[SimulatedMove<'_>], gains: I) -> Option<usize>
where
    I: Iterator<Item = (i64, usize)>,
{
    gains
        .filter(|(gain, _)| *gain > 0)
        .max_by(|(ga, a), (gb, b)| {
            ga.cmp(gb).then_with(|| {
                candidates[*b]
                    .mv()
                    .sort_key()
                    .cmp(&candidates[*a].mv().sort_key())
            })
        })
        .map(|(_, i)| i)
}

#[cfg(test)]
mod tests {
    use sokofess_engine::{Level, MoveGenerator, Position};
    use sokofess_evaluator::{FeatureCalculator, LevelAnalysis};

    use super::*;

    fn simulate<'a>(calculator: &FeatureCalculator<'a>, level: &Level) -> Vec<SimulatedMove<'a>> {
        let board = level.board();
        let state = level.initial_state();
        MoveGenerator::new(2)
            .generate(board, state)
            .into_iter()
            .map(|mv| {
                let next = mv.apply(board, state).unwrap();
                SimulatedMove::new(mv, calculator.analyze(&next))
            })
            .collect()
    }

    #[test]
    fn test_out_of_plan_comes_first() {
        assert_eq!(Advisor::ALL[0], Advisor::OutOfPlan);
        assert_eq!(Advisor::ALL[1], Advisor::Opener);
        assert_eq!(Advisor::ALL[6], Advisor::Explorer);
        assert!(Advisor::Opener.source().is_none());
    }

    #[test]
    fn test_opener_clears_the_doorway() {
        // the box in the doorway cuts the left room off from both targets
        let level = Level::from_ascii(
            r"
            #########
            #---#---#
            #$--$--.#
            #---#-@.#
            #########
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);

        let pick = Advisor::Opener.suggest(&current, &candidates).unwrap();
        let mv = candidates[pick].mv();
        assert_eq!((mv.from(), mv.to()), (Position::new(4, 2), Position::new(2, 2)));

        let recommendations = recommend(&current, &candidates);
        let advisors: Vec<Advisor> = recommendations.iter().map(|r| r.advisor).collect();
        let opener = advisors.iter().position(|a| *a == Advisor::Opener).unwrap();
        let connectivity = advisors
            .iter()
            .position(|a| *a == Advisor::Connectivity)
            .unwrap();
        assert!(opener < connectivity);
        assert_eq!(recommendations[connectivity].candidate, pick);
    }

    #[test]
    fn test_out_of_plan_box_returns_to_the_sink() {
        // pushing the right box into the sink basin needs the player on the other target
        let level = Level::from_ascii(
            r"
            ########
            ##--#--#
            #--$#$-#
            #--.-@.#
            #------#
            ########
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);
        assert_eq!(current.out_of_plan(), 1);

        let pick = Advisor::OutOfPlan.suggest(&current, &candidates).unwrap();
        let mv = candidates[pick].mv();
        assert_eq!((mv.from(), mv.to()), (Position::new(5, 2), Position::new(4, 3)));
        assert!(analysis.plan().in_sink(level.board(), mv.to()));
        assert_eq!(candidates[pick].analysis().out_of_plan(), 0);
    }

    #[test]
    fn test_explorer_frees_the_boxed_in_box() {
        let level = Level::from_ascii(
            r"
            ########
            ##--#--#
            #--$#$-#
            #--.-@.#
            #------#
            ########
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);
        assert_eq!(current.mobility(), 4);

        // three moves reach six pushes; the smallest one wins
        let pick = Advisor::Explorer.suggest(&current, &candidates).unwrap();
        let mv = candidates[pick].mv();
        assert_eq!((mv.from(), mv.to()), (Position::new(3, 2), Position::new(2, 3)));
        assert_eq!(candidates[pick].analysis().mobility(), 6);
    }

    #[test]
    fn test_opener_rejects_a_push_that_splits_the_floor() {
        // the only push clears the hotspot but walls off both ends of the left column
        let level = Level::from_ascii(
            r"
            #######
            #-$#-@#
            #-$.-.#
            #-#---#
            #######
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);
        assert_eq!(candidates.len(), 1);
        let board = level.board();
        let rooms = analysis.rooms();
        assert_eq!(
            rooms.find_most_disruptive_hotspot(board, level.initial_state()),
            Some(Position::new(2, 2))
        );
        assert_eq!(current.connectivity(), 2);
        assert_eq!(candidates[0].analysis().connectivity(), 3);

        assert_eq!(Advisor::Opener.suggest(&current, &candidates), None);
        assert_eq!(Advisor::Connectivity.suggest(&current, &candidates), None);
    }

    #[test]
    fn test_hotspots_accepts_what_the_opener_rejects() {
        let level = Level::from_ascii(
            r"
            #######
            #-$#-@#
            #-$.-.#
            #-#---#
            #######
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);
        assert_eq!(current.hotspots(), 1);

        let pick = Advisor::Hotspots.suggest(&current, &candidates).unwrap();
        let mv = candidates[pick].mv();
        assert_eq!((mv.from(), mv.to()), (Position::new(2, 2), Position::new(1, 2)));
        assert_eq!(candidates[pick].analysis().hotspots(), 0);
    }

    #[test]
    fn test_no_improvement_no_suggestion() {
        let level = Level::from_ascii(
            r"
            #######
            #-----#
            #-@$.-#
            #-----#
            #######
            ",
        )
        .unwrap();
        let analysis = LevelAnalysis::new(&level);
        let calculator = FeatureCalculator::new(&analysis);
        let current = calculator.analyze(level.initial_state());
        let candidates = simulate(&calculator, &level);
        assert_eq!(Advisor::Opener.suggest(&current, &candidates), None);
        assert_eq!(Advisor::RoomConnectivity.suggest(&current, &candidates), None);
        assert_eq!(Advisor::Hotspots.suggest(&current, &candidates), None);
        let packing = Advisor::Packing.suggest(&current, &candidates).unwrap();
        assert_eq!(candidates[packing].mv().to(), Position::new(4, 2));
    }
}
