//! Random descent (stochastic hill climbing).

use std::sync::Arc;

use wander_core::error::Result;
use wander_core::neigh::Neighbourhood;
use wander_core::problem::DeltaProblem;
use wander_core::solution::Solution;

use crate::neigh_search::NeighbourhoodSearchCore;
use crate::search::{Search, SearchCore};

/// Basic stochastic hill climber.
///
/// Every step samples a single random move from the neighbourhood and
/// accepts it iff it yields a valid improvement. The search stops itself
/// only when the neighbourhood cannot generate any move; add a stop
/// criterion for bounded runs.
pub struct RandomDescent<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    ns: NeighbourhoodSearchCore<S, P, N>,
}

impl<S, P, N> RandomDescent<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    /// Creates a random descent search with the default name.
    pub fn new(problem: Arc<P>, neighbourhood: N) -> Self {
        Self::with_name("RandomDescent", problem, neighbourhood)
    }

    /// Creates a random descent search with a custom name.
    pub fn with_name(name: impl Into<String>, problem: Arc<P>, neighbourhood: N) -> Self {
        Self {
            ns: NeighbourhoodSearchCore::new(name, problem, neighbourhood),
        }
    }

    /// The embedded neighbourhood search state.
    pub fn neighbourhood_search(&self) -> &NeighbourhoodSearchCore<S, P, N> {
        &self.ns
    }

    /// The embedded neighbourhood search state, mutably.
    pub fn neighbourhood_search_mut(&mut self) -> &mut NeighbourhoodSearchCore<S, P, N> {
        &mut self.ns
    }
}

impl<S, P, N> Search<S, P> for RandomDescent<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    fn core(&self) -> &SearchCore<S, P> {
        self.ns.core()
    }

    fn core_mut(&mut self) -> &mut SearchCore<S, P> {
        self.ns.core_mut()
    }

    fn search_started(&mut self) -> Result<()> {
        self.ns.on_search_started();
        Ok(())
    }

    fn search_step(&mut self) -> Result<()> {
        match self.ns.random_move() {
            Some(mv) => {
                if self.ns.is_improvement(&mv)? {
                    self.ns.accept(&mv)?;
                } else {
                    self.ns.reject(&mv);
                }
                Ok(())
            }
            None => {
                // exhausted neighbourhood: nothing left to try
                self.stop();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{one_max_arc, FlipNeighbourhood};
    use wander_core::eval::Evaluation;
    use wander_core::status::SearchStatus;

    #[test]
    fn improves_and_never_worsens_best() {
        let mut search = RandomDescent::new(one_max_arc::<12>(), FlipNeighbourhood);
        search.core_mut().set_seed(42).unwrap();
        search.core_mut().set_step_budget(Some(300));
        search.start().unwrap();
        assert_eq!(search.status(), SearchStatus::Idle);
        let first_best = search.best_evaluation().unwrap().value();
        assert!(first_best >= 0.0);
        // a second run can only improve on the first
        search.start().unwrap();
        assert!(search.best_evaluation().unwrap().value() >= first_best);
    }

    #[test]
    fn every_step_is_counted_as_accepted_or_rejected() {
        let mut search = RandomDescent::new(one_max_arc::<8>(), FlipNeighbourhood);
        search.core_mut().set_seed(7).unwrap();
        search.core_mut().set_step_budget(Some(100));
        search.start().unwrap();
        let ns = search.neighbourhood_search();
        assert_eq!(search.steps(), 100);
        assert_eq!(ns.accepted_moves() + ns.rejected_moves(), search.steps());
    }

    #[test]
    fn stops_itself_on_an_empty_neighbourhood() {
        let mut search = RandomDescent::new(one_max_arc::<8>(), FlipNeighbourhood);
        search.neighbourhood_search_mut()
            .set_current_solution(Vec::new())
            .unwrap();
        search.start().unwrap();
        assert_eq!(search.status(), SearchStatus::Idle);
        assert_eq!(search.steps(), 1);
    }

    #[test]
    fn start_fails_when_disposed() {
        let mut search = RandomDescent::new(one_max_arc::<8>(), FlipNeighbourhood);
        search.dispose().unwrap();
        assert!(search.start().is_err());
    }
}
