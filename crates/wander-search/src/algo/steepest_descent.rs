//! Steepest descent over the full neighbourhood.

use std::sync::Arc;

use wander_core::error::Result;
use wander_core::neigh::Neighbourhood;
use wander_core::problem::DeltaProblem;
use wander_core::solution::Solution;

use crate::neigh_search::NeighbourhoodSearchCore;
use crate::search::{Search, SearchCore};

/// Deterministic hill climber that scans the entire neighbourhood every
/// step and applies the best improving move. Terminates naturally when no
/// move improves the current solution (a local optimum).
///
/// Scanning the full neighbourhood makes each step expensive for large
/// neighbourhoods; see the neighbourhood's own documentation for how its
/// size grows.
pub struct SteepestDescent<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    ns: NeighbourhoodSearchCore<S, P, N>,
}

impl<S, P, N> SteepestDescent<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    /// Creates a steepest descent search with the default name.
    pub fn new(problem: Arc<P>, neighbourhood: N) -> Self {
        Self::with_name("SteepestDescent", problem, neighbourhood)
    }

    /// Creates a steepest descent search with a custom name.
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

impl<S, P, N> Search<S, P> for SteepestDescent<S, P, N>
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
        let moves = self.ns.all_moves();
        match self.ns.best_move(moves, true, &[])? {
            Some(mv) => {
                if !self.ns.accept(&mv)? {
                    self.ns.reject(&mv);
                }
            }
            None => {
                // local optimum reached
                self.stop();
            }
        }
        Ok(())
    }
}
