//! Metropolis search at a fixed temperature.

use std::sync::Arc;

use rand::Rng;

use wander_core::error::{Result, SearchError};
use wander_core::neigh::Neighbourhood;
use wander_core::problem::DeltaProblem;
use wander_core::solution::Solution;
use wander_core::validation::Validation;

use crate::neigh_search::NeighbourhoodSearchCore;
use crate::search::{Search, SearchCore};

/// Metropolis criterion search: simulated annealing at a constant
/// temperature.
///
/// Every step samples one random move. Valid moves with a non-negative
/// delta are always accepted; valid worsening moves are accepted with
/// probability `exp(delta / T)`. Invalid moves are rejected. Also serves as
/// the replica of [`ParallelTempering`](crate::algo::ParallelTempering).
pub struct MetropolisSearch<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    ns: NeighbourhoodSearchCore<S, P, N>,
    temperature: f64,
}

impl<S, P, N> MetropolisSearch<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    /// Creates a Metropolis search at the given temperature.
    ///
    /// # Panics
    ///
    /// Panics if `temperature` is not strictly positive.
    pub fn new(problem: Arc<P>, neighbourhood: N, temperature: f64) -> Self {
        Self::with_name("MetropolisSearch", problem, neighbourhood, temperature)
    }

    /// Creates a Metropolis search with a custom name.
    ///
    /// # Panics
    ///
    /// Panics if `temperature` is not strictly positive.
    pub fn with_name(
        name: impl Into<String>,
        problem: Arc<P>,
        neighbourhood: N,
        temperature: f64,
    ) -> Self {
        assert!(
            temperature > 0.0,
            "temperature must be strictly positive"
        );
        Self {
            ns: NeighbourhoodSearchCore::new(name, problem, neighbourhood),
            temperature,
        }
    }

    /// The temperature of this search.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Sets the temperature. Idle only.
    pub fn set_temperature(&mut self, temperature: f64) -> Result<()> {
        self.ns.core().assert_idle("set temperature")?;
        if temperature <= 0.0 {
            return Err(SearchError::Strategy(
                "temperature must be strictly positive".into(),
            ));
        }
        self.temperature = temperature;
        Ok(())
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

impl<S, P, N> Search<S, P> for MetropolisSearch<S, P, N>
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
        let Some(mv) = self.ns.random_move() else {
            self.stop();
            return Ok(());
        };
        if !self.ns.validate_move(&mv)?.passed() {
            self.ns.reject(&mv);
            return Ok(());
        }
        let evaluation = self.ns.evaluate_move(&mv)?;
        let delta = self.ns.delta_from_current(&evaluation);
        if delta >= 0.0 {
            self.ns.accept(&mv)?;
            return Ok(());
        }
        let probability = (delta / self.temperature).exp();
        let roll: f64 = self.ns.rng_mut().random();
        if roll < probability {
            self.ns.accept(&mv)?;
        } else {
            self.ns.reject(&mv);
        }
        Ok(())
    }
}
