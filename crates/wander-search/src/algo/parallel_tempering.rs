//! Parallel tempering: cooperating Metropolis replicas.

use std::sync::Arc;
use std::thread;

use rand::Rng;

use wander_core::constants::INVALID_MOVE_COUNT;
use wander_core::error::{Result, SearchError};
use wander_core::eval::Evaluation;
use wander_core::neigh::Neighbourhood;
use wander_core::problem::DeltaProblem;
use wander_core::solution::Solution;
use wander_core::status::SearchStatus;

use crate::algo::MetropolisSearch;
use crate::neigh_search::NeighbourhoodSearchCore;
use crate::search::{Search, SearchCore};

/// Default number of steps every replica performs per coordinator step.
const DEFAULT_REPLICA_STEPS: i64 = 100;

/// Parallel tempering search.
///
/// Runs `n` Metropolis sub-searches (replicas) at temperatures spaced
/// geometrically between `t_min` and `t_max`. Every coordinator step:
///
/// 1. runs each replica for a bounded number of steps on its own thread
///    (replicas also yield as soon as the coordinator leaves `Running`),
/// 2. sweeps the replica ladder bottom-up and swaps the current solutions
///    of adjacent replicas with the Metropolis probability
///    `min(1, exp((1/T_i − 1/T_{i+1}) · (E_{i+1} − E_i)))`,
/// 3. adopts the best replica solution as its own current solution.
///
/// Cold (low-temperature) replicas refine good solutions while hot ones
/// explore; swaps let promising solutions migrate towards the cold end.
///
/// Every replica owns a private random generator seeded from the
/// coordinator's, and a private evaluated-move cache. The coordinator's
/// accepted/rejected counters accumulate those of the replicas; because a
/// replica's own counters are reset at the start of every batch, the
/// coordinator additionally keeps cumulative per-replica totals, exposed
/// through [`replica_accepted_moves`](Self::replica_accepted_moves) and
/// [`replica_rejected_moves`](Self::replica_rejected_moves).
pub struct ParallelTempering<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S> + Clone,
    P: DeltaProblem<S, N::Move>,
{
    ns: NeighbourhoodSearchCore<S, P, N>,
    replicas: Vec<MetropolisSearch<S, P, N>>,
    temperatures: Vec<f64>,
    replica_steps: i64,
    replica_accepted: Vec<i64>,
    replica_rejected: Vec<i64>,
}

impl<S, P, N> ParallelTempering<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S> + Clone,
    P: DeltaProblem<S, N::Move>,
{
    /// Creates a parallel tempering search with `num_replicas` replicas at
    /// temperatures `T_i = t_min * (t_max/t_min)^(i/(n-1))`.
    ///
    /// # Panics
    ///
    /// Panics if `num_replicas` is zero, `t_min` is not strictly positive
    /// or `t_max < t_min`.
    pub fn new(
        problem: Arc<P>,
        neighbourhood: N,
        num_replicas: usize,
        t_min: f64,
        t_max: f64,
    ) -> Self {
        Self::build(problem, neighbourhood, num_replicas, t_min, t_max, None)
    }

    /// Creates a parallel tempering search with a fixed seed: the
    /// coordinator's generator is seeded with it, and every replica receives
    /// a fresh seed drawn from the coordinator's generator.
    ///
    /// # Panics
    ///
    /// Same conditions as [`new`](Self::new).
    pub fn with_seed(
        problem: Arc<P>,
        neighbourhood: N,
        num_replicas: usize,
        t_min: f64,
        t_max: f64,
        seed: u64,
    ) -> Self {
        Self::build(
            problem,
            neighbourhood,
            num_replicas,
            t_min,
            t_max,
            Some(seed),
        )
    }

    fn build(
        problem: Arc<P>,
        neighbourhood: N,
        num_replicas: usize,
        t_min: f64,
        t_max: f64,
        seed: Option<u64>,
    ) -> Self {
        assert!(num_replicas >= 1, "at least one replica is required");
        assert!(t_min > 0.0, "temperatures must be strictly positive");
        assert!(t_max >= t_min, "maximum temperature below minimum");
        let mut ns = NeighbourhoodSearchCore::new(
            "ParallelTempering",
            Arc::clone(&problem),
            neighbourhood.clone(),
        );
        if let Some(seed) = seed {
            ns.core_mut().set_seed(seed).expect("search is idle");
        }
        let temperatures: Vec<f64> = if num_replicas == 1 {
            vec![t_min]
        } else {
            let ratio = t_max / t_min;
            (0..num_replicas)
                .map(|i| t_min * ratio.powf(i as f64 / (num_replicas - 1) as f64))
                .collect()
        };
        let coordinator = Arc::clone(ns.core().control_arc());
        let mut replicas = Vec::with_capacity(num_replicas);
        for (i, &temperature) in temperatures.iter().enumerate() {
            let seed: u64 = ns.core_mut().rng_mut().random();
            let mut replica = MetropolisSearch::with_name(
                format!("ParallelTempering-replica-{i}"),
                Arc::clone(&problem),
                neighbourhood.clone(),
                temperature,
            );
            replica.core_mut().set_seed(seed).expect("replica is idle");
            replica.core_mut().set_coordinator(Arc::clone(&coordinator));
            replica
                .core_mut()
                .set_step_budget(Some(DEFAULT_REPLICA_STEPS));
            replicas.push(replica);
        }
        Self {
            ns,
            replicas,
            temperatures,
            replica_steps: DEFAULT_REPLICA_STEPS,
            replica_accepted: vec![INVALID_MOVE_COUNT; num_replicas],
            replica_rejected: vec![INVALID_MOVE_COUNT; num_replicas],
        }
    }

    /// Moves accepted by replica `index` across all batches of the current
    /// (or last) run, or [`INVALID_MOVE_COUNT`] while initializing or
    /// before the first run.
    ///
    /// The replica's own counter only covers its most recent batch; this
    /// total survives batch boundaries.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn replica_accepted_moves(&self, index: usize) -> i64 {
        match self.ns.core().status() {
            SearchStatus::Initializing => INVALID_MOVE_COUNT,
            _ => self.replica_accepted[index],
        }
    }

    /// Moves rejected by replica `index` across all batches of the current
    /// (or last) run, or [`INVALID_MOVE_COUNT`] while initializing or
    /// before the first run.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn replica_rejected_moves(&self, index: usize) -> i64 {
        match self.ns.core().status() {
            SearchStatus::Initializing => INVALID_MOVE_COUNT,
            _ => self.replica_rejected[index],
        }
    }

    /// The replica temperatures, from coldest to hottest.
    pub fn temperatures(&self) -> &[f64] {
        &self.temperatures
    }

    /// The replicas, from coldest to hottest.
    pub fn replicas(&self) -> &[MetropolisSearch<S, P, N>] {
        &self.replicas
    }

    /// Number of steps every replica performs per coordinator step.
    pub fn replica_steps(&self) -> i64 {
        self.replica_steps
    }

    /// Sets the number of steps every replica performs per coordinator
    /// step. Idle only; `steps` must be at least 1.
    pub fn set_replica_steps(&mut self, steps: i64) -> Result<()> {
        self.ns.core().assert_idle("set replica steps")?;
        if steps < 1 {
            return Err(SearchError::Strategy(
                "replica steps must be at least 1".into(),
            ));
        }
        self.replica_steps = steps;
        for replica in &mut self.replicas {
            replica.core_mut().set_step_budget(Some(steps));
        }
        Ok(())
    }

    /// Replaces the neighbourhood of the coordinator and of every replica.
    /// Idle only.
    pub fn set_neighbourhood(&mut self, neighbourhood: N) -> Result<()> {
        self.ns.core().assert_idle("set neighbourhood")?;
        self.ns.set_neighbourhood(neighbourhood.clone())?;
        for replica in &mut self.replicas {
            replica
                .neighbourhood_search_mut()
                .set_neighbourhood(neighbourhood.clone())?;
        }
        Ok(())
    }

    /// Sets the current solution; every replica receives its own deep copy.
    /// Idle only.
    pub fn set_current_solution(&mut self, solution: S) -> Result<()> {
        self.ns.core().assert_idle("set current solution")?;
        self.ns.set_current_solution(solution.clone())?;
        for replica in &mut self.replicas {
            replica
                .neighbourhood_search_mut()
                .set_current_solution(solution.clone())?;
        }
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

    /// Runs every replica for one batch on its own thread and joins them.
    fn run_replica_batch(&mut self) -> Result<()> {
        let mut failure: Option<SearchError> = None;
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.replicas.len());
            for replica in &mut self.replicas {
                handles.push(scope.spawn(move || replica.start()));
            }
            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        failure.get_or_insert(error);
                    }
                    Err(_) => {
                        failure.get_or_insert(SearchError::Interrupted);
                    }
                }
            }
        });
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Sense-adjusted scalar value of a replica's current solution.
    fn replica_value(&self, index: usize) -> Option<f64> {
        let value = self.replicas[index]
            .neighbourhood_search()
            .current_evaluation()?
            .value();
        Some(if self.ns.core().problem().is_minimizing() {
            -value
        } else {
            value
        })
    }

    /// Folds a replica's current solution into the coordinator's best.
    fn fold_replica_current_into_best(&mut self, index: usize) {
        let replica = self.replicas[index].neighbourhood_search();
        if let (Some(solution), Some(evaluation), Some(validation)) = (
            replica.current_solution(),
            replica.current_evaluation(),
            replica.current_validation(),
        ) {
            let solution = solution.clone();
            let evaluation = evaluation.clone();
            let validation = validation.clone();
            self.ns
                .core_mut()
                .update_best(&solution, evaluation, validation);
        }
    }
}

impl<S, P, N> Search<S, P> for ParallelTempering<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S> + Clone,
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
        self.replica_accepted = vec![0; self.replicas.len()];
        self.replica_rejected = vec![0; self.replicas.len()];
        // every replica starts the run from a deep copy of the shared
        // current solution
        let solution = self
            .ns
            .current_solution()
            .expect("current solution generated during initialization")
            .clone();
        let evaluation = self.ns.current_evaluation().unwrap().clone();
        let validation = self.ns.current_validation().unwrap().clone();
        for replica in &mut self.replicas {
            replica.neighbourhood_search_mut().install_current_state(
                solution.clone(),
                evaluation.clone(),
                validation.clone(),
            );
        }
        Ok(())
    }

    fn search_step(&mut self) -> Result<()> {
        self.run_replica_batch()?;

        // fold replica progress into the coordinator; the cumulative
        // per-replica totals must be taken now, before the next batch
        // resets each replica's own counters
        let mut accepted = 0;
        let mut rejected = 0;
        for (i, replica) in self.replicas.iter().enumerate() {
            let batch_accepted = replica.neighbourhood_search().accepted_moves().max(0);
            let batch_rejected = replica.neighbourhood_search().rejected_moves().max(0);
            self.replica_accepted[i] += batch_accepted;
            self.replica_rejected[i] += batch_rejected;
            accepted += batch_accepted;
            rejected += batch_rejected;
        }
        self.ns.inc_accepted(accepted);
        self.ns.inc_rejected(rejected);
        {
            let Self { ns, replicas, .. } = self;
            for replica in replicas.iter() {
                if let (Some(solution), Some(evaluation), Some(validation)) = (
                    replica.best_solution(),
                    replica.best_evaluation(),
                    replica.best_validation(),
                ) {
                    ns.core_mut()
                        .update_best(solution, evaluation.clone(), validation.clone());
                }
            }
        }

        // swap phase, bottom-up through the temperature ladder
        for i in (0..self.replicas.len().saturating_sub(1)).rev() {
            let (Some(value_i), Some(value_j)) = (self.replica_value(i), self.replica_value(i + 1))
            else {
                continue;
            };
            let t_i = self.temperatures[i];
            let t_j = self.temperatures[i + 1];
            let delta = (1.0 / t_i - 1.0 / t_j) * (value_j - value_i);
            let swap =
                delta >= 0.0 || self.ns.rng_mut().random::<f64>() < delta.exp();
            if !swap {
                continue;
            }
            let (cold, hot) = self.replicas.split_at_mut(i + 1);
            let cold = cold[i].neighbourhood_search_mut();
            let hot = hot[0].neighbourhood_search_mut();
            if let (Some(state_i), Some(state_j)) =
                (cold.take_current_state(), hot.take_current_state())
            {
                cold.install_current_state(state_j.0, state_j.1, state_j.2);
                hot.install_current_state(state_i.0, state_i.1, state_i.2);
            }
            self.fold_replica_current_into_best(i);
            self.fold_replica_current_into_best(i + 1);
        }

        // adopt the best replica solution as the coordinator's current one
        let mut best_index: Option<(usize, f64)> = None;
        for i in 0..self.replicas.len() {
            if let Some(value) = self.replica_value(i) {
                if best_index.is_none_or(|(_, best)| value > best) {
                    best_index = Some((i, value));
                }
            }
        }
        if let Some((i, _)) = best_index {
            let replica = self.replicas[i].neighbourhood_search();
            let solution = replica.current_solution().unwrap().clone();
            let evaluation = replica.current_evaluation().unwrap().clone();
            let validation = replica.current_validation().unwrap().clone();
            self.ns.adopt_current(solution, evaluation, validation);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "parallel_tempering_tests.rs"]
mod tests;
