//! Neighbourhood search: move evaluation, validation, acceptance.
//!
//! [`NeighbourhoodSearchCore`] is the workhorse embedded by every concrete
//! strategy. It pairs a local search core with a neighbourhood and an
//! evaluated-move cache, and provides the primitives strategies are built
//! from: `evaluate_move`, `validate_move`, `is_improvement`, `best_move`,
//! `accept` and `reject`.

use std::fmt::Debug;
use std::sync::Arc;

use rand::rngs::StdRng;

use wander_core::constants::{DELTA_TOLERANCE, INVALID_MOVE_COUNT};
use wander_core::error::{Result, SearchError};
use wander_core::eval::{signed_delta, Evaluation};
use wander_core::neigh::{Move, Neighbourhood};
use wander_core::problem::{
    evaluate_move_by_recomputation, validate_move_by_recomputation, DeltaProblem,
};
use wander_core::solution::Solution;
use wander_core::status::SearchStatus;
use wander_core::validation::Validation;

use crate::cache::{CachePolicy, EvaluatedMoveCache};
use crate::local::LocalSearchCore;
use crate::search::SearchCore;

/// Local search core extended with a neighbourhood, an evaluated-move cache
/// and per-run accepted/rejected move counters.
///
/// # Type Parameters
/// * `S` - The solution type
/// * `P` - The problem type; must delta-evaluate the neighbourhood's moves
/// * `N` - The neighbourhood type
pub struct NeighbourhoodSearchCore<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    pub(crate) local: LocalSearchCore<S, P>,
    neighbourhood: N,
    cache: Option<Box<dyn EvaluatedMoveCache<N::Move, P::Evaluation, P::Validation>>>,
    cache_policy: CachePolicy,
    strict_delta: bool,
    accepted: i64,
    rejected: i64,
}

impl<S, P, N> NeighbourhoodSearchCore<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    /// Creates a neighbourhood search core with the default single-entry
    /// cache.
    pub fn new(name: impl Into<String>, problem: Arc<P>, neighbourhood: N) -> Self {
        let cache_policy = CachePolicy::default();
        Self {
            local: LocalSearchCore::new(name, problem),
            neighbourhood,
            cache: cache_policy.build(),
            cache_policy,
            strict_delta: false,
            accepted: INVALID_MOVE_COUNT,
            rejected: INVALID_MOVE_COUNT,
        }
    }

    /// The embedded search core.
    pub fn core(&self) -> &SearchCore<S, P> {
        self.local.core()
    }

    /// The embedded search core, mutably.
    pub fn core_mut(&mut self) -> &mut SearchCore<S, P> {
        self.local.core_mut()
    }

    /// The embedded local search core.
    pub fn local(&self) -> &LocalSearchCore<S, P> {
        &self.local
    }

    /// The neighbourhood generating this search's moves.
    pub fn neighbourhood(&self) -> &N {
        &self.neighbourhood
    }

    /// Replaces the neighbourhood. Idle only.
    pub fn set_neighbourhood(&mut self, neighbourhood: N) -> Result<()> {
        self.core().assert_idle("set neighbourhood")?;
        self.neighbourhood = neighbourhood;
        Ok(())
    }

    /// Replaces the evaluated-move cache policy. Idle only.
    pub fn set_evaluated_move_cache(&mut self, policy: CachePolicy) -> Result<()> {
        self.core().assert_idle("set evaluated move cache")?;
        self.cache_policy = policy;
        self.cache = policy.build();
        Ok(())
    }

    /// The active cache policy.
    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Enables verification of every delta evaluation and validation against
    /// a full recomputation. Idle only.
    ///
    /// Mismatches beyond the tolerance surface as
    /// `IncompatibleDeltaEvaluation` / `IncompatibleDeltaValidation` and
    /// abort the run.
    pub fn set_strict_delta_verification(&mut self, strict: bool) -> Result<()> {
        self.core().assert_idle("set strict delta verification")?;
        self.strict_delta = strict;
        Ok(())
    }

    /// Sets the current solution and invalidates the cache. Idle only.
    pub fn set_current_solution(&mut self, solution: S) -> Result<()> {
        self.local.set_current_solution(solution)?;
        self.clear_cache();
        Ok(())
    }

    /// The current solution.
    pub fn current_solution(&self) -> Option<&S> {
        self.local.current_solution()
    }

    /// Evaluation of the current solution.
    pub fn current_evaluation(&self) -> Option<&P::Evaluation> {
        self.local.current_evaluation()
    }

    /// Validation of the current solution.
    pub fn current_validation(&self) -> Option<&P::Validation> {
        self.local.current_validation()
    }

    /// The search's random generator.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        self.local.core_mut().rng_mut()
    }

    // === Per-run counters ===

    /// Moves accepted during the current (or last) run, or
    /// [`INVALID_MOVE_COUNT`] while initializing or before the first run.
    pub fn accepted_moves(&self) -> i64 {
        match self.core().status() {
            SearchStatus::Initializing => INVALID_MOVE_COUNT,
            _ => self.accepted,
        }
    }

    /// Moves rejected during the current (or last) run, or
    /// [`INVALID_MOVE_COUNT`] while initializing or before the first run.
    pub fn rejected_moves(&self) -> i64 {
        match self.core().status() {
            SearchStatus::Initializing => INVALID_MOVE_COUNT,
            _ => self.rejected,
        }
    }

    pub(crate) fn inc_accepted(&mut self, by: i64) {
        self.accepted += by;
    }

    pub(crate) fn inc_rejected(&mut self, by: i64) {
        self.rejected += by;
    }

    /// Run initialization: ensures a current solution exists and resets the
    /// per-run counters.
    pub(crate) fn on_search_started(&mut self) {
        self.local.ensure_current();
        self.accepted = 0;
        self.rejected = 0;
    }

    // === Move generation ===

    /// Asks the neighbourhood for one random move from the current solution.
    pub fn random_move(&mut self) -> Option<N::Move> {
        let Self {
            local,
            neighbourhood,
            ..
        } = self;
        let solution = local.current.as_ref()?;
        neighbourhood.random_move(solution, local.core.rng_mut())
    }

    /// Asks the neighbourhood for all moves from the current solution.
    pub fn all_moves(&self) -> Vec<N::Move> {
        self.local
            .current
            .as_ref()
            .map(|solution| self.neighbourhood.all_moves(solution))
            .unwrap_or_default()
    }

    // === Evaluation and validation with caching ===

    /// Evaluates a move against the current solution, consulting and
    /// priming the cache.
    pub fn evaluate_move(&mut self, mv: &N::Move) -> Result<P::Evaluation> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.cached_evaluation(mv) {
                return Ok(hit);
            }
        }
        let problem = Arc::clone(self.local.core.problem());
        let solution = self
            .local
            .current
            .as_mut()
            .ok_or_else(|| no_current_solution("evaluate move"))?;
        let current = self
            .local
            .current_evaluation
            .as_ref()
            .expect("current evaluation is set together with the current solution");
        let evaluation = problem.evaluate_move(mv, solution, current)?;
        if self.strict_delta {
            let full = evaluate_move_by_recomputation(problem.as_ref(), mv, solution)?;
            if (full.value() - evaluation.value()).abs() > DELTA_TOLERANCE {
                return Err(SearchError::IncompatibleDeltaEvaluation {
                    delta: evaluation.value(),
                    full: full.value(),
                });
            }
        }
        if let Some(cache) = &mut self.cache {
            cache.cache_evaluation(mv.clone(), evaluation.clone());
        }
        Ok(evaluation)
    }

    /// Validates a move against the current solution, consulting and
    /// priming the cache.
    pub fn validate_move(&mut self, mv: &N::Move) -> Result<P::Validation> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.cached_validation(mv) {
                return Ok(hit);
            }
        }
        let problem = Arc::clone(self.local.core.problem());
        let solution = self
            .local
            .current
            .as_mut()
            .ok_or_else(|| no_current_solution("validate move"))?;
        let current = self
            .local
            .current_validation
            .as_ref()
            .expect("current validation is set together with the current solution");
        let validation = problem.validate_move(mv, solution, current)?;
        if self.strict_delta {
            let full = validate_move_by_recomputation(problem.as_ref(), mv, solution)?;
            if full.passed() != validation.passed() {
                return Err(SearchError::IncompatibleDeltaValidation {
                    delta_passed: validation.passed(),
                    full_passed: full.passed(),
                });
            }
        }
        if let Some(cache) = &mut self.cache {
            cache.cache_validation(mv.clone(), validation.clone());
        }
        Ok(validation)
    }

    /// Signed delta of an evaluation relative to the current solution;
    /// positive means improvement.
    pub fn delta_from_current(&self, evaluation: &P::Evaluation) -> f64 {
        let current = self
            .local
            .current_evaluation
            .as_ref()
            .expect("current evaluation is set together with the current solution");
        signed_delta(
            evaluation.value(),
            current.value(),
            self.core().problem().is_minimizing(),
        )
    }

    /// Checks whether applying the move yields a valid improvement: the move
    /// is valid, and it improves the current solution or the current
    /// solution is itself invalid.
    pub fn is_improvement(&mut self, mv: &N::Move) -> Result<bool> {
        if !self.validate_move(mv)?.passed() {
            return Ok(false);
        }
        let current_valid = self
            .local
            .current_validation
            .as_ref()
            .is_some_and(|v| v.passed());
        if !current_valid {
            return Ok(true);
        }
        let evaluation = self.evaluate_move(mv)?;
        Ok(self.delta_from_current(&evaluation) > 0.0)
    }

    /// Selects the valid move with the largest delta among the given moves.
    ///
    /// Moves rejected by any filter are skipped, as are invalid moves. Ties
    /// are broken in favour of the first-seen move. With
    /// `require_improvement`, only moves with a strictly positive delta
    /// qualify — unless the current solution is invalid, in which case any
    /// valid move does. The winner's evaluation and validation are offered
    /// to the cache again on return, so they survive single-entry eviction.
    pub fn best_move<I>(
        &mut self,
        moves: I,
        require_improvement: bool,
        filters: &[&dyn Fn(&N::Move) -> bool],
    ) -> Result<Option<N::Move>>
    where
        I: IntoIterator<Item = N::Move>,
    {
        let current_valid = self
            .local
            .current_validation
            .as_ref()
            .is_some_and(|v| v.passed());
        let mut best: Option<(N::Move, f64, P::Evaluation, P::Validation)> = None;
        for mv in moves {
            if !filters.iter().all(|filter| filter(&mv)) {
                continue;
            }
            let validation = self.validate_move(&mv)?;
            if !validation.passed() {
                continue;
            }
            let evaluation = self.evaluate_move(&mv)?;
            let delta = self.delta_from_current(&evaluation);
            if require_improvement && delta <= 0.0 && current_valid {
                continue;
            }
            if best.as_ref().is_none_or(|(_, d, _, _)| delta > *d) {
                best = Some((mv, delta, evaluation, validation));
            }
        }
        Ok(best.map(|(mv, _, evaluation, validation)| {
            if let Some(cache) = &mut self.cache {
                cache.cache_evaluation(mv.clone(), evaluation);
                cache.cache_validation(mv.clone(), validation);
            }
            mv
        }))
    }

    /// Accepts a move: applies it to the current solution, updates the best
    /// solution, invalidates the cache and counts the acceptance.
    ///
    /// Returns `false` without any effect if the move yields an invalid
    /// neighbour.
    pub fn accept(&mut self, mv: &N::Move) -> Result<bool> {
        let validation = self.validate_move(mv)?;
        if !validation.passed() {
            return Ok(false);
        }
        let evaluation = self.evaluate_move(mv)?;
        // the delta path references pre-apply state, so the move is applied
        // strictly after evaluation and validation
        {
            let LocalSearchCore {
                core,
                current,
                current_evaluation,
                current_validation,
            } = &mut self.local;
            let solution = current
                .as_mut()
                .ok_or_else(|| no_current_solution("accept move"))?;
            mv.apply(solution)?;
            core.update_best(solution, evaluation.clone(), validation.clone());
            *current_evaluation = Some(evaluation);
            *current_validation = Some(validation);
        }
        self.clear_cache();
        self.accepted += 1;
        Ok(true)
    }

    /// Rejects a move: counts the rejection, nothing else.
    pub fn reject(&mut self, _mv: &N::Move) {
        self.rejected += 1;
    }

    /// Clears the evaluated-move cache.
    pub(crate) fn clear_cache(&mut self) {
        if let Some(cache) = &mut self.cache {
            cache.clear();
        }
    }

    // === Replica coordination support ===

    /// Removes and returns the current solution with its evaluation and
    /// validation, invalidating the cache.
    pub(crate) fn take_current_state(&mut self) -> Option<(S, P::Evaluation, P::Validation)> {
        let solution = self.local.current.take()?;
        let evaluation = self.local.current_evaluation.take()?;
        let validation = self.local.current_validation.take()?;
        self.clear_cache();
        Some((solution, evaluation, validation))
    }

    /// Installs a current solution with known evaluation and validation,
    /// without touching the best solution. Invalidates the cache.
    pub(crate) fn install_current_state(
        &mut self,
        solution: S,
        evaluation: P::Evaluation,
        validation: P::Validation,
    ) {
        self.local.current = Some(solution);
        self.local.current_evaluation = Some(evaluation);
        self.local.current_validation = Some(validation);
        self.clear_cache();
    }

    /// Adopts a solution as the new current solution, updating the best
    /// solution if it improves. Invalidates the cache.
    pub(crate) fn adopt_current(
        &mut self,
        solution: S,
        evaluation: P::Evaluation,
        validation: P::Validation,
    ) {
        self.local
            .update_current_and_best(solution, evaluation, validation);
        self.clear_cache();
    }
}

impl<S, P, N> Debug for NeighbourhoodSearchCore<S, P, N>
where
    S: Solution,
    N: Neighbourhood<S>,
    P: DeltaProblem<S, N::Move>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeighbourhoodSearchCore")
            .field("local", &self.local)
            .field("cache_policy", &self.cache_policy)
            .field("accepted", &self.accepted)
            .field("rejected", &self.rejected)
            .finish()
    }
}

fn no_current_solution(action: &str) -> SearchError {
    SearchError::Strategy(format!("cannot {action}: no current solution has been set"))
}

#[cfg(test)]
#[path = "neigh_search_tests.rs"]
mod tests;
