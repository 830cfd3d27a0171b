//! Local search: a search with a current solution.

use std::fmt::Debug;
use std::sync::Arc;

use wander_core::error::Result;
use wander_core::problem::Problem;
use wander_core::solution::Solution;

use crate::search::SearchCore;

/// Search core extended with a mutable current solution and its cached
/// evaluation and validation.
///
/// The cached evaluation and validation are always consistent with the
/// current solution: the three fields only change together.
pub struct LocalSearchCore<S: Solution, P: Problem<S>> {
    pub(crate) core: SearchCore<S, P>,
    pub(crate) current: Option<S>,
    pub(crate) current_evaluation: Option<P::Evaluation>,
    pub(crate) current_validation: Option<P::Validation>,
}

impl<S: Solution, P: Problem<S>> LocalSearchCore<S, P> {
    /// Creates a local search core with the given name, solving the given
    /// problem.
    pub fn new(name: impl Into<String>, problem: Arc<P>) -> Self {
        Self {
            core: SearchCore::new(name, problem),
            current: None,
            current_evaluation: None,
            current_validation: None,
        }
    }

    /// The embedded search core.
    pub fn core(&self) -> &SearchCore<S, P> {
        &self.core
    }

    /// The embedded search core, mutably.
    pub fn core_mut(&mut self) -> &mut SearchCore<S, P> {
        &mut self.core
    }

    /// The current solution, if one has been set or generated.
    pub fn current_solution(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// Evaluation of the current solution.
    pub fn current_evaluation(&self) -> Option<&P::Evaluation> {
        self.current_evaluation.as_ref()
    }

    /// Validation of the current solution.
    pub fn current_validation(&self) -> Option<&P::Validation> {
        self.current_validation.as_ref()
    }

    /// Sets the current solution. Idle only.
    ///
    /// The solution is evaluated and validated in full, and promoted to new
    /// best if applicable.
    pub fn set_current_solution(&mut self, solution: S) -> Result<()> {
        self.core.assert_idle("set current solution")?;
        self.install_current(solution);
        Ok(())
    }

    /// Installs a solution as current: full evaluation and validation plus a
    /// best-solution check.
    pub(crate) fn install_current(&mut self, solution: S) {
        let problem = Arc::clone(self.core.problem());
        let evaluation = problem.evaluate(&solution);
        let validation = problem.validate(&solution);
        self.update_current_and_best(solution, evaluation, validation);
    }

    /// Updates the current solution together with its evaluation and
    /// validation, and checks for a new best solution.
    pub(crate) fn update_current_and_best(
        &mut self,
        solution: S,
        evaluation: P::Evaluation,
        validation: P::Validation,
    ) {
        self.core
            .update_best(&solution, evaluation.clone(), validation.clone());
        self.current = Some(solution);
        self.current_evaluation = Some(evaluation);
        self.current_validation = Some(validation);
    }

    /// Generates a random initial solution when none has been set yet.
    /// Called from the run initialization hook.
    pub(crate) fn ensure_current(&mut self) {
        if self.current.is_none() {
            let problem = Arc::clone(self.core.problem());
            let solution = problem.random_solution(self.core.rng_mut());
            self.install_current(solution);
        }
    }
}

impl<S: Solution, P: Problem<S>> Debug for LocalSearchCore<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchCore")
            .field("core", &self.core)
            .field("has_current", &self.current.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{one_max_problem, TestProblem};
    use wander_core::eval::Evaluation;
    use wander_core::validation::Validation;

    fn local() -> LocalSearchCore<Vec<bool>, TestProblem> {
        LocalSearchCore::new("LocalSearch", Arc::new(one_max_problem::<8>()))
    }

    #[test]
    fn set_current_solution_computes_evaluation_and_best() {
        let mut search = local();
        search
            .set_current_solution(vec![true, true, false, false])
            .unwrap();
        assert_eq!(search.current_evaluation().unwrap().value(), 2.0);
        assert!(search.current_validation().unwrap().passed());
        assert_eq!(search.core().best_evaluation().unwrap().value(), 2.0);
    }

    #[test]
    fn better_current_solution_improves_best() {
        let mut search = local();
        search.set_current_solution(vec![true, false]).unwrap();
        search.set_current_solution(vec![true, true]).unwrap();
        assert_eq!(search.core().best_evaluation().unwrap().value(), 2.0);
        // a worse current solution leaves the best untouched
        search.set_current_solution(vec![false, false]).unwrap();
        assert_eq!(search.core().best_evaluation().unwrap().value(), 2.0);
        assert_eq!(search.current_evaluation().unwrap().value(), 0.0);
    }

    #[test]
    fn ensure_current_generates_once() {
        let mut search = local();
        assert!(search.current_solution().is_none());
        search.ensure_current();
        let generated = search.current_solution().unwrap().clone();
        search.ensure_current();
        assert_eq!(search.current_solution().unwrap(), &generated);
    }
}
