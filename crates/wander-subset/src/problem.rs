//! Subset problem wrapper.

use rand::rngs::StdRng;
use rand::Rng;

use wander_core::error::Result;
use wander_core::problem::{DeltaObjective, DeltaProblem, Objective, Problem};
use wander_core::validation::SimpleValidation;

use crate::moves::SubsetMove;
use crate::neigh::sample_ids;
use crate::solution::SubsetSolution;

/// A subset selection problem: pick a subset of IDs from a universe,
/// scored by an objective, with the selection size constrained to a range.
///
/// Random solutions draw a uniform selection size within the range and a
/// uniform ID subset of that size. Size validation of a move is computed
/// from the move's own added/deleted counts, without touching the solution.
#[derive(Debug)]
pub struct SubsetProblem<O> {
    objective: O,
    ids: Vec<usize>,
    min_size: usize,
    max_size: usize,
}

impl<O: Objective<SubsetSolution>> SubsetProblem<O> {
    /// Creates a fixed-size subset problem.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero or exceeds the universe.
    pub fn new(objective: O, ids: impl IntoIterator<Item = usize>, size: usize) -> Self {
        Self::with_size_range(objective, ids, size, size)
    }

    /// Creates a subset problem with the selection size bounded by
    /// `[min_size, max_size]`.
    ///
    /// # Panics
    ///
    /// Panics if the range is inverted, `min_size` is zero or `max_size`
    /// exceeds the universe.
    pub fn with_size_range(
        objective: O,
        ids: impl IntoIterator<Item = usize>,
        min_size: usize,
        max_size: usize,
    ) -> Self {
        let ids: Vec<usize> = ids.into_iter().collect();
        assert!(min_size > 0, "minimum subset size must be strictly positive");
        assert!(
            min_size <= max_size,
            "minimum subset size exceeds maximum subset size"
        );
        assert!(
            max_size <= ids.len(),
            "maximum subset size exceeds the universe"
        );
        Self {
            objective,
            ids,
            min_size,
            max_size,
        }
    }

    /// The universe of IDs.
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// Minimum selection size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum selection size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The wrapped objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    fn size_is_valid(&self, size: usize) -> bool {
        size >= self.min_size && size <= self.max_size
    }
}

impl<O> Problem<SubsetSolution> for SubsetProblem<O>
where
    O: Objective<SubsetSolution> + Send + Sync,
{
    type Evaluation = O::Eval;
    type Validation = SimpleValidation;

    fn evaluate(&self, solution: &SubsetSolution) -> Self::Evaluation {
        self.objective.evaluate(solution)
    }

    fn validate(&self, solution: &SubsetSolution) -> Self::Validation {
        SimpleValidation::new(self.size_is_valid(solution.num_selected()))
    }

    fn is_minimizing(&self) -> bool {
        self.objective.is_minimizing()
    }

    fn random_solution(&self, rng: &mut StdRng) -> SubsetSolution {
        let size = rng.random_range(self.min_size..=self.max_size);
        let selection = sample_ids(&self.ids, size, rng);
        SubsetSolution::with_selection(self.ids.iter().copied(), selection)
    }
}

impl<O> DeltaProblem<SubsetSolution, SubsetMove> for SubsetProblem<O>
where
    O: DeltaObjective<SubsetSolution, SubsetMove> + Send + Sync,
{
    fn evaluate_move(
        &self,
        mv: &SubsetMove,
        solution: &mut SubsetSolution,
        current: &Self::Evaluation,
    ) -> Result<Self::Evaluation> {
        self.objective.evaluate_move(mv, solution, current)
    }

    fn validate_move(
        &self,
        mv: &SubsetMove,
        solution: &mut SubsetSolution,
        _current: &Self::Validation,
    ) -> Result<Self::Validation> {
        // the neighbouring size follows from the move alone
        let size =
            (solution.num_selected() + mv.num_added()).saturating_sub(mv.num_deleted());
        Ok(SimpleValidation::new(self.size_is_valid(size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use wander_core::eval::{Evaluation, SimpleEvaluation};
    use wander_core::problem::validate_move_by_recomputation;
    use wander_core::validation::Validation;

    /// Maximizes the summed weight of the selected IDs.
    #[derive(Debug, Clone)]
    struct SumOfWeights {
        weights: Vec<f64>,
    }

    impl Objective<SubsetSolution> for SumOfWeights {
        type Eval = SimpleEvaluation;

        fn evaluate(&self, solution: &SubsetSolution) -> SimpleEvaluation {
            SimpleEvaluation::of(solution.selected().map(|id| self.weights[id]).sum())
        }
    }

    impl DeltaObjective<SubsetSolution, SubsetMove> for SumOfWeights {
        fn evaluate_move(
            &self,
            mv: &SubsetMove,
            _solution: &mut SubsetSolution,
            current: &SimpleEvaluation,
        ) -> Result<SimpleEvaluation> {
            let gained: f64 = mv.added_ids().iter().map(|&id| self.weights[id]).sum();
            let lost: f64 = mv.deleted_ids().iter().map(|&id| self.weights[id]).sum();
            Ok(SimpleEvaluation::of(current.value() + gained - lost))
        }
    }

    fn weights(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn evaluates_through_the_objective() {
        let problem = SubsetProblem::new(SumOfWeights { weights: weights(6) }, 0..6, 3);
        let solution = SubsetSolution::with_selection(0..6, [1, 2, 5]);
        assert_eq!(problem.evaluate(&solution).value(), 8.0);
    }

    #[test]
    fn validates_the_selection_size() {
        let problem =
            SubsetProblem::with_size_range(SumOfWeights { weights: weights(6) }, 0..6, 2, 3);
        let too_small = SubsetSolution::with_selection(0..6, [0]);
        let just_right = SubsetSolution::with_selection(0..6, [0, 1, 2]);
        let too_big = SubsetSolution::with_selection(0..6, [0, 1, 2, 3]);
        assert!(!problem.validate(&too_small).passed());
        assert!(problem.validate(&just_right).passed());
        assert!(!problem.validate(&too_big).passed());
    }

    #[test]
    fn random_solutions_respect_the_size_range() {
        let problem =
            SubsetProblem::with_size_range(SumOfWeights { weights: weights(10) }, 0..10, 3, 7);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let solution = problem.random_solution(&mut rng);
            assert!((3..=7).contains(&solution.num_selected()));
            assert_eq!(solution.total_ids(), 10);
        }
    }

    #[test]
    fn delta_evaluation_matches_full_recomputation() {
        let problem = SubsetProblem::new(SumOfWeights { weights: weights(8) }, 0..8, 4);
        let mut solution = SubsetSolution::with_selection(0..8, [0, 1, 2, 3]);
        let current = problem.evaluate(&solution);
        let mv = SubsetMove::new([6, 7], [0, 1]);
        let delta = problem.evaluate_move(&mv, &mut solution, &current).unwrap();
        use wander_core::neigh::Move;
        mv.apply(&mut solution).unwrap();
        let full = problem.evaluate(&solution);
        assert!((delta.value() - full.value()).abs() < 1e-10);
    }

    #[test]
    fn delta_validation_matches_full_recomputation() {
        let problem =
            SubsetProblem::with_size_range(SumOfWeights { weights: weights(8) }, 0..8, 2, 3);
        let mut solution = SubsetSolution::with_selection(0..8, [0, 1, 2]);
        let current = problem.validate(&solution);
        for mv in [
            SubsetMove::addition(5),
            SubsetMove::deletion(0),
            SubsetMove::swap(5, 0),
        ] {
            let delta = problem.validate_move(&mv, &mut solution, &current).unwrap();
            let full = validate_move_by_recomputation(&problem, &mv, &mut solution).unwrap();
            assert_eq!(delta.passed(), full.passed());
        }
    }

    #[test]
    #[should_panic(expected = "exceeds the universe")]
    fn oversized_subset_is_rejected() {
        SubsetProblem::new(SumOfWeights { weights: weights(3) }, 0..3, 4);
    }
}
