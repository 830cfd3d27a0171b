//! Shared test fixtures: a bit-string problem with flip moves.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use wander_core::error::{Result, SearchError};
use wander_core::eval::SimpleEvaluation;
use wander_core::neigh::{Move, Neighbourhood};
use wander_core::problem::{DeltaObjective, Objective, StandardProblem};

/// Flips one bit of a bit-string solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Flip(pub usize);

impl Move<Vec<bool>> for Flip {
    fn apply(&self, solution: &mut Vec<bool>) -> Result<()> {
        let bit = solution
            .get_mut(self.0)
            .ok_or_else(|| SearchError::IncompatibleMove(format!("no bit at index {}", self.0)))?;
        *bit = !*bit;
        Ok(())
    }

    fn undo(&self, solution: &mut Vec<bool>) -> Result<()> {
        self.apply(solution)
    }
}

/// Generates every single-bit flip, or one at random.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlipNeighbourhood;

impl Neighbourhood<Vec<bool>> for FlipNeighbourhood {
    type Move = Flip;

    fn random_move(&self, solution: &Vec<bool>, rng: &mut StdRng) -> Option<Flip> {
        if solution.is_empty() {
            return None;
        }
        Some(Flip(rng.random_range(0..solution.len())))
    }

    fn all_moves(&self, solution: &Vec<bool>) -> Vec<Flip> {
        (0..solution.len()).map(Flip).collect()
    }
}

/// Maximizes the number of set bits.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OneMax;

impl Objective<Vec<bool>> for OneMax {
    type Eval = SimpleEvaluation;

    fn evaluate(&self, solution: &Vec<bool>) -> SimpleEvaluation {
        SimpleEvaluation::of(solution.iter().filter(|b| **b).count() as f64)
    }
}

impl DeltaObjective<Vec<bool>, Flip> for OneMax {
    fn evaluate_move(
        &self,
        mv: &Flip,
        solution: &mut Vec<bool>,
        current: &SimpleEvaluation,
    ) -> Result<SimpleEvaluation> {
        use wander_core::eval::Evaluation;
        let bit = *solution
            .get(mv.0)
            .ok_or_else(|| SearchError::IncompatibleMove(format!("no bit at index {}", mv.0)))?;
        let delta = if bit { -1.0 } else { 1.0 };
        Ok(SimpleEvaluation::of(current.value() + delta))
    }
}

pub(crate) type TestProblem =
    StandardProblem<Vec<bool>, OneMax, fn(&mut StdRng) -> Vec<bool>>;

pub(crate) fn random_bits<const LEN: usize>(rng: &mut StdRng) -> Vec<bool> {
    (0..LEN).map(|_| rng.random()).collect()
}

/// One-max problem whose random solutions are `LEN` bits long.
pub(crate) fn one_max_problem<const LEN: usize>() -> TestProblem {
    StandardProblem::new(OneMax, random_bits::<LEN> as fn(&mut StdRng) -> Vec<bool>)
}

pub(crate) fn one_max_arc<const LEN: usize>() -> Arc<TestProblem> {
    Arc::new(one_max_problem::<LEN>())
}
