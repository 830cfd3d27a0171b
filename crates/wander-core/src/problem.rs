//! Problem contracts: objectives, constraints and their composition.
//!
//! A problem owns one objective and any number of constraints. It evaluates
//! and validates full solutions, and — through the delta traits — single
//! moves relative to the current solution, which is what makes neighbourhood
//! searches cheap per step.

use std::fmt::Debug;

use rand::rngs::StdRng;

use crate::error::Result;
use crate::eval::{Evaluation, PenalizedEvaluation};
use crate::neigh::Move;
use crate::solution::Solution;
use crate::validation::{PenalizedValidation, Validation};

/// Defines the objective function of a problem.
pub trait Objective<S>: Send + Sync {
    /// Evaluation type produced by this objective.
    type Eval: Evaluation + Clone + 'static;

    /// Fully evaluates the given solution.
    fn evaluate(&self, solution: &S) -> Self::Eval;

    /// Whether lower values are better. Defaults to maximizing.
    fn is_minimizing(&self) -> bool {
        false
    }
}

/// Incremental evaluation capability of an objective for a family of moves.
///
/// The contract is that for any solution `s` with evaluation `e`,
/// `evaluate_move(m, s, e)` equals the full evaluation of `apply(m, s)` up to
/// a small tolerance. The solution is passed mutably so that implementations
/// may apply the move, recompute and undo it; it MUST be restored to its
/// original state before returning.
pub trait DeltaObjective<S, M: Move<S>>: Objective<S> {
    /// Evaluates the neighbouring solution obtained by applying `mv` to
    /// `solution`, given the current evaluation.
    fn evaluate_move(&self, mv: &M, solution: &mut S, current: &Self::Eval) -> Result<Self::Eval>;
}

/// A single constraint on solutions.
///
/// Mandatory constraints gate validity; penalizing constraints report a
/// non-negative penalty that is summed into penalized evaluations. Both are
/// expressed through the same object-safe trait so that a problem can hold a
/// heterogeneous constraint set.
pub trait Constraint<S>: Send + Sync + Debug {
    /// Validates the given solution.
    fn validate(&self, solution: &S) -> PenalizedValidation;
}

/// A problem to be solved: objective plus constraints over a solution type.
pub trait Problem<S: Solution>: Send + Sync {
    /// Evaluation type of this problem.
    type Evaluation: Evaluation + Clone + 'static;
    /// Validation type of this problem.
    type Validation: Validation + Clone + 'static;

    /// Fully evaluates the given solution (objective plus penalties).
    fn evaluate(&self, solution: &S) -> Self::Evaluation;

    /// Fully validates the given solution against all mandatory constraints.
    fn validate(&self, solution: &S) -> Self::Validation;

    /// Whether lower evaluation values are better.
    fn is_minimizing(&self) -> bool;

    /// Creates a random solution, used to seed searches.
    fn random_solution(&self, rng: &mut StdRng) -> S;
}

/// Incremental evaluation and validation of moves against the current
/// solution. Searches require this for the move types their neighbourhood
/// generates.
///
/// Implementations must uphold the same restore contract as
/// [`DeltaObjective`]: the solution may be mutated temporarily but is always
/// handed back unchanged.
pub trait DeltaProblem<S: Solution, M: Move<S>>: Problem<S> {
    /// Evaluates the neighbour obtained by applying `mv`, given the current
    /// solution and its evaluation.
    fn evaluate_move(
        &self,
        mv: &M,
        solution: &mut S,
        current: &Self::Evaluation,
    ) -> Result<Self::Evaluation>;

    /// Validates the neighbour obtained by applying `mv`, given the current
    /// solution and its validation.
    fn validate_move(
        &self,
        mv: &M,
        solution: &mut S,
        current: &Self::Validation,
    ) -> Result<Self::Validation>;
}

/// Evaluates a move by applying it, fully evaluating the modified solution
/// and undoing the move again. Fallback for objectives without a cheaper
/// delta path.
pub fn evaluate_move_by_recomputation<S, M, P>(
    problem: &P,
    mv: &M,
    solution: &mut S,
) -> Result<P::Evaluation>
where
    S: Solution,
    M: Move<S>,
    P: Problem<S> + ?Sized,
{
    mv.apply(solution)?;
    let evaluation = problem.evaluate(solution);
    mv.undo(solution)?;
    Ok(evaluation)
}

/// Validates a move by applying it, fully validating the modified solution
/// and undoing the move again.
pub fn validate_move_by_recomputation<S, M, P>(
    problem: &P,
    mv: &M,
    solution: &mut S,
) -> Result<P::Validation>
where
    S: Solution,
    M: Move<S>,
    P: Problem<S> + ?Sized,
{
    mv.apply(solution)?;
    let validation = problem.validate(solution);
    mv.undo(solution)?;
    Ok(validation)
}

/// Standard problem composing an objective, mandatory constraints,
/// penalizing constraints and a random-solution generator.
///
/// Evaluations are always wrapped in a [`PenalizedEvaluation`]; without
/// penalizing constraints the penalty is simply zero. Validation consults
/// mandatory constraints only: a solution is valid iff all of them pass.
///
/// # Type Parameters
/// * `S` - The solution type
/// * `O` - The objective type
/// * `G` - The random-solution generator
pub struct StandardProblem<S, O, G>
where
    S: Solution,
    O: Objective<S>,
    G: Fn(&mut StdRng) -> S + Send + Sync,
{
    objective: O,
    mandatory: Vec<Box<dyn Constraint<S>>>,
    penalizing: Vec<Box<dyn Constraint<S>>>,
    generator: G,
}

impl<S, O, G> StandardProblem<S, O, G>
where
    S: Solution,
    O: Objective<S>,
    G: Fn(&mut StdRng) -> S + Send + Sync,
{
    /// Creates a problem with the given objective and random-solution
    /// generator, without any constraints.
    pub fn new(objective: O, generator: G) -> Self {
        Self {
            objective,
            mandatory: Vec::new(),
            penalizing: Vec::new(),
            generator,
        }
    }

    /// Adds a mandatory constraint. Solutions violating it are invalid.
    pub fn add_mandatory_constraint(&mut self, constraint: Box<dyn Constraint<S>>) {
        self.mandatory.push(constraint);
    }

    /// Adds a penalizing constraint. Its penalty is summed into evaluations
    /// but does not affect validity.
    pub fn add_penalizing_constraint(&mut self, constraint: Box<dyn Constraint<S>>) {
        self.penalizing.push(constraint);
    }

    /// Builder-style variant of [`add_mandatory_constraint`](Self::add_mandatory_constraint).
    pub fn with_mandatory_constraint(mut self, constraint: Box<dyn Constraint<S>>) -> Self {
        self.add_mandatory_constraint(constraint);
        self
    }

    /// Builder-style variant of [`add_penalizing_constraint`](Self::add_penalizing_constraint).
    pub fn with_penalizing_constraint(mut self, constraint: Box<dyn Constraint<S>>) -> Self {
        self.add_penalizing_constraint(constraint);
        self
    }

    /// The composed objective.
    pub fn objective(&self) -> &O {
        &self.objective
    }

    fn penalty_sum(&self, solution: &S) -> f64 {
        self.penalizing
            .iter()
            .map(|c| c.validate(solution).penalty())
            .sum()
    }

    fn mandatory_validation(&self, solution: &S) -> PenalizedValidation {
        self.mandatory
            .iter()
            .map(|c| c.validate(solution))
            .fold(PenalizedValidation::pass(), PenalizedValidation::and)
    }
}

impl<S, O, G> Problem<S> for StandardProblem<S, O, G>
where
    S: Solution,
    O: Objective<S>,
    G: Fn(&mut StdRng) -> S + Send + Sync,
{
    type Evaluation = PenalizedEvaluation<O::Eval>;
    type Validation = PenalizedValidation;

    fn evaluate(&self, solution: &S) -> Self::Evaluation {
        let inner = self.objective.evaluate(solution);
        let penalty = self.penalty_sum(solution);
        PenalizedEvaluation::new(inner, penalty, self.objective.is_minimizing())
    }

    fn validate(&self, solution: &S) -> Self::Validation {
        self.mandatory_validation(solution)
    }

    fn is_minimizing(&self) -> bool {
        self.objective.is_minimizing()
    }

    fn random_solution(&self, rng: &mut StdRng) -> S {
        (self.generator)(rng)
    }
}

impl<S, O, G, M> DeltaProblem<S, M> for StandardProblem<S, O, G>
where
    S: Solution,
    M: Move<S>,
    O: DeltaObjective<S, M>,
    G: Fn(&mut StdRng) -> S + Send + Sync,
{
    fn evaluate_move(
        &self,
        mv: &M,
        solution: &mut S,
        current: &Self::Evaluation,
    ) -> Result<Self::Evaluation> {
        let inner = self
            .objective
            .evaluate_move(mv, solution, current.inner())?;
        // Constraint penalties are recomputed on the neighbouring solution;
        // constraints carry no delta path of their own.
        let penalty = if self.penalizing.is_empty() {
            0.0
        } else {
            mv.apply(solution)?;
            let p = self.penalty_sum(solution);
            mv.undo(solution)?;
            p
        };
        Ok(PenalizedEvaluation::new(
            inner,
            penalty,
            self.objective.is_minimizing(),
        ))
    }

    fn validate_move(
        &self,
        mv: &M,
        solution: &mut S,
        current: &Self::Validation,
    ) -> Result<Self::Validation> {
        if self.mandatory.is_empty() {
            return Ok(*current);
        }
        mv.apply(solution)?;
        let validation = self.mandatory_validation(solution);
        mv.undo(solution)?;
        Ok(validation)
    }
}
