//! Wander — a metaheuristic local-search framework.
//!
//! You supply a problem (solution representation, objective, constraints)
//! and a neighbourhood (how to perturb a solution); wander drives iterative
//! improvement by generating candidate moves, evaluating them
//! incrementally, and accepting or rejecting them according to a pluggable
//! search strategy.
//!
//! # Quick Start
//!
//! Select 5 out of 20 weighted items, maximizing the total weight:
//!
//! ```
//! use std::sync::Arc;
//! use wander::{
//!     DeltaObjective, Evaluation, MaxSteps, Objective, ParallelTempering,
//!     Search, SimpleEvaluation, SingleSwapNeighbourhood, SubsetMove,
//!     SubsetProblem, SubsetSolution,
//! };
//!
//! #[derive(Debug)]
//! struct TotalWeight(Vec<f64>);
//!
//! impl Objective<SubsetSolution> for TotalWeight {
//!     type Eval = SimpleEvaluation;
//!     fn evaluate(&self, s: &SubsetSolution) -> SimpleEvaluation {
//!         SimpleEvaluation::of(s.selected().map(|id| self.0[id]).sum())
//!     }
//! }
//!
//! impl DeltaObjective<SubsetSolution, SubsetMove> for TotalWeight {
//!     fn evaluate_move(
//!         &self,
//!         mv: &SubsetMove,
//!         _s: &mut SubsetSolution,
//!         cur: &SimpleEvaluation,
//!     ) -> wander::Result<SimpleEvaluation> {
//!         let gained: f64 = mv.added_ids().iter().map(|&id| self.0[id]).sum();
//!         let lost: f64 = mv.deleted_ids().iter().map(|&id| self.0[id]).sum();
//!         Ok(SimpleEvaluation::of(cur.value() + gained - lost))
//!     }
//! }
//!
//! let weights: Vec<f64> = (0..20).map(|i| i as f64).collect();
//! let problem = Arc::new(SubsetProblem::new(TotalWeight(weights), 0..20, 5));
//! let mut search = ParallelTempering::with_seed(
//!     problem,
//!     SingleSwapNeighbourhood::new(),
//!     4,    // replicas
//!     0.01, // minimum temperature
//!     1.0,  // maximum temperature
//!     42,
//! );
//! search.add_stop_criterion(Arc::new(MaxSteps::new(10)));
//! search.start().unwrap();
//! let best = search.best_solution().unwrap();
//! assert_eq!(best.num_selected(), 5);
//! ```

// Core contracts
pub use wander_core::constants;
pub use wander_core::{
    evaluate_move_by_recomputation, validate_move_by_recomputation, Constraint, DeltaObjective,
    DeltaProblem, Evaluation, Move, Neighbourhood, Objective, PenalizedEvaluation,
    PenalizedValidation, Problem, Result, SearchError, SearchStatus, SimpleEvaluation,
    SimpleValidation, Solution, StandardProblem, Validation,
};

// Search engine
pub use wander_search::{
    CachePolicy, EvaluatedMoveCache, ListenerBus, LocalSearchCore, MaxRuntime, MaxSteps,
    MaxStepsWithoutImprovement, MaxTimeWithoutImprovement, MetropolisSearch, MinDelta,
    MoveTabuMemory, NeighbourhoodSearchCore, ParallelTempering, RandomDescent, Search, SearchCore,
    SearchHandle, SearchListener, SearchSnapshot, SingleEntryCache, SteepestDescent, StopCriterion,
    TabuSearch, UnboundedCache, DEFAULT_CHECK_PERIOD,
};

// Subset selection support
pub use wander_subset::{
    MultiSwapNeighbourhood, SinglePerturbationNeighbourhood, SingleSwapNeighbourhood, SubsetMove,
    SubsetProblem, SubsetSolution,
};
