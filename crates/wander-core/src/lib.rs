//! Core contracts of the wander local-search framework.
//!
//! This crate defines the data model shared by every search strategy:
//! - [`Solution`], [`Move`] and [`Neighbourhood`] — how solutions are
//!   represented and perturbed
//! - [`Objective`], [`Constraint`] and [`Problem`] — how solutions are
//!   evaluated and validated, in full or incrementally per move
//! - [`Evaluation`] and [`Validation`] — the outcome types
//! - [`SearchStatus`] — the lifecycle state machine of a search
//! - [`SearchError`] — the failure taxonomy
//!
//! The search engine itself lives in `wander-search`; ready-made subset
//! selection support lives in `wander-subset`.

pub mod constants;
pub mod error;
pub mod eval;
pub mod neigh;
pub mod problem;
pub mod solution;
pub mod status;
pub mod validation;

pub use error::{Result, SearchError};
pub use eval::{Evaluation, PenalizedEvaluation, SimpleEvaluation};
pub use neigh::{Move, Neighbourhood};
pub use problem::{
    evaluate_move_by_recomputation, validate_move_by_recomputation, Constraint, DeltaObjective,
    DeltaProblem, Objective, Problem, StandardProblem,
};
pub use solution::Solution;
pub use status::SearchStatus;
pub use validation::{PenalizedValidation, SimpleValidation, Validation};
