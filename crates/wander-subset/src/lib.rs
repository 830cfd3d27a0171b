//! Subset selection support for the wander framework.
//!
//! Many combinatorial problems reduce to picking a subset of IDs out of a
//! universe: feature selection, core selection, sensor placement. This crate
//! provides the pieces to plug such problems into `wander-search`:
//!
//! - [`SubsetSolution`]: a partition of a fixed universe of IDs into
//!   selected and unselected
//! - [`SubsetMove`]: a reversible move adding and/or removing IDs
//! - neighbourhoods generating swap and perturbation moves, with optional
//!   fixed IDs that no move may touch
//! - [`SubsetProblem`]: wraps an objective with subset-size validation

pub mod moves;
pub mod neigh;
pub mod problem;
pub mod solution;

pub use moves::SubsetMove;
pub use neigh::{
    MultiSwapNeighbourhood, SinglePerturbationNeighbourhood, SingleSwapNeighbourhood,
};
pub use problem::SubsetProblem;
pub use solution::SubsetSolution;
