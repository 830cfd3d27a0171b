//! Concrete search strategies.
//!
//! Every strategy embeds a
//! [`NeighbourhoodSearchCore`](crate::neigh_search::NeighbourhoodSearchCore)
//! and implements one step of its algorithm with the core's primitives.

mod metropolis;
mod parallel_tempering;
mod random_descent;
mod steepest_descent;
mod tabu;

pub use metropolis::MetropolisSearch;
pub use parallel_tempering::ParallelTempering;
pub use random_descent::RandomDescent;
pub use steepest_descent::SteepestDescent;
pub use tabu::{MoveTabuMemory, TabuSearch};
