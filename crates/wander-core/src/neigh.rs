//! Move and neighbourhood contracts.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use rand::rngs::StdRng;

use crate::error::Result;

/// A mutation plan that can be applied to, and undone on, a solution.
///
/// Moves are value-like: two moves that produce identical mutations must
/// compare and hash equal, which the evaluated-move cache relies on. A search
/// may apply a move speculatively and undo it later, or apply it once and
/// never undo it (accepted moves); `undo` directly after `apply` must restore
/// the solution to a structurally equal state.
pub trait Move<S>: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Applies this move to the given solution, mutating it in place.
    ///
    /// Fails with [`SearchError::IncompatibleMove`](crate::SearchError) if the
    /// move cannot be applied to the solution in its current state.
    fn apply(&self, solution: &mut S) -> Result<()>;

    /// Restores the solution to the state it had just before `apply`.
    fn undo(&self, solution: &mut S) -> Result<()>;
}

/// A family of moves reachable in one step from a given solution.
///
/// Neighbourhoods must be safe to use from several searches concurrently
/// (for distinct solutions); they hold configuration, never search state.
pub trait Neighbourhood<S>: Send + Sync {
    /// The type of move this neighbourhood generates.
    type Move: Move<S>;

    /// Generates a single random move for the given solution.
    ///
    /// Returns `None` iff no move can be generated, e.g. because the
    /// neighbourhood is exhausted or every candidate is fixed.
    fn random_move(&self, solution: &S, rng: &mut StdRng) -> Option<Self::Move>;

    /// Generates all distinct moves for the given solution. May be empty.
    ///
    /// Implementations document how the number of moves grows with the
    /// solution dimensions; it can be very large.
    fn all_moves(&self, solution: &S) -> Vec<Self::Move>;
}

impl<S, N: Neighbourhood<S>> Neighbourhood<S> for Arc<N> {
    type Move = N::Move;

    fn random_move(&self, solution: &S, rng: &mut StdRng) -> Option<Self::Move> {
        (**self).random_move(solution, rng)
    }

    fn all_moves(&self, solution: &S) -> Vec<Self::Move> {
        (**self).all_moves(solution)
    }
}
