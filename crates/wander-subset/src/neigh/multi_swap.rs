//! Multi swap neighbourhood.

use rand::rngs::StdRng;
use rand::Rng;

use wander_core::neigh::Neighbourhood;

use crate::moves::SubsetMove;
use crate::solution::SubsetSolution;

use super::{combinations, sample_ids, FixedIdFilter};

/// Neighbourhood performing up to `max_swaps` simultaneous swaps of
/// selected and unselected IDs. Selection size is preserved by every move.
///
/// The number of moves grows very quickly: with `s` removable and `u`
/// addable IDs it is `Σ_{i=1..min(k,s,u)} C(s,i) · C(u,i)`, which already
/// exceeds one million when selecting 30 out of 100 items with `k = 2`.
/// Use full enumeration with care; random move generation stays cheap.
///
/// Random moves first draw the number of swaps uniformly from the feasible
/// range and then draw uniform ID subsets of that size, so individual moves
/// performing fewer swaps are more likely than individual moves performing
/// more.
#[derive(Debug, Clone)]
pub struct MultiSwapNeighbourhood {
    max_swaps: usize,
    filter: FixedIdFilter,
}

impl MultiSwapNeighbourhood {
    /// Creates a multi swap neighbourhood without fixed IDs.
    ///
    /// With `max_swaps == 1` this generates exactly the moves of
    /// [`SingleSwapNeighbourhood`](super::SingleSwapNeighbourhood), which is
    /// cheaper for that case.
    ///
    /// # Panics
    ///
    /// Panics if `max_swaps` is zero.
    pub fn new(max_swaps: usize) -> Self {
        assert!(max_swaps > 0, "maximum number of swaps must be strictly positive");
        Self {
            max_swaps,
            filter: FixedIdFilter::none(),
        }
    }

    /// Creates a multi swap neighbourhood with fixed IDs that no move may
    /// add or remove.
    ///
    /// # Panics
    ///
    /// Panics if `max_swaps` is zero.
    pub fn with_fixed_ids(max_swaps: usize, fixed: impl IntoIterator<Item = usize>) -> Self {
        assert!(max_swaps > 0, "maximum number of swaps must be strictly positive");
        Self {
            max_swaps,
            filter: FixedIdFilter::new(fixed),
        }
    }

    /// The maximum number of simultaneous swaps.
    pub fn max_swaps(&self) -> usize {
        self.max_swaps
    }

    fn feasible_swaps(&self, remove: &[usize], add: &[usize]) -> usize {
        self.max_swaps.min(remove.len()).min(add.len())
    }
}

impl Neighbourhood<SubsetSolution> for MultiSwapNeighbourhood {
    type Move = SubsetMove;

    fn random_move(&self, solution: &SubsetSolution, rng: &mut StdRng) -> Option<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let feasible = self.feasible_swaps(&remove, &add);
        if feasible == 0 {
            return None;
        }
        let num_swaps = rng.random_range(1..=feasible);
        let delete_ids = sample_ids(&remove, num_swaps, rng);
        let add_ids = sample_ids(&add, num_swaps, rng);
        Some(SubsetMove::new(add_ids, delete_ids))
    }

    fn all_moves(&self, solution: &SubsetSolution) -> Vec<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let feasible = self.feasible_swaps(&remove, &add);
        let mut moves = Vec::new();
        for swaps in 1..=feasible {
            for delete_ids in combinations(&remove, swaps) {
                for add_ids in combinations(&add, swaps) {
                    moves.push(SubsetMove::new(add_ids, delete_ids.clone()));
                }
            }
        }
        moves
    }
}
