//! Single swap neighbourhood.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use wander_core::neigh::Neighbourhood;

use crate::moves::SubsetMove;
use crate::solution::SubsetSolution;

use super::FixedIdFilter;

/// Neighbourhood that swaps exactly one selected ID for one unselected ID.
///
/// The selection size is preserved by every move, making this neighbourhood
/// suited for fixed-size subset problems. For a solution with `s` removable
/// and `u` addable IDs there are `s · u` moves.
#[derive(Debug, Clone, Default)]
pub struct SingleSwapNeighbourhood {
    filter: FixedIdFilter,
}

impl SingleSwapNeighbourhood {
    /// Creates a single swap neighbourhood without fixed IDs.
    pub fn new() -> Self {
        Self {
            filter: FixedIdFilter::none(),
        }
    }

    /// Creates a single swap neighbourhood with fixed IDs that no move may
    /// add or remove.
    pub fn with_fixed_ids(fixed: impl IntoIterator<Item = usize>) -> Self {
        Self {
            filter: FixedIdFilter::new(fixed),
        }
    }
}

impl Neighbourhood<SubsetSolution> for SingleSwapNeighbourhood {
    type Move = SubsetMove;

    fn random_move(&self, solution: &SubsetSolution, rng: &mut StdRng) -> Option<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let delete_id = *remove.choose(rng)?;
        let add_id = *add.choose(rng)?;
        Some(SubsetMove::swap(add_id, delete_id))
    }

    fn all_moves(&self, solution: &SubsetSolution) -> Vec<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let mut moves = Vec::with_capacity(remove.len() * add.len());
        for &delete_id in &remove {
            for &add_id in &add {
                moves.push(SubsetMove::swap(add_id, delete_id));
            }
        }
        moves
    }
}
