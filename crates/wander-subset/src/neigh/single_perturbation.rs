//! Single perturbation neighbourhood.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::Rng;

use wander_core::neigh::Neighbourhood;

use crate::moves::SubsetMove;
use crate::solution::SubsetSolution;

use super::FixedIdFilter;

/// Neighbourhood performing a single addition, deletion or swap, keeping
/// the selection size within `[min_size, max_size]`.
///
/// Additions are generated only while the selection can still grow,
/// deletions only while it can still shrink, and swaps only when the
/// current size is already within bounds. With `s` removable and `u`
/// addable IDs the full enumeration holds up to `s·u + s + u` moves.
///
/// Random move generation weighs each kind by its number of individual
/// moves (`u` additions, `s` deletions, `s·u` swaps), so that every
/// individual move is generated with equal probability.
#[derive(Debug, Clone)]
pub struct SinglePerturbationNeighbourhood {
    min_size: usize,
    max_size: usize,
    filter: FixedIdFilter,
}

impl SinglePerturbationNeighbourhood {
    /// Creates a perturbation neighbourhood keeping the selection size
    /// within the given bounds.
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size`.
    pub fn new(min_size: usize, max_size: usize) -> Self {
        assert!(
            min_size <= max_size,
            "minimum subset size exceeds maximum subset size"
        );
        Self {
            min_size,
            max_size,
            filter: FixedIdFilter::none(),
        }
    }

    /// Creates a perturbation neighbourhood with fixed IDs that no move may
    /// add or remove.
    ///
    /// # Panics
    ///
    /// Panics if `min_size > max_size`.
    pub fn with_fixed_ids(
        min_size: usize,
        max_size: usize,
        fixed: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut neighbourhood = Self::new(min_size, max_size);
        neighbourhood.filter = FixedIdFilter::new(fixed);
        neighbourhood
    }

    /// Minimum selection size.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Maximum selection size.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    fn size_within_bounds(&self, size: usize) -> bool {
        size >= self.min_size && size <= self.max_size
    }

    /// Number of individual addition, deletion and swap moves for the given
    /// candidate sets; infeasible kinds count zero.
    fn kind_weights(
        &self,
        solution: &SubsetSolution,
        add: &[usize],
        remove: &[usize],
    ) -> (usize, usize, usize) {
        let size = solution.num_selected();
        let num_add = if !add.is_empty() && size + 1 <= self.max_size {
            add.len()
        } else {
            0
        };
        let num_del = if !remove.is_empty() && size >= self.min_size + 1 {
            remove.len()
        } else {
            0
        };
        let num_swap = if !add.is_empty() && !remove.is_empty() && self.size_within_bounds(size) {
            add.len() * remove.len()
        } else {
            0
        };
        (num_add, num_del, num_swap)
    }
}

impl Neighbourhood<SubsetSolution> for SinglePerturbationNeighbourhood {
    type Move = SubsetMove;

    fn random_move(&self, solution: &SubsetSolution, rng: &mut StdRng) -> Option<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let (num_add, num_del, num_swap) = self.kind_weights(solution, &add, &remove);
        let total = num_add + num_del + num_swap;
        if total == 0 {
            return None;
        }
        // roulette draw over the kinds, weighted by their move counts
        let roll = rng.random_range(0..total);
        if roll < num_add {
            Some(SubsetMove::addition(*add.choose(rng)?))
        } else if roll < num_add + num_del {
            Some(SubsetMove::deletion(*remove.choose(rng)?))
        } else {
            Some(SubsetMove::swap(*add.choose(rng)?, *remove.choose(rng)?))
        }
    }

    fn all_moves(&self, solution: &SubsetSolution) -> Vec<SubsetMove> {
        let remove = self.filter.remove_candidates(solution);
        let add = self.filter.add_candidates(solution);
        let (num_add, num_del, num_swap) = self.kind_weights(solution, &add, &remove);
        let mut moves = Vec::with_capacity(num_add + num_del + num_swap);
        if num_add > 0 {
            moves.extend(add.iter().map(|&id| SubsetMove::addition(id)));
        }
        if num_del > 0 {
            moves.extend(remove.iter().map(|&id| SubsetMove::deletion(id)));
        }
        if num_swap > 0 {
            for &delete_id in &remove {
                for &add_id in &add {
                    moves.push(SubsetMove::swap(add_id, delete_id));
                }
            }
        }
        moves
    }
}
