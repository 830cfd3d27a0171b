//! Subset neighbourhoods.
//!
//! All neighbourhoods honor an optional set of fixed IDs: no generated move
//! ever adds or removes a fixed ID. Candidates are always drawn from
//! `selected \ fixed` (for removal) and `unselected \ fixed` (for
//! addition).

mod multi_swap;
mod single_perturbation;
mod single_swap;

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::index;
use smallvec::SmallVec;

use crate::solution::SubsetSolution;

pub use multi_swap::MultiSwapNeighbourhood;
pub use single_perturbation::SinglePerturbationNeighbourhood;
pub use single_swap::SingleSwapNeighbourhood;

/// Shared fixed-ID handling of the subset neighbourhoods.
#[derive(Debug, Clone, Default)]
pub(crate) struct FixedIdFilter {
    fixed: Option<HashSet<usize>>,
}

impl FixedIdFilter {
    pub(crate) fn none() -> Self {
        Self { fixed: None }
    }

    pub(crate) fn new(fixed: impl IntoIterator<Item = usize>) -> Self {
        Self {
            fixed: Some(fixed.into_iter().collect()),
        }
    }

    fn is_fixed(&self, id: usize) -> bool {
        self.fixed.as_ref().is_some_and(|fixed| fixed.contains(&id))
    }

    /// Selected IDs that may be removed, in ascending order.
    pub(crate) fn remove_candidates(&self, solution: &SubsetSolution) -> Vec<usize> {
        solution.selected().filter(|&id| !self.is_fixed(id)).collect()
    }

    /// Unselected IDs that may be added, in ascending order.
    pub(crate) fn add_candidates(&self, solution: &SubsetSolution) -> Vec<usize> {
        solution
            .unselected()
            .filter(|&id| !self.is_fixed(id))
            .collect()
    }
}

/// Draws `amount` distinct IDs uniformly from the pool.
pub(crate) fn sample_ids(
    pool: &[usize],
    amount: usize,
    rng: &mut StdRng,
) -> SmallVec<[usize; 2]> {
    index::sample(rng, pool.len(), amount)
        .into_iter()
        .map(|i| pool[i])
        .collect()
}

/// Enumerates all `k`-element combinations of the pool, in lexicographic
/// order of pool indices.
pub(crate) fn combinations(pool: &[usize], k: usize) -> Vec<SmallVec<[usize; 2]>> {
    if k == 0 || k > pool.len() {
        return Vec::new();
    }
    let mut result = Vec::new();
    let mut indices: Vec<usize> = (0..k).collect();
    loop {
        result.push(indices.iter().map(|&i| pool[i]).collect());
        // advance to the next combination
        let mut i = k;
        loop {
            if i == 0 {
                return result;
            }
            i -= 1;
            if indices[i] != i + pool.len() - k {
                break;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn combinations_enumerate_binomials() {
        let pool = [1, 2, 3, 4, 5];
        assert_eq!(combinations(&pool, 1).len(), 5);
        assert_eq!(combinations(&pool, 2).len(), 10);
        assert_eq!(combinations(&pool, 3).len(), 10);
        assert_eq!(combinations(&pool, 5).len(), 1);
        assert_eq!(combinations(&pool, 6).len(), 0);
        assert_eq!(combinations(&pool, 0).len(), 0);
    }

    #[test]
    fn combinations_are_distinct() {
        let pool = [0, 1, 2, 3, 4, 5];
        let combos = combinations(&pool, 3);
        let unique: std::collections::HashSet<_> = combos.iter().cloned().collect();
        assert_eq!(unique.len(), combos.len());
    }

    #[test]
    fn sampling_respects_the_pool() {
        let pool = [2, 4, 6, 8];
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let sample = sample_ids(&pool, 2, &mut rng);
            assert_eq!(sample.len(), 2);
            assert!(sample.iter().all(|id| pool.contains(id)));
            assert_ne!(sample[0], sample[1]);
        }
    }

    #[test]
    fn fixed_ids_are_filtered_from_candidates() {
        let solution = SubsetSolution::with_selection(0..6, [0, 1, 2]);
        let filter = FixedIdFilter::new([0, 3]);
        assert_eq!(filter.remove_candidates(&solution), vec![1, 2]);
        assert_eq!(filter.add_candidates(&solution), vec![4, 5]);
    }
}
