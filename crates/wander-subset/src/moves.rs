//! Subset moves.

use smallvec::SmallVec;

use wander_core::error::{Result, SearchError};
use wander_core::neigh::Move;

use crate::solution::SubsetSolution;

type IdSet = SmallVec<[usize; 2]>;

/// A move that adds and/or removes IDs from a subset solution's selection.
///
/// Covers single additions, single deletions, one-for-one swaps and general
/// k-swaps. The added and deleted ID sets are disjoint and kept sorted, so
/// two moves producing the same mutation compare and hash equal no matter
/// how they were constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubsetMove {
    add: IdSet,
    delete: IdSet,
}

impl SubsetMove {
    /// Creates a move adding and removing the given IDs.
    ///
    /// Duplicates are collapsed.
    ///
    /// # Panics
    ///
    /// Panics if an ID occurs in both sets, or if both sets are empty.
    pub fn new(
        add: impl IntoIterator<Item = usize>,
        delete: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut add: IdSet = add.into_iter().collect();
        let mut delete: IdSet = delete.into_iter().collect();
        add.sort_unstable();
        add.dedup();
        delete.sort_unstable();
        delete.dedup();
        assert!(
            !add.is_empty() || !delete.is_empty(),
            "a subset move must add or delete at least one id"
        );
        assert!(
            add.iter().all(|id| !delete.contains(id)),
            "added and deleted ids must be disjoint"
        );
        Self { add, delete }
    }

    /// Move selecting a single ID.
    pub fn addition(id: usize) -> Self {
        Self::new([id], [])
    }

    /// Move deselecting a single ID.
    pub fn deletion(id: usize) -> Self {
        Self::new([], [id])
    }

    /// Move exchanging one unselected ID for one selected ID.
    pub fn swap(add: usize, delete: usize) -> Self {
        Self::new([add], [delete])
    }

    /// IDs added to the selection, in ascending order.
    pub fn added_ids(&self) -> &[usize] {
        &self.add
    }

    /// IDs removed from the selection, in ascending order.
    pub fn deleted_ids(&self) -> &[usize] {
        &self.delete
    }

    /// Number of added IDs.
    pub fn num_added(&self) -> usize {
        self.add.len()
    }

    /// Number of deleted IDs.
    pub fn num_deleted(&self) -> usize {
        self.delete.len()
    }
}

impl Move<SubsetSolution> for SubsetMove {
    fn apply(&self, solution: &mut SubsetSolution) -> Result<()> {
        for &id in &self.delete {
            if !solution.deselect(id)? {
                return Err(SearchError::IncompatibleMove(format!(
                    "cannot deselect id {id}: it is not selected"
                )));
            }
        }
        for &id in &self.add {
            if !solution.select(id)? {
                return Err(SearchError::IncompatibleMove(format!(
                    "cannot select id {id}: it is already selected"
                )));
            }
        }
        Ok(())
    }

    fn undo(&self, solution: &mut SubsetSolution) -> Result<()> {
        for &id in &self.add {
            if !solution.deselect(id)? {
                return Err(SearchError::IncompatibleMove(format!(
                    "cannot undo selection of id {id}: it is not selected"
                )));
            }
        }
        for &id in &self.delete {
            if !solution.select(id)? {
                return Err(SearchError::IncompatibleMove(format!(
                    "cannot undo deselection of id {id}: it is already selected"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(mv: &SubsetMove) -> u64 {
        let mut hasher = DefaultHasher::new();
        mv.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn construction_order_does_not_matter_for_equality() {
        let a = SubsetMove::new([3, 1], [7, 5]);
        let b = SubsetMove::new([1, 3], [5, 7]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    #[should_panic(expected = "disjoint")]
    fn overlapping_sets_are_rejected() {
        SubsetMove::new([1, 2], [2, 3]);
    }

    #[test]
    #[should_panic(expected = "at least one id")]
    fn empty_moves_are_rejected() {
        SubsetMove::new([], []);
    }

    #[test]
    fn apply_then_undo_restores_the_solution() {
        let mut solution = SubsetSolution::with_selection(0..10, [0, 1, 2]);
        let original = solution.clone();
        let mv = SubsetMove::new([5, 6], [0, 2]);
        mv.apply(&mut solution).unwrap();
        assert_eq!(
            solution.selected().collect::<Vec<_>>(),
            vec![1, 5, 6]
        );
        mv.undo(&mut solution).unwrap();
        assert_eq!(solution, original);
    }

    #[test]
    fn swaps_preserve_selection_size() {
        let mut solution = SubsetSolution::with_selection(0..10, [0, 1, 2]);
        let mv = SubsetMove::swap(9, 1);
        mv.apply(&mut solution).unwrap();
        assert_eq!(solution.num_selected(), 3);
    }

    #[test]
    fn applying_to_an_incompatible_selection_fails() {
        let mut solution = SubsetSolution::with_selection(0..5, [0]);
        // id 1 is not selected, deleting it is incompatible
        let mv = SubsetMove::deletion(1);
        assert!(matches!(
            mv.apply(&mut solution),
            Err(SearchError::IncompatibleMove(_))
        ));
        // id 0 is already selected, adding it again is incompatible
        let mv = SubsetMove::addition(0);
        assert!(matches!(
            mv.apply(&mut solution),
            Err(SearchError::IncompatibleMove(_))
        ));
    }
}
