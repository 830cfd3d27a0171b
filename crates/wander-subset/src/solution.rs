//! Subset solution: a universe of IDs partitioned into selected and
//! unselected.

use std::collections::BTreeSet;

use wander_core::error::{Result, SearchError};

/// Solution of a subset selection problem.
///
/// Holds a fixed universe of `usize` IDs, each either selected or
/// unselected. Ordered sets keep iteration deterministic, which
/// neighbourhood enumerations and sampling rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetSolution {
    selected: BTreeSet<usize>,
    unselected: BTreeSet<usize>,
}

impl SubsetSolution {
    /// Creates a solution over the given universe with nothing selected.
    pub fn new(ids: impl IntoIterator<Item = usize>) -> Self {
        Self {
            selected: BTreeSet::new(),
            unselected: ids.into_iter().collect(),
        }
    }

    /// Creates a solution over the given universe with an initial selection.
    ///
    /// # Panics
    ///
    /// Panics if the selection contains an ID outside the universe.
    pub fn with_selection(
        ids: impl IntoIterator<Item = usize>,
        selection: impl IntoIterator<Item = usize>,
    ) -> Self {
        let mut solution = Self::new(ids);
        for id in selection {
            assert!(
                solution.unselected.contains(&id),
                "selected id {id} is not part of the universe"
            );
            solution.unselected.remove(&id);
            solution.selected.insert(id);
        }
        solution
    }

    /// Selects the given ID. Returns whether the selection changed, i.e.
    /// `false` if the ID was already selected.
    ///
    /// Fails when the ID is not part of the universe.
    pub fn select(&mut self, id: usize) -> Result<bool> {
        if self.selected.contains(&id) {
            return Ok(false);
        }
        if !self.unselected.remove(&id) {
            return Err(SearchError::IncompatibleSolution(format!(
                "id {id} is not part of the universe"
            )));
        }
        self.selected.insert(id);
        Ok(true)
    }

    /// Deselects the given ID. Returns whether the selection changed.
    ///
    /// Fails when the ID is not part of the universe.
    pub fn deselect(&mut self, id: usize) -> Result<bool> {
        if self.unselected.contains(&id) {
            return Ok(false);
        }
        if !self.selected.remove(&id) {
            return Err(SearchError::IncompatibleSolution(format!(
                "id {id} is not part of the universe"
            )));
        }
        self.unselected.insert(id);
        Ok(true)
    }

    /// Whether the given ID is currently selected.
    pub fn is_selected(&self, id: usize) -> bool {
        self.selected.contains(&id)
    }

    /// The selected IDs, in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = usize> + '_ {
        self.selected.iter().copied()
    }

    /// The unselected IDs, in ascending order.
    pub fn unselected(&self) -> impl Iterator<Item = usize> + '_ {
        self.unselected.iter().copied()
    }

    /// All IDs of the universe, in ascending order.
    pub fn all_ids(&self) -> impl Iterator<Item = usize> + '_ {
        // the two sets are disjoint; merge preserves ascending order
        let mut ids: Vec<usize> = self.selected().chain(self.unselected()).collect();
        ids.sort_unstable();
        ids.into_iter()
    }

    /// Number of selected IDs.
    pub fn num_selected(&self) -> usize {
        self.selected.len()
    }

    /// Number of unselected IDs.
    pub fn num_unselected(&self) -> usize {
        self.unselected.len()
    }

    /// Size of the universe.
    pub fn total_ids(&self) -> usize {
        self.selected.len() + self.unselected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_unselected() {
        let solution = SubsetSolution::new(0..5);
        assert_eq!(solution.num_selected(), 0);
        assert_eq!(solution.num_unselected(), 5);
        assert_eq!(solution.total_ids(), 5);
    }

    #[test]
    fn select_and_deselect_move_ids_between_partitions() {
        let mut solution = SubsetSolution::new(0..4);
        assert!(solution.select(2).unwrap());
        assert!(solution.is_selected(2));
        assert_eq!(solution.num_selected(), 1);
        // selecting again changes nothing
        assert!(!solution.select(2).unwrap());
        assert!(solution.deselect(2).unwrap());
        assert!(!solution.is_selected(2));
        assert!(!solution.deselect(2).unwrap());
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut solution = SubsetSolution::new(0..4);
        assert!(solution.select(9).is_err());
        assert!(solution.deselect(9).is_err());
    }

    #[test]
    fn with_selection_preselects() {
        let solution = SubsetSolution::with_selection(0..6, [1, 3, 5]);
        assert_eq!(solution.selected().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(solution.unselected().collect::<Vec<_>>(), vec![0, 2, 4]);
    }

    #[test]
    #[should_panic(expected = "not part of the universe")]
    fn with_selection_rejects_foreign_ids() {
        SubsetSolution::with_selection(0..3, [7]);
    }

    #[test]
    fn structural_equality_ignores_history() {
        let mut a = SubsetSolution::new(0..4);
        a.select(1).unwrap();
        a.select(2).unwrap();
        a.deselect(1).unwrap();
        let b = SubsetSolution::with_selection(0..4, [2]);
        assert_eq!(a, b);
    }
}
