//! End-to-end searches over a weighted subset selection problem.

use std::sync::Arc;
use std::time::Duration;

use wander::{
    DeltaObjective, Evaluation, MaxRuntime, MetropolisSearch, MultiSwapNeighbourhood, Objective,
    ParallelTempering, RandomDescent, Result, Search, SearchStatus, SimpleEvaluation,
    SingleSwapNeighbourhood, SteepestDescent, SubsetMove, SubsetProblem, SubsetSolution,
    TabuSearch,
};

/// Maximizes the summed weight of the selected IDs.
#[derive(Debug, Clone)]
struct TotalWeight {
    weights: Vec<f64>,
}

impl TotalWeight {
    fn linear(n: usize) -> Self {
        Self {
            weights: (0..n).map(|i| i as f64).collect(),
        }
    }
}

impl Objective<SubsetSolution> for TotalWeight {
    type Eval = SimpleEvaluation;

    fn evaluate(&self, solution: &SubsetSolution) -> SimpleEvaluation {
        SimpleEvaluation::of(solution.selected().map(|id| self.weights[id]).sum())
    }
}

impl DeltaObjective<SubsetSolution, SubsetMove> for TotalWeight {
    fn evaluate_move(
        &self,
        mv: &SubsetMove,
        _solution: &mut SubsetSolution,
        current: &SimpleEvaluation,
    ) -> Result<SimpleEvaluation> {
        let gained: f64 = mv.added_ids().iter().map(|&id| self.weights[id]).sum();
        let lost: f64 = mv.deleted_ids().iter().map(|&id| self.weights[id]).sum();
        Ok(SimpleEvaluation::of(current.value() + gained - lost))
    }
}

/// Select 5 of 20 items with weights 0..19; the optimum picks 15..19.
fn problem() -> Arc<SubsetProblem<TotalWeight>> {
    Arc::new(SubsetProblem::new(TotalWeight::linear(20), 0..20, 5))
}

const OPTIMUM: f64 = (15 + 16 + 17 + 18 + 19) as f64;

#[test]
fn steepest_descent_finds_the_exact_optimum() {
    let mut search = SteepestDescent::new(problem(), SingleSwapNeighbourhood::new());
    search
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    search.start().unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    assert_eq!(search.best_evaluation().unwrap().value(), OPTIMUM);
    let best = search.best_solution().unwrap();
    assert_eq!(best.selected().collect::<Vec<_>>(), vec![15, 16, 17, 18, 19]);
}

#[test]
fn steepest_descent_with_multi_swaps_converges_faster() {
    let mut single = SteepestDescent::new(problem(), SingleSwapNeighbourhood::new());
    let mut multi = SteepestDescent::new(problem(), MultiSwapNeighbourhood::new(3));
    single
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    multi
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    single.start().unwrap();
    multi.start().unwrap();
    assert_eq!(single.best_evaluation().unwrap().value(), OPTIMUM);
    assert_eq!(multi.best_evaluation().unwrap().value(), OPTIMUM);
    assert!(multi.steps() <= single.steps());
}

#[test]
fn random_descent_improves_under_a_runtime_budget() {
    let mut search = RandomDescent::new(problem(), SingleSwapNeighbourhood::new());
    search.core_mut().set_seed(1).unwrap();
    search
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    search.add_stop_criterion(Arc::new(MaxRuntime::new(Duration::from_millis(150))));
    search.start().unwrap();
    let best = search.best_evaluation().unwrap().value();
    let start: f64 = (0 + 1 + 2 + 3 + 4) as f64;
    assert!(best > start, "no improvement over the initial selection");
    // the selection size is invariant under swap moves
    assert_eq!(search.best_solution().unwrap().num_selected(), 5);
}

#[test]
fn metropolis_keeps_the_selection_size() {
    let mut search = MetropolisSearch::new(problem(), SingleSwapNeighbourhood::new(), 5.0);
    search.core_mut().set_seed(2).unwrap();
    search.add_stop_criterion(Arc::new(MaxRuntime::new(Duration::from_millis(100))));
    search.start().unwrap();
    let ns = search.neighbourhood_search();
    assert_eq!(ns.current_solution().unwrap().num_selected(), 5);
    assert_eq!(
        ns.accepted_moves() + ns.rejected_moves(),
        search.steps()
    );
}

#[test]
fn tabu_search_reaches_the_optimum() {
    let mut search = TabuSearch::new(problem(), SingleSwapNeighbourhood::new(), 10);
    search
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    search.add_stop_criterion(Arc::new(MaxRuntime::new(Duration::from_millis(300))));
    search.start().unwrap();
    assert_eq!(search.best_evaluation().unwrap().value(), OPTIMUM);
}

#[test]
fn parallel_tempering_solves_the_selection() {
    let mut search = ParallelTempering::with_seed(
        problem(),
        SingleSwapNeighbourhood::new(),
        6,
        0.05,
        5.0,
        7,
    );
    search.set_replica_steps(60).unwrap();
    search.add_stop_criterion(Arc::new(MaxRuntime::new(Duration::from_millis(400))));
    search.start().unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    let best = search.best_evaluation().unwrap().value();
    assert!(best >= OPTIMUM - 3.0, "best only reached {best}");
    for replica in search.replicas() {
        assert_eq!(replica.status(), SearchStatus::Idle);
    }
}

#[test]
fn fixed_ids_survive_a_whole_run() {
    // ids 0 and 1 are pinned into the selection, 19 is pinned out of it
    let neighbourhood = SingleSwapNeighbourhood::with_fixed_ids([0, 1, 19]);
    let mut search = RandomDescent::new(problem(), neighbourhood);
    search.core_mut().set_seed(3).unwrap();
    search
        .neighbourhood_search_mut()
        .set_current_solution(SubsetSolution::with_selection(0..20, 0..5))
        .unwrap();
    search.add_stop_criterion(Arc::new(MaxRuntime::new(Duration::from_millis(150))));
    search.start().unwrap();
    let best = search.best_solution().unwrap();
    assert!(best.is_selected(0));
    assert!(best.is_selected(1));
    assert!(!best.is_selected(19));
    // the remaining three slots climb towards the heavy items
    assert!(search.best_evaluation().unwrap().value() > 10.0);
}
