//! Engine-level tests exercising the lifecycle across modules.

use std::sync::Arc;
use std::time::Duration;

use wander_core::constants::{INVALID_MOVE_COUNT, INVALID_STEP_COUNT, INVALID_TIME_SPAN};
use wander_core::error::SearchError;
use wander_core::eval::Evaluation;
use wander_core::status::SearchStatus;

use crate::algo::RandomDescent;
use crate::cache::CachePolicy;
use crate::search::Search;
use crate::stop::{MaxRuntime, MaxSteps, MaxStepsWithoutImprovement, StopCriterion};
use crate::test_utils::{one_max_arc, FlipNeighbourhood, TestProblem};

type Descent = RandomDescent<Vec<bool>, TestProblem, FlipNeighbourhood>;

fn descent() -> Descent {
    RandomDescent::new(one_max_arc::<10>(), FlipNeighbourhood)
}

#[test]
fn metadata_is_invalid_before_the_first_run() {
    let search = descent();
    assert_eq!(search.steps(), INVALID_STEP_COUNT);
    assert_eq!(search.runtime(), INVALID_TIME_SPAN);
    assert_eq!(search.time_without_improvement(), INVALID_TIME_SPAN);
    assert_eq!(
        search.neighbourhood_search().accepted_moves(),
        INVALID_MOVE_COUNT
    );
    assert_eq!(
        search.neighbourhood_search().rejected_moves(),
        INVALID_MOVE_COUNT
    );
}

#[test]
fn metadata_is_valid_after_a_run() {
    let mut search = descent();
    search.core_mut().set_seed(3).unwrap();
    search.core_mut().set_step_budget(Some(20));
    search.start().unwrap();
    assert_eq!(search.steps(), 20);
    assert!(search.runtime() >= 0);
    assert!(search.time_without_improvement() >= 0);
}

#[test]
fn metadata_is_invalid_while_initializing() {
    // drive the status machine by hand to observe the initializing window
    let search = descent();
    search
        .core()
        .control_arc()
        .advance(SearchStatus::Initializing, "test")
        .unwrap();
    assert_eq!(search.steps(), INVALID_STEP_COUNT);
    assert_eq!(search.runtime(), INVALID_TIME_SPAN);
    assert_eq!(search.min_delta(), wander_core::constants::INVALID_DELTA);
    assert_eq!(
        search.neighbourhood_search().accepted_moves(),
        INVALID_MOVE_COUNT
    );
}

#[test]
fn configuration_requires_idle_status() {
    let mut search = descent();
    search
        .core()
        .control_arc()
        .advance(SearchStatus::Initializing, "test")
        .unwrap();
    search
        .core()
        .control_arc()
        .advance(SearchStatus::Running, "test")
        .unwrap();
    let ns = search.neighbourhood_search_mut();
    assert!(matches!(
        ns.set_evaluated_move_cache(CachePolicy::Unbounded),
        Err(SearchError::BadStatus { .. })
    ));
    assert!(matches!(
        ns.set_neighbourhood(FlipNeighbourhood),
        Err(SearchError::BadStatus { .. })
    ));
    assert!(matches!(
        ns.set_current_solution(vec![true]),
        Err(SearchError::BadStatus { .. })
    ));
    assert!(matches!(
        search.set_stop_criterion_check_period(Duration::from_millis(10)),
        Err(SearchError::BadStatus { .. })
    ));
}

#[test]
fn start_while_running_is_a_bad_status() {
    let mut search = descent();
    search
        .core()
        .control_arc()
        .advance(SearchStatus::Initializing, "test")
        .unwrap();
    assert!(matches!(
        search.start(),
        Err(SearchError::BadStatus { .. })
    ));
}

#[test]
fn dispose_then_start_fails() {
    let mut search = descent();
    search.dispose().unwrap();
    assert_eq!(search.status(), SearchStatus::Disposed);
    assert!(matches!(
        search.start(),
        Err(SearchError::BadStatus { .. })
    ));
    // disposing twice is also a protocol violation
    assert!(search.dispose().is_err());
}

#[test]
fn max_steps_criterion_ends_the_run() {
    let mut search = descent();
    search.set_stop_criterion_check_period(Duration::from_millis(2)).unwrap();
    search.add_stop_criterion(Arc::new(MaxSteps::new(10)));
    search.start().unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    // asynchronous checking may overshoot slightly, but not unboundedly
    assert!(search.steps() >= 10);
}

#[test]
fn max_runtime_criterion_ends_the_run() {
    let mut search = descent();
    search.add_stop_criterion(Arc::new(MaxRuntime::millis(100)));
    search.start().unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    assert!(search.runtime() >= 100);
}

#[test]
fn unimproved_steps_criterion_ends_the_run() {
    let mut search = descent();
    search.core_mut().set_seed(8).unwrap();
    search.set_stop_criterion_check_period(Duration::from_millis(2)).unwrap();
    search.add_stop_criterion(Arc::new(MaxStepsWithoutImprovement::new(200)));
    search.start().unwrap();
    assert_eq!(search.status(), SearchStatus::Idle);
    // the optimum was reached long before the criterion fired
    assert_eq!(search.best_evaluation().unwrap().value(), 10.0);
}

#[test]
fn criteria_can_be_removed_again() {
    let search = descent();
    let criterion: Arc<dyn StopCriterion> = Arc::new(MaxSteps::new(5));
    search.add_stop_criterion(Arc::clone(&criterion));
    assert!(search.remove_stop_criterion(&criterion));
    assert!(!search.remove_stop_criterion(&criterion));
}

#[test]
fn handle_observes_progress_of_a_run() {
    let mut search = descent();
    search.core_mut().set_step_budget(Some(50));
    let handle = search.handle();
    assert!(handle.snapshot().is_none());
    search.start().unwrap();
    // the run is over: no active snapshot, status idle
    assert!(handle.snapshot().is_none());
    assert_eq!(handle.status(), SearchStatus::Idle);
}

#[test]
fn repeated_runs_keep_improving_the_best() {
    let mut search = descent();
    search.core_mut().set_seed(21).unwrap();
    search.core_mut().set_step_budget(Some(30));
    let mut previous = f64::NEG_INFINITY;
    for _ in 0..5 {
        search.start().unwrap();
        let best = search.best_evaluation().unwrap().value();
        assert!(best >= previous);
        previous = best;
    }
}
