//! Search base: status machine, run loop, best-solution tracking.
//!
//! Rather than an inheritance chain, a search is composed from capability
//! structs: [`SearchCore`] owns everything every search has (status, best
//! solution, listeners, stop criteria, per-run metadata), and the [`Search`]
//! trait supplies the run loop and the public lifecycle on top of it.
//! Strategies embed a core (usually through
//! [`NeighbourhoodSearchCore`](crate::neigh_search::NeighbourhoodSearchCore))
//! and implement [`Search::search_step`].

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use wander_core::constants::{INVALID_DELTA, INVALID_STEP_COUNT, INVALID_TIME_SPAN};
use wander_core::error::Result;
use wander_core::eval::{signed_delta, Evaluation};
use wander_core::problem::Problem;
use wander_core::solution::Solution;
use wander_core::status::SearchStatus;
use wander_core::validation::Validation;

use crate::control::SearchControl;
use crate::listener::{ListenerBus, SearchListener};
use crate::progress::{RunProgress, SearchSnapshot};
use crate::stop::{spawn_checker, CheckerHandle, StopCriterion, DEFAULT_CHECK_PERIOD};

/// Cloneable cross-thread handle of a search.
///
/// A running search is exclusively borrowed by the worker thread executing
/// [`Search::start`], so other threads interact with it through a handle
/// obtained beforehand: they can request termination and observe status and
/// run progress.
#[derive(Debug, Clone)]
pub struct SearchHandle {
    control: Arc<SearchControl>,
    progress: Arc<RunProgress>,
}

impl SearchHandle {
    /// Requests termination of the current run. Idempotent, non-blocking,
    /// safe from any thread.
    pub fn stop(&self) {
        self.control.stop();
    }

    /// Current status of the search.
    pub fn status(&self) -> SearchStatus {
        self.control.status()
    }

    /// Snapshot of the current run, or `None` when no run is active.
    pub fn snapshot(&self) -> Option<SearchSnapshot> {
        self.progress.snapshot()
    }
}

/// State shared by every search: lifecycle, best solution, listeners, stop
/// criteria and per-run metadata.
///
/// # Type Parameters
/// * `S` - The solution type
/// * `P` - The problem type
pub struct SearchCore<S: Solution, P: Problem<S>> {
    name: String,
    control: Arc<SearchControl>,
    problem: Arc<P>,
    rng: StdRng,
    listeners: ListenerBus<S>,
    criteria: Arc<Mutex<Vec<Arc<dyn StopCriterion>>>>,
    check_period: Duration,
    progress: Arc<RunProgress>,
    // per-run metadata, reset when a run is initialized
    steps: i64,
    start_time: Option<Instant>,
    stop_time: Option<Instant>,
    min_delta: f64,
    last_improvement_time: Option<Instant>,
    // coordination hooks used by multi-replica strategies
    step_budget: Option<i64>,
    coordinator: Option<Arc<SearchControl>>,
    // best solution, kept across runs
    best: Option<S>,
    best_evaluation: Option<P::Evaluation>,
    best_validation: Option<P::Validation>,
}

impl<S: Solution, P: Problem<S>> SearchCore<S, P> {
    /// Creates a search core with the given name, solving the given problem.
    pub fn new(name: impl Into<String>, problem: Arc<P>) -> Self {
        Self {
            name: name.into(),
            control: Arc::new(SearchControl::new()),
            problem,
            rng: StdRng::from_os_rng(),
            listeners: ListenerBus::new(),
            criteria: Arc::new(Mutex::new(Vec::new())),
            check_period: DEFAULT_CHECK_PERIOD,
            progress: Arc::new(RunProgress::new()),
            steps: INVALID_STEP_COUNT,
            start_time: None,
            stop_time: None,
            min_delta: INVALID_DELTA,
            last_improvement_time: None,
            step_budget: None,
            coordinator: None,
            best: None,
            best_evaluation: None,
            best_validation: None,
        }
    }

    /// Search name, used in logging and thread names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status.
    pub fn status(&self) -> SearchStatus {
        self.control.status()
    }

    /// The problem being solved.
    pub fn problem(&self) -> &Arc<P> {
        &self.problem
    }

    /// Cross-thread handle of this search.
    pub fn handle(&self) -> SearchHandle {
        SearchHandle {
            control: Arc::clone(&self.control),
            progress: Arc::clone(&self.progress),
        }
    }

    /// The search's random generator.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Reseeds the search's random generator for deterministic replay.
    pub fn set_seed(&mut self, seed: u64) -> Result<()> {
        self.assert_idle("reseed search")?;
        self.rng = StdRng::seed_from_u64(seed);
        Ok(())
    }

    pub(crate) fn control_arc(&self) -> &Arc<SearchControl> {
        &self.control
    }

    pub(crate) fn assert_idle(&self, action: &str) -> Result<()> {
        self.control.assert_idle(action)
    }

    /// Requests termination of the current run.
    pub fn stop(&self) {
        self.control.stop();
    }

    pub(crate) fn dispose(&mut self) -> Result<()> {
        self.control.advance(SearchStatus::Disposed, "dispose search")?;
        // release owned solutions; a disposed search can never run again
        self.best = None;
        self.best_evaluation = None;
        self.best_validation = None;
        Ok(())
    }

    // === Listener and stop-criterion registration ===

    /// Registers a search listener.
    pub fn add_search_listener(&mut self, listener: Arc<dyn SearchListener<S>>) {
        self.listeners.add(listener);
    }

    /// Unregisters a previously registered listener. Returns whether it was
    /// present.
    pub fn remove_search_listener(&mut self, listener: &Arc<dyn SearchListener<S>>) -> bool {
        self.listeners.remove(listener)
    }

    /// Adds a stop criterion. May be called at any time, including during a
    /// run; the checker picks it up at its next poll.
    pub fn add_stop_criterion(&self, criterion: Arc<dyn StopCriterion>) {
        self.criteria.lock().unwrap().push(criterion);
    }

    /// Removes a stop criterion. Returns whether it was present.
    pub fn remove_stop_criterion(&self, criterion: &Arc<dyn StopCriterion>) -> bool {
        let mut criteria = self.criteria.lock().unwrap();
        let before = criteria.len();
        criteria.retain(|c| !Arc::ptr_eq(c, criterion));
        criteria.len() < before
    }

    /// Sets the period between two stop-criterion checks. Idle only.
    pub fn set_stop_criterion_check_period(&mut self, period: Duration) -> Result<()> {
        self.assert_idle("set stop criterion check period")?;
        self.check_period = period;
        Ok(())
    }

    // === Per-run metadata, exposed with sentinel windows ===

    /// Steps completed during the current (or last) run, or
    /// [`INVALID_STEP_COUNT`] while initializing or before the first run.
    pub fn steps(&self) -> i64 {
        match self.status() {
            SearchStatus::Initializing => INVALID_STEP_COUNT,
            _ => self.steps,
        }
    }

    /// Runtime of the current (or last) run in milliseconds, or
    /// [`INVALID_TIME_SPAN`] while initializing or before the first run.
    pub fn runtime(&self) -> i64 {
        match self.status() {
            SearchStatus::Initializing => INVALID_TIME_SPAN,
            SearchStatus::Running | SearchStatus::Terminating => self
                .start_time
                .map_or(INVALID_TIME_SPAN, |t| t.elapsed().as_millis() as i64),
            SearchStatus::Idle | SearchStatus::Disposed => match (self.start_time, self.stop_time)
            {
                (Some(start), Some(stop)) => stop.duration_since(start).as_millis() as i64,
                _ => INVALID_TIME_SPAN,
            },
        }
    }

    /// Smallest best-solution improvement observed during the current (or
    /// last) run, or [`INVALID_DELTA`] while initializing, before the first
    /// run, or when no improvement over a previous best has been made.
    pub fn min_delta(&self) -> f64 {
        match self.status() {
            SearchStatus::Initializing => INVALID_DELTA,
            _ => self.min_delta,
        }
    }

    /// Milliseconds since the last best-solution improvement during the
    /// current (or last) run; falls back to the runtime when no improvement
    /// has been made. [`INVALID_TIME_SPAN`] while initializing or before the
    /// first run.
    pub fn time_without_improvement(&self) -> i64 {
        match self.status() {
            SearchStatus::Initializing => INVALID_TIME_SPAN,
            SearchStatus::Running | SearchStatus::Terminating => {
                match self.last_improvement_time {
                    Some(t) => t.elapsed().as_millis() as i64,
                    None => self.runtime(),
                }
            }
            SearchStatus::Idle | SearchStatus::Disposed => {
                match (self.last_improvement_time, self.stop_time) {
                    (Some(improved), Some(stop)) => {
                        stop.duration_since(improved).as_millis() as i64
                    }
                    _ => self.runtime(),
                }
            }
        }
    }

    // === Best solution ===

    /// Best solution found so far, across runs.
    pub fn best_solution(&self) -> Option<&S> {
        self.best.as_ref()
    }

    /// Evaluation of the best solution.
    pub fn best_evaluation(&self) -> Option<&P::Evaluation> {
        self.best_evaluation.as_ref()
    }

    /// Validation of the best solution.
    pub fn best_validation(&self) -> Option<&P::Validation> {
        self.best_validation.as_ref()
    }

    /// Promotes the given solution to new best if it is valid and improves
    /// over the current best (or no best exists yet). The solution is deep
    /// copied on promotion. Returns whether the best was updated.
    pub fn update_best(
        &mut self,
        solution: &S,
        evaluation: P::Evaluation,
        validation: P::Validation,
    ) -> bool {
        if !validation.passed() {
            return false;
        }
        let new_value = evaluation.value();
        let delta = self
            .best_evaluation
            .as_ref()
            .map(|best| signed_delta(new_value, best.value(), self.problem.is_minimizing()));
        if delta.is_some_and(|d| d <= 0.0) {
            return false;
        }
        if let Some(d) = delta {
            if self.min_delta == INVALID_DELTA || d < self.min_delta {
                self.min_delta = d;
            }
        }
        self.last_improvement_time = Some(Instant::now());
        self.progress.record_improvement(self.steps.max(0), delta);
        self.best = Some(solution.clone());
        self.best_evaluation = Some(evaluation);
        self.best_validation = Some(validation);
        self.listeners.fire_new_best_solution(solution, new_value);
        true
    }

    // === Run loop internals ===

    pub(crate) fn init_run(&mut self) {
        self.steps = 0;
        self.start_time = Some(Instant::now());
        self.stop_time = None;
        self.min_delta = INVALID_DELTA;
        self.last_improvement_time = None;
        self.progress.begin_run();
    }

    pub(crate) fn start_checker(&self) -> CheckerHandle {
        spawn_checker(
            self.name.clone(),
            Arc::clone(&self.criteria),
            self.check_period,
            Arc::clone(&self.progress),
            Arc::clone(&self.control),
        )
    }

    /// True while the run loop should execute another step.
    pub(crate) fn keep_stepping(&self) -> bool {
        if self.status() != SearchStatus::Running {
            return false;
        }
        if let Some(coordinator) = &self.coordinator {
            if coordinator.status() != SearchStatus::Running {
                return false;
            }
        }
        self.step_budget.is_none_or(|budget| self.steps < budget)
    }

    pub(crate) fn complete_step(&mut self) {
        self.steps += 1;
        self.progress.record_step(self.steps);
        self.listeners.fire_step_completed(self.steps);
    }

    pub(crate) fn finish_run(&mut self, checker: CheckerHandle) {
        self.stop_time = Some(Instant::now());
        self.progress.end_run();
        checker.shutdown();
    }

    pub(crate) fn fire_search_started(&self) {
        self.listeners.fire_search_started();
    }

    pub(crate) fn fire_search_stopped(&self) {
        self.listeners.fire_search_stopped();
    }

    /// Caps the number of steps per run. Used by replica coordinators.
    pub(crate) fn set_step_budget(&mut self, budget: Option<i64>) {
        self.step_budget = budget;
    }

    /// Couples this search's run loop to a coordinating search: steps are
    /// only executed while the coordinator is running.
    pub(crate) fn set_coordinator(&mut self, coordinator: Arc<SearchControl>) {
        self.coordinator = Some(coordinator);
    }
}

impl<S: Solution, P: Problem<S>> Debug for SearchCore<S, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchCore")
            .field("name", &self.name)
            .field("status", &self.status())
            .field("steps", &self.steps)
            .field("has_best", &self.best.is_some())
            .finish()
    }
}

/// A search over solutions of a problem.
///
/// Implementors provide access to their [`SearchCore`] and a
/// [`search_step`](Search::search_step); the trait supplies the full
/// lifecycle: status transitions, the run loop, stop-criterion checking and
/// metadata bookkeeping.
pub trait Search<S: Solution, P: Problem<S>> {
    /// The embedded search core.
    fn core(&self) -> &SearchCore<S, P>;

    /// The embedded search core, mutably.
    fn core_mut(&mut self) -> &mut SearchCore<S, P>;

    /// Executes one step of this search.
    ///
    /// Errors abort the run: the search transitions to terminating and
    /// [`start`](Search::start) surfaces the error after winding down.
    fn search_step(&mut self) -> Result<()>;

    /// Hook invoked when a run is initialized, before the first step.
    fn search_started(&mut self) -> Result<()> {
        Ok(())
    }

    /// Hook invoked when a run has terminated, after the final step.
    fn search_stopped(&mut self) -> Result<()> {
        Ok(())
    }

    /// Runs the search on the calling thread until it terminates.
    ///
    /// Transitions `Idle` → `Initializing` → `Running`, executes
    /// [`search_step`](Search::search_step) in a loop until a stop is
    /// requested (or a stop criterion fires), then winds down through
    /// `Terminating` back to `Idle`. Fails with `BadStatus` when the search
    /// is not idle.
    fn start(&mut self) -> Result<()> {
        self.core()
            .control_arc()
            .advance(SearchStatus::Initializing, "start search")?;
        tracing::debug!(search = %self.core().name(), "run initializing");
        self.core_mut().init_run();
        self.core().fire_search_started();
        let mut failure = self.search_started().err();
        if failure.is_some() {
            self.core().stop();
        }
        let checker = self.core_mut().start_checker();
        self.core()
            .control_arc()
            .advance_if(SearchStatus::Initializing, SearchStatus::Running);
        while self.core().keep_stepping() {
            match self.search_step() {
                Ok(()) => self.core_mut().complete_step(),
                Err(error) => {
                    failure = Some(error);
                    self.core().stop();
                }
            }
        }
        // the loop may have been left by a step budget or coordinator gate
        // while still formally running
        self.core().stop();
        if let Err(error) = self.search_stopped() {
            failure.get_or_insert(error);
        }
        self.core().fire_search_stopped();
        self.core_mut().finish_run(checker);
        self.core()
            .control_arc()
            .advance(SearchStatus::Idle, "finish search run")?;
        tracing::debug!(
            search = %self.core().name(),
            steps = self.core().steps(),
            runtime_ms = self.core().runtime(),
            "run finished"
        );
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Requests termination of the current run. Idempotent, non-blocking.
    fn stop(&self) {
        self.core().stop();
    }

    /// Disposes the search. Idle only; a disposed search cannot be restarted.
    fn dispose(&mut self) -> Result<()> {
        self.core_mut().dispose()
    }

    /// Search name.
    fn name<'a>(&'a self) -> &'a str
    where
        P: 'a,
    {
        self.core().name()
    }

    /// Current status.
    fn status(&self) -> SearchStatus {
        self.core().status()
    }

    /// Cross-thread handle of this search.
    fn handle(&self) -> SearchHandle {
        self.core().handle()
    }

    /// Steps completed during the current (or last) run.
    fn steps(&self) -> i64 {
        self.core().steps()
    }

    /// Runtime of the current (or last) run, in milliseconds.
    fn runtime(&self) -> i64 {
        self.core().runtime()
    }

    /// Smallest best-solution improvement during the current (or last) run.
    fn min_delta(&self) -> f64 {
        self.core().min_delta()
    }

    /// Milliseconds since the last best-solution improvement.
    fn time_without_improvement(&self) -> i64 {
        self.core().time_without_improvement()
    }

    /// Best solution found so far, across runs.
    fn best_solution<'a>(&'a self) -> Option<&'a S>
    where
        P: 'a,
    {
        self.core().best_solution()
    }

    /// Evaluation of the best solution.
    fn best_evaluation<'a>(&'a self) -> Option<&'a P::Evaluation>
    where
        P: 'a,
    {
        self.core().best_evaluation()
    }

    /// Validation of the best solution.
    fn best_validation<'a>(&'a self) -> Option<&'a P::Validation>
    where
        P: 'a,
    {
        self.core().best_validation()
    }

    /// Registers a search listener.
    fn add_search_listener(&mut self, listener: Arc<dyn SearchListener<S>>) {
        self.core_mut().add_search_listener(listener);
    }

    /// Unregisters a search listener. Returns whether it was present.
    fn remove_search_listener(&mut self, listener: &Arc<dyn SearchListener<S>>) -> bool {
        self.core_mut().remove_search_listener(listener)
    }

    /// Adds a stop criterion.
    fn add_stop_criterion(&self, criterion: Arc<dyn StopCriterion>) {
        self.core().add_stop_criterion(criterion);
    }

    /// Removes a stop criterion. Returns whether it was present.
    fn remove_stop_criterion(&self, criterion: &Arc<dyn StopCriterion>) -> bool {
        self.core().remove_stop_criterion(criterion)
    }

    /// Sets the period between two stop-criterion checks. Idle only.
    fn set_stop_criterion_check_period(&mut self, period: Duration) -> Result<()> {
        self.core_mut().set_stop_criterion_check_period(period)
    }
}
