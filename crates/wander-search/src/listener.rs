//! Search listeners and their dispatch.
//!
//! Listeners are informed about the lifecycle of a search: run start and
//! end, completed steps and new best solutions. They are invoked
//! synchronously on the worker thread and are expected to be short. A
//! panicking listener is isolated and logged; it never takes the search down.

use std::fmt::Debug;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use wander_core::solution::Solution;

/// Listener for search lifecycle events.
///
/// All callbacks default to no-ops so implementations only override what
/// they observe.
pub trait SearchListener<S: Solution>: Send + Sync {
    /// Called once per run, before any step is completed.
    fn search_started(&self) {}

    /// Called once per run, after the final step has completed.
    fn search_stopped(&self) {}

    /// Called for every new best solution, before the completion of the
    /// step that found it.
    fn new_best_solution(&self, _solution: &S, _evaluation: f64) {}

    /// Called exactly once for every completed step, with strictly
    /// increasing step counts.
    fn step_completed(&self, _steps: i64) {}
}

/// Fan-out of lifecycle events to registered listeners.
///
/// Listeners fire in registration order. Each listener is isolated: a panic
/// inside a callback is caught and logged, and the remaining listeners still
/// fire.
pub struct ListenerBus<S: Solution> {
    listeners: Vec<Arc<dyn SearchListener<S>>>,
}

impl<S: Solution> ListenerBus<S> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Arc<dyn SearchListener<S>>) {
        self.listeners.push(listener);
    }

    /// Removes a previously added listener. Returns whether it was present.
    pub(crate) fn remove(&mut self, listener: &Arc<dyn SearchListener<S>>) -> bool {
        let before = self.listeners.len();
        self.listeners
            .retain(|l| !Arc::ptr_eq(l, listener));
        self.listeners.len() < before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }

    fn dispatch(&self, event: &str, f: impl Fn(&dyn SearchListener<S>)) {
        for listener in &self.listeners {
            let result = catch_unwind(AssertUnwindSafe(|| f(listener.as_ref())));
            if result.is_err() {
                tracing::warn!(event, "search listener panicked; ignoring");
            }
        }
    }

    pub(crate) fn fire_search_started(&self) {
        self.dispatch("search_started", |l| l.search_started());
    }

    pub(crate) fn fire_search_stopped(&self) {
        self.dispatch("search_stopped", |l| l.search_stopped());
    }

    pub(crate) fn fire_new_best_solution(&self, solution: &S, evaluation: f64) {
        self.dispatch("new_best_solution", |l| {
            l.new_best_solution(solution, evaluation)
        });
    }

    pub(crate) fn fire_step_completed(&self, steps: i64) {
        self.dispatch("step_completed", |l| l.step_completed(steps));
    }
}

impl<S: Solution> Debug for ListenerBus<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        started: AtomicUsize,
        steps: AtomicUsize,
    }

    impl SearchListener<Vec<bool>> for Counting {
        fn search_started(&self) {
            self.started.fetch_add(1, Ordering::SeqCst);
        }

        fn step_completed(&self, _steps: i64) {
            self.steps.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Panicking;

    impl SearchListener<Vec<bool>> for Panicking {
        fn search_started(&self) {
            panic!("listener misbehaved");
        }
    }

    #[test]
    fn events_reach_all_listeners() {
        let mut bus: ListenerBus<Vec<bool>> = ListenerBus::new();
        let a = Arc::new(Counting::default());
        let b = Arc::new(Counting::default());
        bus.add(a.clone());
        bus.add(b.clone());
        bus.fire_search_started();
        bus.fire_step_completed(1);
        bus.fire_step_completed(2);
        assert_eq!(a.started.load(Ordering::SeqCst), 1);
        assert_eq!(b.steps.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panicking_listener_does_not_block_others() {
        let mut bus: ListenerBus<Vec<bool>> = ListenerBus::new();
        let counting = Arc::new(Counting::default());
        bus.add(Arc::new(Panicking));
        bus.add(counting.clone());
        bus.fire_search_started();
        assert_eq!(counting.started.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn remove_uses_identity() {
        let mut bus: ListenerBus<Vec<bool>> = ListenerBus::new();
        let a: Arc<dyn SearchListener<Vec<bool>>> = Arc::new(Counting::default());
        let b: Arc<dyn SearchListener<Vec<bool>>> = Arc::new(Counting::default());
        bus.add(a.clone());
        assert!(!bus.remove(&b));
        assert!(bus.remove(&a));
        assert_eq!(bus.len(), 0);
    }
}
