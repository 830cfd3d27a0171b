//! Stop criteria and the asynchronous checker.
//!
//! Stop criteria are pluggable predicates over a [`SearchSnapshot`]. A
//! dedicated checker thread polls all registered criteria at a fixed period
//! while a run is active, and requests termination through the search's
//! status control as soon as any criterion fires.

mod criteria;

use std::fmt::Debug;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::control::SearchControl;
use crate::progress::{RunProgress, SearchSnapshot};

pub use criteria::{
    MaxRuntime, MaxSteps, MaxStepsWithoutImprovement, MaxTimeWithoutImprovement, MinDelta,
};

/// Default period between two stop-criterion checks.
pub const DEFAULT_CHECK_PERIOD: Duration = Duration::from_millis(50);

/// A pluggable predicate deciding when a search should stop.
pub trait StopCriterion: Send + Sync + Debug {
    /// Returns true if the search observed in the snapshot should stop.
    fn search_should_stop(&self, snapshot: &SearchSnapshot) -> bool;
}

/// Handle of a spawned checker thread, used to shut it down at run end.
pub(crate) struct CheckerHandle {
    signal: Arc<(Mutex<bool>, Condvar)>,
    thread: JoinHandle<()>,
}

impl CheckerHandle {
    /// Signals the checker to exit and joins it.
    pub(crate) fn shutdown(self) {
        let (lock, condvar) = &*self.signal;
        *lock.lock().unwrap() = true;
        condvar.notify_all();
        let _ = self.thread.join();
    }
}

/// Spawns the checker thread for one run.
///
/// The checker wakes up every `period`, takes a snapshot of the run and
/// polls all criteria. When one of them fires, it requests termination and
/// exits; it also exits when shut down or when the run is no longer active.
pub(crate) fn spawn_checker(
    name: String,
    criteria: Arc<Mutex<Vec<Arc<dyn StopCriterion>>>>,
    period: Duration,
    progress: Arc<RunProgress>,
    control: Arc<SearchControl>,
) -> CheckerHandle {
    let signal = Arc::new((Mutex::new(false), Condvar::new()));
    let thread_signal = Arc::clone(&signal);
    let thread = std::thread::Builder::new()
        .name(format!("{name}-stop-checker"))
        .spawn(move || {
            let (lock, condvar) = &*thread_signal;
            loop {
                {
                    let guard = lock.lock().unwrap();
                    let (guard, _) = condvar.wait_timeout(guard, period).unwrap();
                    if *guard {
                        return;
                    }
                }
                let Some(snapshot) = progress.snapshot() else {
                    continue;
                };
                let fired = {
                    let criteria = criteria.lock().unwrap();
                    criteria
                        .iter()
                        .find(|c| c.search_should_stop(&snapshot))
                        .map(|c| format!("{c:?}"))
                };
                if let Some(criterion) = fired {
                    tracing::debug!(search = %name, %criterion, "stop criterion fired");
                    control.stop();
                    return;
                }
            }
        })
        .expect("failed to spawn stop-criterion checker thread");
    CheckerHandle { signal, thread }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use wander_core::status::SearchStatus;

    #[test]
    fn checker_stops_search_when_criterion_fires() {
        let control = Arc::new(SearchControl::new());
        control.advance(SearchStatus::Initializing, "test").unwrap();
        control.advance(SearchStatus::Running, "test").unwrap();
        let progress = Arc::new(RunProgress::new());
        progress.begin_run();
        progress.record_step(10);
        let criteria: Arc<Mutex<Vec<Arc<dyn StopCriterion>>>> =
            Arc::new(Mutex::new(vec![Arc::new(MaxSteps::new(5))]));
        let checker = spawn_checker(
            "test".into(),
            criteria,
            Duration::from_millis(5),
            Arc::clone(&progress),
            Arc::clone(&control),
        );
        let deadline = Instant::now() + Duration::from_secs(2);
        while control.status() != SearchStatus::Terminating && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(control.status(), SearchStatus::Terminating);
        checker.shutdown();
    }

    #[test]
    fn checker_shuts_down_without_firing() {
        let control = Arc::new(SearchControl::new());
        let progress = Arc::new(RunProgress::new());
        progress.begin_run();
        let criteria: Arc<Mutex<Vec<Arc<dyn StopCriterion>>>> =
            Arc::new(Mutex::new(vec![Arc::new(MaxSteps::new(1_000_000))]));
        let checker = spawn_checker(
            "test".into(),
            criteria,
            Duration::from_millis(5),
            progress,
            Arc::clone(&control),
        );
        std::thread::sleep(Duration::from_millis(20));
        checker.shutdown();
        assert_eq!(control.status(), SearchStatus::Idle);
    }
}
